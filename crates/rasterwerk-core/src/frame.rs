// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Forward-only scanline access to images.
//
// An `ImageFrame` is a finite, non-restartable sequence of rows. There is no
// seek: the cursor advances by exactly one row per read and may skip forward,
// never backward.

use crate::error::{RasterError, Result};
use crate::plane::RasterPlane;
use crate::types::{ColorSpace, FrameInfo};

/// Sequential row source.
pub trait ImageFrame {
    /// Geometry and sample layout of the rows this frame yields.
    fn info(&self) -> &FrameInfo;

    /// Number of rows already consumed (read or skipped).
    fn position(&self) -> u32;

    /// Read the next row into the first `info().row_stride()` bytes of `buf`.
    ///
    /// Fails with `SourceExhausted` once every row has been consumed.
    fn read_scanline(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Advance past `count` rows without returning them.
    fn skip_scanlines(&mut self, count: u32) -> Result<()> {
        let mut scratch = vec![0u8; self.info().row_stride()];
        for _ in 0..count {
            self.read_scanline(&mut scratch)?;
        }
        Ok(())
    }

    /// Rows not yet consumed.
    fn remaining(&self) -> u32 {
        self.info().height.saturating_sub(self.position())
    }

    /// Turn the frame into an iterator of owned rows.
    fn into_scanlines(self) -> ScanLines<Self>
    where
        Self: Sized,
    {
        ScanLines { frame: self }
    }
}

impl<F: ImageFrame + ?Sized> ImageFrame for Box<F> {
    fn info(&self) -> &FrameInfo {
        (**self).info()
    }

    fn position(&self) -> u32 {
        (**self).position()
    }

    fn read_scanline(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read_scanline(buf)
    }

    fn skip_scanlines(&mut self, count: u32) -> Result<()> {
        (**self).skip_scanlines(count)
    }
}

/// Iterator adapter returned by [`ImageFrame::into_scanlines`].
#[derive(Debug)]
pub struct ScanLines<F> {
    frame: F,
}

impl<F: ImageFrame> Iterator for ScanLines<F> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.frame.remaining() == 0 {
            return None;
        }
        let mut row = vec![0u8; self.frame.info().row_stride()];
        Some(self.frame.read_scanline(&mut row).map(|()| row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.frame.remaining() as usize;
        (remaining, Some(remaining))
    }
}

/// Check that a caller-supplied row buffer can hold one row.
pub fn check_row_buffer(info: &FrameInfo, buf: &[u8]) -> Result<()> {
    let required = info.row_stride();
    if buf.len() < required {
        return Err(RasterError::BufferTooSmall {
            required,
            actual: buf.len(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// In-memory frame
// ---------------------------------------------------------------------------

/// Frame over an owned buffer of packed rows.
#[derive(Debug, Clone)]
pub struct BufferFrame {
    info: FrameInfo,
    data: Vec<u8>,
    row: u32,
}

impl BufferFrame {
    /// Wrap `data`, which must hold `info.height` rows of `info.row_stride()`
    /// bytes each.
    pub fn new(info: FrameInfo, data: Vec<u8>) -> Result<Self> {
        info.validate()?;
        let required = info.row_stride() * info.height as usize;
        if data.len() < required {
            return Err(RasterError::BufferTooSmall {
                required,
                actual: data.len(),
            });
        }
        Ok(Self { info, data, row: 0 })
    }

    /// Single-channel gray frame over a plane's samples.
    pub fn from_plane(plane: &RasterPlane, x_resolution: f64, y_resolution: f64) -> Self {
        let info = FrameInfo::new(
            ColorSpace::DeviceGray,
            plane.width(),
            plane.height(),
            plane.depth().bits(),
            x_resolution,
            y_resolution,
        );
        Self {
            info,
            data: plane.to_packed(),
            row: 0,
        }
    }

    /// Borrow the full backing buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl ImageFrame for BufferFrame {
    fn info(&self) -> &FrameInfo {
        &self.info
    }

    fn position(&self) -> u32 {
        self.row
    }

    fn read_scanline(&mut self, buf: &mut [u8]) -> Result<()> {
        check_row_buffer(&self.info, buf)?;
        if self.row >= self.info.height {
            return Err(RasterError::SourceExhausted {
                rows_read: self.row,
                height: self.info.height,
            });
        }
        let stride = self.info.row_stride();
        let start = self.row as usize * stride;
        buf[..stride].copy_from_slice(&self.data[start..start + stride]);
        self.row += 1;
        Ok(())
    }

    fn skip_scanlines(&mut self, count: u32) -> Result<()> {
        let target = self.row.checked_add(count).filter(|t| *t <= self.info.height);
        match target {
            Some(target) => {
                self.row = target;
                Ok(())
            }
            None => Err(RasterError::SourceExhausted {
                rows_read: self.row,
                height: self.info.height,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SampleDepth;

    fn gray_frame(width: u32, height: u32) -> BufferFrame {
        let info = FrameInfo::new(ColorSpace::DeviceGray, width, height, 8, 72.0, 72.0);
        let data = (0..width * height).map(|v| v as u8).collect();
        BufferFrame::new(info, data).unwrap()
    }

    #[test]
    fn reads_rows_in_order_then_exhausts() {
        let mut frame = gray_frame(3, 2);
        let mut row = [0u8; 3];
        frame.read_scanline(&mut row).unwrap();
        assert_eq!(row, [0, 1, 2]);
        frame.read_scanline(&mut row).unwrap();
        assert_eq!(row, [3, 4, 5]);
        let err = frame.read_scanline(&mut row).unwrap_err();
        assert!(matches!(err, RasterError::SourceExhausted { rows_read: 2, height: 2 }));
    }

    #[test]
    fn skip_moves_forward_only() {
        let mut frame = gray_frame(2, 4);
        frame.skip_scanlines(2).unwrap();
        assert_eq!(frame.position(), 2);
        let mut row = [0u8; 2];
        frame.read_scanline(&mut row).unwrap();
        assert_eq!(row, [4, 5]);
        assert!(frame.skip_scanlines(2).is_err());
    }

    #[test]
    fn scanline_iterator_is_finite() {
        let rows: Vec<Vec<u8>> = gray_frame(2, 3)
            .into_scanlines()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows, vec![vec![0, 1], vec![2, 3], vec![4, 5]]);
    }

    #[test]
    fn short_row_buffer_rejected() {
        let mut frame = gray_frame(4, 1);
        let mut row = [0u8; 3];
        assert!(frame.read_scanline(&mut row).is_err());
        assert_eq!(frame.position(), 0);
    }

    #[test]
    fn plane_frame_strips_padding() {
        let mut plane = RasterPlane::with_stride(2, 2, SampleDepth::Bits8, 4).unwrap();
        plane.fill(9);
        let frame = BufferFrame::from_plane(&plane, 150.0, 150.0);
        assert_eq!(frame.data(), &[9, 9, 9, 9]);
    }
}
