// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw images backed by a temporary store.
//
// A `FrameWriter` accepts exactly `height` scanlines and, once flushed,
// yields a `RawImage`. The image can be read once, front to back, through
// the `ImageFrame` returned by `RawImage::into_frame`.

use std::io::{Read, Write};

use rasterwerk_core::config::EngineConfig;
use rasterwerk_core::error::{RasterError, Result};
use rasterwerk_core::frame::{ImageFrame, check_row_buffer};
use rasterwerk_core::types::FrameInfo;
use tracing::{debug, instrument};

use crate::temp_store::{TempReader, TempWriter, create_temporary, scratch_error};

/// Scanline writer for a new raw image.
#[derive(Debug)]
pub struct FrameWriter {
    info: FrameInfo,
    sink: TempWriter,
    rows_written: u32,
}

/// Finished image whose rows live in compressed scratch storage.
#[derive(Debug)]
pub struct RawImage {
    info: FrameInfo,
    store: TempReader,
}

/// Forward-only reader over a `RawImage`.
#[derive(Debug)]
pub struct RawImageFrame {
    info: FrameInfo,
    store: TempReader,
    row: u32,
}

impl RawImage {
    /// Create the writer for a new image described by `info`, backed by a
    /// fresh temporary store.
    #[instrument(skip_all, fields(width = info.width, height = info.height, bps = info.bits_per_sample))]
    pub fn create_writer(config: &EngineConfig, info: FrameInfo) -> Result<FrameWriter> {
        info.validate()?;
        let sink = create_temporary(config)?;
        debug!(color_space = %info.color_space, "Raw image writer created");
        Ok(FrameWriter {
            info,
            sink,
            rows_written: 0,
        })
    }

    pub fn info(&self) -> &FrameInfo {
        &self.info
    }

    pub fn width(&self) -> u32 {
        self.info.width
    }

    pub fn height(&self) -> u32 {
        self.info.height
    }

    /// Compressed size of the stored rows.
    pub fn compressed_len(&self) -> u64 {
        self.store.compressed_len()
    }

    /// Consume the image, returning a frame over its rows.
    pub fn into_frame(self) -> RawImageFrame {
        RawImageFrame {
            info: self.info,
            store: self.store,
            row: 0,
        }
    }

    /// Consume the image, returning all rows as one packed buffer.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        let stride = self.info.row_stride();
        let height = self.info.height as usize;
        let mut frame = self.into_frame();
        let mut data = vec![0u8; stride * height];
        for row in data.chunks_exact_mut(stride.max(1)).take(height) {
            frame.read_scanline(row)?;
        }
        Ok(data)
    }
}

impl FrameWriter {
    pub fn info(&self) -> &FrameInfo {
        &self.info
    }

    pub fn rows_written(&self) -> u32 {
        self.rows_written
    }

    /// Append one row taken from the first `info().row_stride()` bytes of
    /// `row`.
    pub fn write_scanline(&mut self, row: &[u8]) -> Result<()> {
        check_row_buffer(&self.info, row)?;
        if self.rows_written >= self.info.height {
            return Err(RasterError::UnsupportedFormat(format!(
                "row {} written past image height {}",
                self.rows_written + 1,
                self.info.height
            )));
        }
        let stride = self.info.row_stride();
        self.sink.write_all(&row[..stride]).map_err(scratch_error)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Seal the image. Fails unless every row has been written.
    pub fn flush(self) -> Result<RawImage> {
        if self.rows_written != self.info.height {
            return Err(RasterError::IncompleteImage {
                expected: self.info.height,
                written: self.rows_written,
            });
        }
        let store = self.sink.finish()?;
        debug!(
            rows = self.rows_written,
            bytes = store.len(),
            compressed = store.compressed_len(),
            "Raw image flushed"
        );
        Ok(RawImage {
            info: self.info,
            store,
        })
    }
}

impl ImageFrame for RawImageFrame {
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
        self.store
            .read_exact(&mut buf[..stride])
            .map_err(scratch_error)?;
        self.row += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterwerk_core::config::ScratchBacking;
    use rasterwerk_core::types::ColorSpace;

    fn rgb_info(width: u32, height: u32) -> FrameInfo {
        FrameInfo::new(ColorSpace::DeviceRgb, width, height, 8, 300.0, 300.0)
    }

    #[test]
    fn write_then_read_rows() {
        let config = EngineConfig::default();
        let mut writer = RawImage::create_writer(&config, rgb_info(2, 3)).unwrap();
        for y in 0..3u8 {
            writer.write_scanline(&[y; 6]).unwrap();
        }
        let image = writer.flush().unwrap();
        assert_eq!((image.width(), image.height()), (2, 3));
        assert_eq!(image.info().x_resolution, 300.0);

        let rows: Vec<Vec<u8>> = image
            .into_frame()
            .into_scanlines()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows, vec![vec![0; 6], vec![1; 6], vec![2; 6]]);
    }

    #[test]
    fn flush_rejects_missing_rows() {
        let config = EngineConfig {
            scratch_backing: ScratchBacking::Memory,
            ..EngineConfig::default()
        };
        let mut writer = RawImage::create_writer(&config, rgb_info(1, 2)).unwrap();
        writer.write_scanline(&[1, 2, 3]).unwrap();
        let err = writer.flush().unwrap_err();
        assert!(matches!(
            err,
            RasterError::IncompleteImage {
                expected: 2,
                written: 1
            }
        ));
    }

    #[test]
    fn extra_rows_rejected() {
        let config = EngineConfig::default();
        let mut writer = RawImage::create_writer(&config, rgb_info(1, 1)).unwrap();
        writer.write_scanline(&[1, 2, 3]).unwrap();
        assert!(writer.write_scanline(&[1, 2, 3]).is_err());
        assert_eq!(writer.rows_written(), 1);
    }

    #[test]
    fn short_row_rejected() {
        let config = EngineConfig::default();
        let mut writer = RawImage::create_writer(&config, rgb_info(2, 1)).unwrap();
        assert!(matches!(
            writer.write_scanline(&[0; 5]),
            Err(RasterError::BufferTooSmall { required: 6, actual: 5 })
        ));
    }

    #[test]
    fn into_bytes_returns_packed_rows() {
        let config = EngineConfig::default();
        let mut writer = RawImage::create_writer(&config, rgb_info(1, 2)).unwrap();
        writer.write_scanline(&[1, 2, 3]).unwrap();
        writer.write_scanline(&[4, 5, 6]).unwrap();
        let bytes = writer.flush().unwrap().into_bytes().unwrap();
        assert_eq!(bytes, vec![1, 2, 3, 4, 5, 6]);
    }
}
