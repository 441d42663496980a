// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster plane: a single-channel, row-major grid of 8- or 16-bit samples
// with an explicit row stride.

use crate::error::{RasterError, Result};
use crate::types::SampleDepth;

/// One channel of raster data.
///
/// Rows may be padded: `stride` can exceed `width * depth.bytes()`. Padding
/// bytes are never read back as samples. 16-bit samples are big-endian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterPlane {
    width: u32,
    height: u32,
    depth: SampleDepth,
    stride: usize,
    data: Vec<u8>,
}

impl RasterPlane {
    // -- Construction ---------------------------------------------------------

    /// Allocate a zeroed plane with tightly packed rows.
    pub fn new(width: u32, height: u32, depth: SampleDepth) -> Self {
        let stride = width as usize * depth.bytes();
        Self {
            width,
            height,
            depth,
            stride,
            data: vec![0; stride * height as usize],
        }
    }

    /// Allocate a zeroed plane whose rows are `stride` bytes apart.
    pub fn with_stride(width: u32, height: u32, depth: SampleDepth, stride: usize) -> Result<Self> {
        check_stride(width, depth, stride)?;
        Ok(Self {
            width,
            height,
            depth,
            stride,
            data: vec![0; stride * height as usize],
        })
    }

    /// Allocate a plane with every sample set to `value`.
    pub fn filled(width: u32, height: u32, depth: SampleDepth, value: u16) -> Self {
        let mut plane = Self::new(width, height, depth);
        plane.fill(value);
        plane
    }

    /// Wrap an existing buffer. Fails if the buffer cannot hold `height` rows.
    pub fn from_raw(
        width: u32,
        height: u32,
        depth: SampleDepth,
        stride: usize,
        data: Vec<u8>,
    ) -> Result<Self> {
        check_stride(width, depth, stride)?;
        let required = stride * height as usize;
        if data.len() < required {
            return Err(RasterError::BufferTooSmall {
                required,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            depth,
            stride,
            data,
        })
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> SampleDepth {
        self.depth
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Bytes of sample data in one row, excluding padding.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.depth.bytes()
    }

    pub fn same_dimensions(&self, other: &RasterPlane) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Sample bytes of row `y` (padding excluded).
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.row_bytes()]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        let len = self.row_bytes();
        &mut self.data[start..start + len]
    }

    /// Sample at column `x` of row `y`.
    pub fn sample(&self, x: u32, y: u32) -> u16 {
        read_sample(self.row(y), x as usize, self.depth)
    }

    pub fn set_sample(&mut self, x: u32, y: u32, value: u16) {
        let depth = self.depth;
        write_sample(self.row_mut(y), x as usize, depth, value);
    }

    /// Set every sample (padding untouched) to `value`.
    pub fn fill(&mut self, value: u16) {
        for y in 0..self.height {
            for x in 0..self.width {
                self.set_sample(x, y, value);
            }
        }
    }

    /// Copy of the plane with padding removed.
    pub fn to_packed(&self) -> Vec<u8> {
        let mut packed = Vec::with_capacity(self.row_bytes() * self.height as usize);
        for y in 0..self.height {
            packed.extend_from_slice(self.row(y));
        }
        packed
    }

    /// Consume the plane, returning the raw (possibly padded) buffer.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

/// Read sample `index` from a row of byte-aligned samples.
pub fn read_sample(row: &[u8], index: usize, depth: SampleDepth) -> u16 {
    match depth {
        SampleDepth::Bits8 => row[index] as u16,
        SampleDepth::Bits16 => u16::from_be_bytes([row[index * 2], row[index * 2 + 1]]),
    }
}

/// Write sample `index` into a row of byte-aligned samples. 8-bit rows keep
/// the low byte of `value`.
pub fn write_sample(row: &mut [u8], index: usize, depth: SampleDepth, value: u16) {
    match depth {
        SampleDepth::Bits8 => row[index] = value.min(u8::MAX as u16) as u8,
        SampleDepth::Bits16 => row[index * 2..index * 2 + 2].copy_from_slice(&value.to_be_bytes()),
    }
}

fn check_stride(width: u32, depth: SampleDepth, stride: usize) -> Result<()> {
    let minimum = width as usize * depth.bytes();
    if stride < minimum {
        return Err(RasterError::UnsupportedFormat(format!(
            "row stride {stride} shorter than {minimum} bytes of samples"
        )));
    }
    Ok(())
}
