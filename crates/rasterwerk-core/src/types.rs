// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Rasterwerk.

use serde::{Deserialize, Serialize};

use crate::error::{RasterError, Result};

/// Colour model of an image or of an ink's alternate representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "colorants", rename_all = "snake_case")]
pub enum ColorSpace {
    DeviceGray,
    DeviceRgb,
    DeviceCmyk,
    /// CIE L*a*b*. Only used as an alternate space for spot definitions.
    Lab,
    /// Arbitrary named colorants (process channels followed by spots).
    DeviceN(Vec<String>),
}

impl ColorSpace {
    /// Number of colour components in this space.
    pub fn num_components(&self) -> usize {
        match self {
            Self::DeviceGray => 1,
            Self::DeviceRgb | Self::Lab => 3,
            Self::DeviceCmyk => 4,
            Self::DeviceN(names) => names.len(),
        }
    }

    /// Colorant names in channel order.
    pub fn colorant_names(&self) -> Vec<String> {
        let fixed: &[&str] = match self {
            Self::DeviceGray => &["Gray"],
            Self::DeviceRgb => &["Red", "Green", "Blue"],
            Self::DeviceCmyk => &["Cyan", "Magenta", "Yellow", "Black"],
            Self::Lab => &["L", "a", "b"],
            Self::DeviceN(names) => return names.clone(),
        };
        fixed.iter().map(|name| (*name).to_owned()).collect()
    }

    /// Whether sample values measure ink coverage (0 = no ink) rather than
    /// light (0 = black).
    pub fn is_subtractive(&self) -> bool {
        matches!(self, Self::DeviceCmyk | Self::DeviceN(_))
    }
}

impl std::fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeviceGray => write!(f, "DeviceGray"),
            Self::DeviceRgb => write!(f, "DeviceRGB"),
            Self::DeviceCmyk => write!(f, "DeviceCMYK"),
            Self::Lab => write!(f, "Lab"),
            Self::DeviceN(names) => write!(f, "DeviceN[{}]", names.join(", ")),
        }
    }
}

/// Byte-aligned sample depth of a raster plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleDepth {
    Bits8,
    Bits16,
}

impl SampleDepth {
    /// Map a bits-per-sample count to a plane depth.
    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            8 => Ok(Self::Bits8),
            16 => Ok(Self::Bits16),
            other => Err(RasterError::UnsupportedFormat(format!(
                "{other} bits per sample (planes hold 8 or 16)"
            ))),
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::Bits8 => 8,
            Self::Bits16 => 16,
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            Self::Bits8 => 1,
            Self::Bits16 => 2,
        }
    }

    /// Largest sample value (255 or 65535).
    pub fn max_value(self) -> u16 {
        match self {
            Self::Bits8 => u8::MAX as u16,
            Self::Bits16 => u16::MAX,
        }
    }
}

/// Axis-aligned rectangle in page units (1/96 inch).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains_point(&self, px: f64, py: f64) -> bool {
        px >= self.x && py >= self.y && px < self.x + self.width && py < self.y + self.height
    }
}

/// Rectangular sub-image in source pixel units.
///
/// `width`/`height` are the extents (`dX`/`dY`) of the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole of a `width` x `height` image.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Whether this region lies entirely inside a `width` x `height` image.
    /// Arithmetic overflow counts as outside.
    pub fn is_within(&self, width: u32, height: u32) -> bool {
        let right = self.x.checked_add(self.width);
        let bottom = self.y.checked_add(self.height);
        matches!((right, bottom), (Some(r), Some(b)) if r <= width && b <= height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{}+{}+{}",
            self.width, self.height, self.x, self.y
        )
    }
}

/// Geometry and sample layout of a scanline-addressable image.
///
/// Samples are packed most-significant-bit first; every row starts on a byte
/// boundary. Multi-byte samples are big-endian.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameInfo {
    pub width: u32,
    pub height: u32,
    pub bits_per_sample: u8,
    /// Channels per pixel. May exceed the colour space's component count
    /// when an alpha channel is present.
    pub channels: u8,
    pub color_space: ColorSpace,
    pub x_resolution: f64,
    pub y_resolution: f64,
}

impl FrameInfo {
    /// Describe an image with one channel per colour component.
    pub fn new(
        color_space: ColorSpace,
        width: u32,
        height: u32,
        bits_per_sample: u8,
        x_resolution: f64,
        y_resolution: f64,
    ) -> Self {
        let channels = u8::try_from(color_space.num_components()).unwrap_or(u8::MAX);
        Self {
            width,
            height,
            bits_per_sample,
            channels,
            color_space,
            x_resolution,
            y_resolution,
        }
    }

    /// Builder-style override for images carrying extra (alpha) channels.
    pub fn with_channels(mut self, channels: u8) -> Self {
        self.channels = channels;
        self
    }

    /// Same image description at a different sample depth.
    pub fn with_bits_per_sample(mut self, bits_per_sample: u8) -> Self {
        self.bits_per_sample = bits_per_sample;
        self
    }

    /// Bytes in one packed row, including trailing pad bits.
    pub fn row_stride(&self) -> usize {
        let bits = self.width as usize * self.channels as usize * self.bits_per_sample as usize;
        bits.div_ceil(8)
    }

    /// Bytes per pixel for byte-aligned depths (8 or 16 bits per sample).
    pub fn bytes_per_pixel(&self) -> Result<usize> {
        match self.bits_per_sample {
            8 | 16 => Ok(self.channels as usize * self.bits_per_sample as usize / 8),
            other => Err(RasterError::UnsupportedFormat(format!(
                "{other}-bit samples are not byte aligned"
            ))),
        }
    }

    /// Reject descriptions no pipeline stage can handle.
    pub fn validate(&self) -> Result<()> {
        if self.bits_per_sample == 0 || self.bits_per_sample > 32 {
            return Err(RasterError::UnsupportedFormat(format!(
                "{} bits per sample",
                self.bits_per_sample
            )));
        }
        if self.channels == 0 {
            return Err(RasterError::UnsupportedFormat("zero channels".into()));
        }
        if (self.channels as usize) < self.color_space.num_components() {
            return Err(RasterError::UnsupportedFormat(format!(
                "{} channels cannot carry {} ({} components)",
                self.channels,
                self.color_space,
                self.color_space.num_components()
            )));
        }
        Ok(())
    }
}
