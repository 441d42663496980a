// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image transforms: lazy, row-at-a-time filters over forward-only frames.
//
// Each transform consumes one frame and yields another; rows are converted
// only when they are pulled, and skipped rows are never converted. A
// `TransformChain` applies its stages in insertion order.

use rasterwerk_core::error::{RasterError, Result};
use rasterwerk_core::frame::{ImageFrame, check_row_buffer};
use rasterwerk_core::types::{ColorSpace, FrameInfo};
use tracing::debug;

use crate::bits::{max_value, read_packed, scale_sample, write_packed};

/// A stage that turns one image frame into another.
pub trait ImageTransform: std::fmt::Debug {
    fn apply(&self, frame: Box<dyn ImageFrame>) -> Result<Box<dyn ImageFrame>>;
}

/// Ordered list of transforms applied first to last.
#[derive(Debug, Default)]
pub struct TransformChain {
    stages: Vec<Box<dyn ImageTransform>>,
}

impl TransformChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage, builder style.
    pub fn then(mut self, stage: impl ImageTransform + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl ImageTransform for TransformChain {
    fn apply(&self, frame: Box<dyn ImageFrame>) -> Result<Box<dyn ImageFrame>> {
        self.stages
            .iter()
            .try_fold(frame, |frame, stage| stage.apply(frame))
    }
}

// ---------------------------------------------------------------------------
// Row-mapping frame shared by all transforms
// ---------------------------------------------------------------------------

type RowMap = Box<dyn Fn(&[u8], &mut [u8])>;

/// Frame that maps each inner row through `map`.
struct MappedFrame {
    inner: Box<dyn ImageFrame>,
    info: FrameInfo,
    src_row: Vec<u8>,
    map: RowMap,
}

impl MappedFrame {
    fn boxed(inner: Box<dyn ImageFrame>, info: FrameInfo, map: RowMap) -> Box<dyn ImageFrame> {
        let src_row = vec![0u8; inner.info().row_stride()];
        Box::new(Self {
            inner,
            info,
            src_row,
            map,
        })
    }
}

impl ImageFrame for MappedFrame {
    fn info(&self) -> &FrameInfo {
        &self.info
    }

    fn position(&self) -> u32 {
        self.inner.position()
    }

    fn read_scanline(&mut self, buf: &mut [u8]) -> Result<()> {
        check_row_buffer(&self.info, buf)?;
        self.inner.read_scanline(&mut self.src_row)?;
        let stride = self.info.row_stride();
        (self.map)(&self.src_row, &mut buf[..stride]);
        Ok(())
    }

    fn skip_scanlines(&mut self, count: u32) -> Result<()> {
        self.inner.skip_scanlines(count)
    }
}

// ---------------------------------------------------------------------------
// Bit scaler
// ---------------------------------------------------------------------------

/// Rescale every sample to `target_bits` bits per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitScaler {
    pub target_bits: u8,
}

impl BitScaler {
    pub fn new(target_bits: u8) -> Self {
        Self { target_bits }
    }
}

impl ImageTransform for BitScaler {
    fn apply(&self, frame: Box<dyn ImageFrame>) -> Result<Box<dyn ImageFrame>> {
        let source = frame.info().clone();
        source.validate()?;
        if self.target_bits == 0 || self.target_bits > 32 {
            return Err(RasterError::UnsupportedFormat(format!(
                "cannot scale to {} bits per sample",
                self.target_bits
            )));
        }
        let from = source.bits_per_sample;
        let to = self.target_bits;
        if from == to {
            return Ok(frame);
        }
        debug!(from, to, "Bit scaler attached");

        let samples = source.width as usize * source.channels as usize;
        let target = source.with_bits_per_sample(to);
        Ok(MappedFrame::boxed(
            frame,
            target,
            Box::new(move |src, dst| {
                dst.fill(0);
                for i in 0..samples {
                    let value = scale_sample(read_packed(src, i, from), from, to);
                    write_packed(dst, i, to, value);
                }
            }),
        ))
    }
}

// ---------------------------------------------------------------------------
// Inverter
// ---------------------------------------------------------------------------

/// Replace every sample `v` with `max - v`, alpha channels included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inverter;

impl ImageTransform for Inverter {
    fn apply(&self, frame: Box<dyn ImageFrame>) -> Result<Box<dyn ImageFrame>> {
        let info = frame.info().clone();
        info.validate()?;
        // For n-bit samples max - v equals the bitwise complement, so whole
        // bytes can be flipped regardless of packing.
        Ok(MappedFrame::boxed(
            frame,
            info,
            Box::new(|src, dst| {
                for (out, byte) in dst.iter_mut().zip(src) {
                    *out = !byte;
                }
            }),
        ))
    }
}

// ---------------------------------------------------------------------------
// Device colour converter
// ---------------------------------------------------------------------------

/// Convert between DeviceGray, DeviceRGB and DeviceCMYK using the plain
/// device formulas (no ICC profiles, no rendering intent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorConverter {
    pub target: ColorSpace,
}

impl ColorConverter {
    pub fn new(target: ColorSpace) -> Self {
        Self { target }
    }
}

impl ImageTransform for ColorConverter {
    fn apply(&self, frame: Box<dyn ImageFrame>) -> Result<Box<dyn ImageFrame>> {
        let source = frame.info().clone();
        source.validate()?;
        if source.color_space == self.target {
            return Ok(frame);
        }
        check_device_space(&source.color_space)?;
        check_device_space(&self.target)?;
        if source.channels as usize != source.color_space.num_components() {
            return Err(RasterError::UnsupportedFormat(format!(
                "colour conversion of {} with {} channels (alpha not supported)",
                source.color_space, source.channels
            )));
        }
        let depth = rasterwerk_core::SampleDepth::from_bits(source.bits_per_sample)?;
        debug!(from = %source.color_space, to = %self.target, "Colour converter attached");

        let from_space = source.color_space.clone();
        let to_space = self.target.clone();
        let in_channels = from_space.num_components();
        let out_channels = to_space.num_components();
        let max = max_value(depth.bits()) as f32;
        let bits = depth.bits();
        let width = source.width as usize;

        let mut target = source;
        target.color_space = to_space.clone();
        target.channels = out_channels as u8;

        Ok(MappedFrame::boxed(
            frame,
            target,
            Box::new(move |src, dst| {
                let mut pixel = [0f32; 4];
                for x in 0..width {
                    for (c, value) in pixel.iter_mut().enumerate().take(in_channels) {
                        *value = read_packed(src, x * in_channels + c, bits) as f32 / max;
                    }
                    let rgb = to_rgb(&from_space, &pixel);
                    let out = from_rgb(&to_space, rgb);
                    for (c, value) in out.iter().enumerate().take(out_channels) {
                        let sample = (value.clamp(0.0, 1.0) * max + 0.5) as u32;
                        write_packed(dst, x * out_channels + c, bits, sample);
                    }
                }
            }),
        ))
    }
}

fn check_device_space(space: &ColorSpace) -> Result<()> {
    match space {
        ColorSpace::DeviceGray | ColorSpace::DeviceRgb | ColorSpace::DeviceCmyk => Ok(()),
        other => Err(RasterError::UnsupportedFormat(format!(
            "no device conversion for {other}"
        ))),
    }
}

fn to_rgb(space: &ColorSpace, pixel: &[f32; 4]) -> [f32; 3] {
    match space {
        ColorSpace::DeviceGray => [pixel[0]; 3],
        ColorSpace::DeviceCmyk => {
            let k = 1.0 - pixel[3];
            [(1.0 - pixel[0]) * k, (1.0 - pixel[1]) * k, (1.0 - pixel[2]) * k]
        }
        _ => [pixel[0], pixel[1], pixel[2]],
    }
}

fn from_rgb(space: &ColorSpace, [r, g, b]: [f32; 3]) -> [f32; 4] {
    match space {
        ColorSpace::DeviceGray => [0.299 * r + 0.587 * g + 0.114 * b, 0.0, 0.0, 0.0],
        ColorSpace::DeviceCmyk => {
            let k = 1.0 - r.max(g).max(b);
            if k >= 1.0 {
                return [0.0, 0.0, 0.0, 1.0];
            }
            let scale = 1.0 - k;
            [(1.0 - r - k) / scale, (1.0 - g - k) / scale, (1.0 - b - k) / scale, k]
        }
        _ => [r, g, b, 0.0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterwerk_core::frame::BufferFrame;

    fn frame(space: ColorSpace, width: u32, height: u32, bits: u8, data: Vec<u8>) -> Box<dyn ImageFrame> {
        let info = FrameInfo::new(space, width, height, bits, 72.0, 72.0);
        Box::new(BufferFrame::new(info, data).unwrap())
    }

    fn read_all(frame: Box<dyn ImageFrame>) -> Vec<u8> {
        frame
            .into_scanlines()
            .collect::<Result<Vec<_>>>()
            .unwrap()
            .concat()
    }

    #[test]
    fn one_bit_scales_to_black_and_white() {
        // 10 pixels wide: 2 bytes per packed row.
        let source = frame(ColorSpace::DeviceGray, 10, 2, 1, vec![0b1011_0000, 0b0100_0000, 0xFF, 0xC0]);
        let scaled = BitScaler::new(8).apply(source).unwrap();
        assert_eq!(scaled.info().bits_per_sample, 8);
        let out = read_all(scaled);
        assert_eq!(out.len(), 20);
        assert!(out.iter().all(|v| *v == 0 || *v == 255));
        assert_eq!(&out[..10], &[255, 0, 255, 255, 0, 0, 0, 0, 0, 255]);
        assert_eq!(&out[10..], &[255; 10]);
    }

    #[test]
    fn same_depth_is_passthrough() {
        let source = frame(ColorSpace::DeviceGray, 2, 1, 8, vec![3, 4]);
        let out = read_all(BitScaler::new(8).apply(source).unwrap());
        assert_eq!(out, vec![3, 4]);
    }

    #[test]
    fn skipped_rows_are_not_converted() {
        let source = frame(ColorSpace::DeviceGray, 8, 3, 1, vec![0x00, 0xFF, 0x0F]);
        let mut scaled = BitScaler::new(8).apply(source).unwrap();
        scaled.skip_scanlines(2).unwrap();
        let mut row = [0u8; 8];
        scaled.read_scanline(&mut row).unwrap();
        assert_eq!(row, [0, 0, 0, 0, 255, 255, 255, 255]);
    }

    #[test]
    fn inverter_flips_packed_and_sixteen_bit() {
        let packed = frame(ColorSpace::DeviceGray, 8, 1, 1, vec![0b1100_0011]);
        assert_eq!(read_all(Inverter.apply(packed).unwrap()), vec![0b0011_1100]);

        let wide = frame(ColorSpace::DeviceGray, 1, 1, 16, vec![0x12, 0x34]);
        let out = read_all(Inverter.apply(wide).unwrap());
        assert_eq!(u16::from_be_bytes([out[0], out[1]]), 0xFFFF - 0x1234);
    }

    #[test]
    fn cmyk_to_rgb_device_formula() {
        // White, pure cyan, full black.
        let source = frame(
            ColorSpace::DeviceCmyk,
            3,
            1,
            8,
            vec![0, 0, 0, 0, 255, 0, 0, 0, 0, 0, 0, 255],
        );
        let out = read_all(ColorConverter::new(ColorSpace::DeviceRgb).apply(source).unwrap());
        assert_eq!(out, vec![255, 255, 255, 0, 255, 255, 0, 0, 0]);
    }

    #[test]
    fn rgb_to_gray_then_invert_builds_mask() {
        let source = frame(ColorSpace::DeviceRgb, 2, 1, 8, vec![255, 255, 255, 0, 0, 0]);
        let chain = TransformChain::new()
            .then(ColorConverter::new(ColorSpace::DeviceGray))
            .then(Inverter);
        assert_eq!(chain.len(), 2);
        let mask = chain.apply(source).unwrap();
        assert_eq!(mask.info().channels, 1);
        assert_eq!(read_all(mask), vec![0, 255]);
    }

    #[test]
    fn lab_conversion_rejected() {
        let source = frame(ColorSpace::Lab, 1, 1, 8, vec![0, 0, 0]);
        let Err(err) = ColorConverter::new(ColorSpace::DeviceRgb).apply(source) else {
            panic!("Lab source must be rejected");
        };
        assert!(matches!(err, RasterError::UnsupportedFormat(_)));
    }
}
