// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sub-image extraction: copy a rectangular region out of a forward-only
// source in a single pass, holding one source row and one target row in
// memory at a time. The result is written through a compressed temporary
// store rather than an in-memory buffer.

use rasterwerk_core::config::EngineConfig;
use rasterwerk_core::error::{RasterError, Result};
use rasterwerk_core::frame::ImageFrame;
use rasterwerk_core::types::Region;
use tracing::{debug, info, instrument, warn};

use crate::raw_image::RawImage;
use crate::transform::{BitScaler, ImageTransform};

/// Bring a frame to a byte-aligned depth: below 8 bits scales to 8, any
/// other depth except 8 and 16 scales to 16.
pub fn normalize_depth(frame: Box<dyn ImageFrame>) -> Result<Box<dyn ImageFrame>> {
    frame.info().validate()?;
    match frame.info().bits_per_sample {
        8 | 16 => Ok(frame),
        bps if bps < 8 => BitScaler::new(8).apply(frame),
        _ => BitScaler::new(16).apply(frame),
    }
}

/// Extract `region` from `source`.
///
/// Returns `Ok(None)` when the region is empty or not fully contained in the
/// source; nothing is read in that case. Unsupported layouts fail before any
/// row is read. The source must not have been advanced yet.
#[instrument(skip_all, fields(region = %region))]
pub fn extract_sub_image(
    config: &EngineConfig,
    source: impl ImageFrame + 'static,
    region: Region,
) -> Result<Option<RawImage>> {
    if source.position() != 0 {
        return Err(RasterError::UnsupportedFormat(format!(
            "source already advanced to row {}",
            source.position()
        )));
    }
    let source_bits = source.info().bits_per_sample;
    let mut frame = normalize_depth(Box::new(source))?;
    let source_info = frame.info().clone();

    let stride = source_info.row_stride();
    let bytes_per_pixel = source_info.bytes_per_pixel()?;
    debug!(
        source_bits,
        bits = source_info.bits_per_sample,
        stride,
        bytes_per_pixel,
        "Source normalised"
    );

    if region.is_empty() || !region.is_within(source_info.width, source_info.height) {
        warn!(
            source_width = source_info.width,
            source_height = source_info.height,
            "Region outside source image"
        );
        return Ok(None);
    }

    let mut target_info = source_info.clone();
    target_info.width = region.width;
    target_info.height = region.height;
    let mut writer = RawImage::create_writer(config, target_info)?;

    let start = region.x as usize * bytes_per_pixel;
    let end = start + region.width as usize * bytes_per_pixel;
    let mut row_buffer = vec![0u8; stride];

    frame.skip_scanlines(region.y)?;
    for _ in 0..region.height {
        frame.read_scanline(&mut row_buffer)?;
        writer.write_scanline(&row_buffer[start..end])?;
    }

    let image = writer.flush()?;
    info!(
        width = image.width(),
        height = image.height(),
        compressed = image.compressed_len(),
        "Sub-image extracted"
    );
    Ok(Some(image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterwerk_core::config::ScratchBacking;
    use rasterwerk_core::error::ErrorKind;
    use rasterwerk_core::frame::BufferFrame;
    use rasterwerk_core::types::{ColorSpace, FrameInfo};

    /// Gray source whose reads fail with an I/O error from row `fail_at` on.
    struct FailingFrame {
        info: FrameInfo,
        row: u32,
        fail_at: u32,
    }

    impl FailingFrame {
        fn new(width: u32, height: u32, fail_at: u32) -> Self {
            Self {
                info: FrameInfo::new(ColorSpace::DeviceGray, width, height, 8, 72.0, 72.0),
                row: 0,
                fail_at,
            }
        }
    }

    impl ImageFrame for FailingFrame {
        fn info(&self) -> &FrameInfo {
            &self.info
        }

        fn position(&self) -> u32 {
            self.row
        }

        fn read_scanline(&mut self, buf: &mut [u8]) -> Result<()> {
            if self.row >= self.fail_at {
                return Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated source").into());
            }
            buf[..self.info.row_stride()].fill(self.row as u8);
            self.row += 1;
            Ok(())
        }
    }

    /// Deterministic RGB test image: each sample encodes its coordinates.
    fn rgb_source(width: u32, height: u32) -> (FrameInfo, Vec<u8>) {
        let info = FrameInfo::new(ColorSpace::DeviceRgb, width, height, 8, 96.0, 96.0);
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                data.push((x % 251) as u8);
                data.push((y % 241) as u8);
                data.push(((x + y) % 256) as u8);
            }
        }
        (info, data)
    }

    #[test]
    fn full_extraction_is_identity() {
        let (info, data) = rgb_source(37, 19);
        let source = BufferFrame::new(info.clone(), data.clone()).unwrap();
        let image = extract_sub_image(&EngineConfig::default(), source, Region::full(37, 19))
            .unwrap()
            .expect("full region is in bounds");
        assert_eq!(image.info(), &info);
        assert_eq!(image.into_bytes().unwrap(), data);
    }

    #[test]
    fn region_from_large_rgb_image() {
        let (info, data) = rgb_source(2000, 1500);
        let source_row_230 = data[230 * 6000..231 * 6000].to_vec();
        let source = BufferFrame::new(info, data).unwrap();

        let image = extract_sub_image(
            &EngineConfig::default(),
            source,
            Region::new(230, 230, 400, 250),
        )
        .unwrap()
        .expect("region is in bounds");
        assert_eq!((image.width(), image.height()), (400, 250));

        let mut frame = image.into_frame();
        let mut row = vec![0u8; 1200];
        frame.read_scanline(&mut row).unwrap();
        assert_eq!(row, source_row_230[230 * 3..630 * 3]);
    }

    #[test]
    fn out_of_bounds_region_returns_none() {
        let (info, data) = rgb_source(10, 10);
        let source = BufferFrame::new(info, data).unwrap();
        let result = extract_sub_image(&EngineConfig::default(), source, Region::new(5, 0, 6, 2)).unwrap();
        assert!(result.is_none());

        let (info, data) = rgb_source(10, 10);
        let source = BufferFrame::new(info, data).unwrap();
        let result = extract_sub_image(&EngineConfig::default(), source, Region::new(0, 9, 1, 2)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn empty_region_returns_none() {
        let (info, data) = rgb_source(4, 4);
        let source = BufferFrame::new(info, data).unwrap();
        let result = extract_sub_image(&EngineConfig::default(), source, Region::new(1, 1, 0, 2)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn one_bit_source_normalised_to_eight() {
        // 12x2 gray, 1 bit: rows are 2 bytes.
        let info = FrameInfo::new(ColorSpace::DeviceGray, 12, 2, 1, 72.0, 72.0);
        let source = BufferFrame::new(info, vec![0b1010_1010, 0b1111_0000, 0x00, 0x30]).unwrap();
        let config = EngineConfig {
            scratch_backing: ScratchBacking::Memory,
            ..EngineConfig::default()
        };
        let image = extract_sub_image(&config, source, Region::new(2, 0, 10, 2))
            .unwrap()
            .unwrap();
        assert_eq!(image.info().bits_per_sample, 8);
        let bytes = image.into_bytes().unwrap();
        assert!(bytes.iter().all(|v| *v == 0 || *v == 255));
        assert_eq!(&bytes[..10], &[255, 0, 255, 0, 255, 0, 255, 255, 255, 255]);
        assert_eq!(&bytes[10..], &[0, 0, 0, 0, 0, 0, 0, 0, 255, 255]);
    }

    #[test]
    fn twelve_bit_source_normalised_to_sixteen() {
        let info = FrameInfo::new(ColorSpace::DeviceGray, 2, 1, 12, 72.0, 72.0);
        let source = BufferFrame::new(info, vec![0xFF, 0xF0, 0x00]).unwrap();
        let image = extract_sub_image(&EngineConfig::default(), source, Region::full(2, 1))
            .unwrap()
            .unwrap();
        assert_eq!(image.info().bits_per_sample, 16);
        assert_eq!(image.into_bytes().unwrap(), vec![0xFF, 0xFF, 0x00, 0x00]);
    }

    #[test]
    fn sixteen_bit_rgb_slices_whole_pixels() {
        let info = FrameInfo::new(ColorSpace::DeviceRgb, 3, 1, 16, 72.0, 72.0);
        let data: Vec<u8> = (0..18).collect();
        let source = BufferFrame::new(info, data).unwrap();
        let image = extract_sub_image(&EngineConfig::default(), source, Region::new(1, 0, 1, 1))
            .unwrap()
            .unwrap();
        assert_eq!(image.into_bytes().unwrap(), (6..12).collect::<Vec<u8>>());
    }

    #[test]
    fn unsupported_depth_fails_before_reading() {
        let info = FrameInfo::new(ColorSpace::DeviceGray, 1, 1, 40, 72.0, 72.0);
        let source = BufferFrame::new(info, vec![0; 5]);
        assert!(source.is_err());

        let info = FrameInfo::new(ColorSpace::DeviceRgb, 1, 1, 8, 72.0, 72.0);
        let mut source = BufferFrame::new(info, vec![1, 2, 3]).unwrap();
        let mut row = [0u8; 3];
        source.read_scanline(&mut row).unwrap();
        let err = extract_sub_image(&EngineConfig::default(), source, Region::full(1, 1)).unwrap_err();
        assert!(matches!(err, RasterError::UnsupportedFormat(_)));
    }

    #[test]
    fn source_failure_mid_region_is_a_resource_error() {
        // Rows 1..5 are requested; row 3 is the last one the source delivers.
        let source = FailingFrame::new(4, 6, 4);
        let Err(err) = extract_sub_image(&EngineConfig::default(), source, Region::new(0, 1, 4, 4)) else {
            panic!("a truncated source must not yield an image");
        };
        assert!(matches!(err, RasterError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Resource);
    }

    #[test]
    fn source_failure_while_skipping_is_a_resource_error() {
        let source = FailingFrame::new(4, 6, 2);
        let Err(err) = extract_sub_image(&EngineConfig::default(), source, Region::new(0, 3, 4, 1)) else {
            panic!("a truncated source must not yield an image");
        };
        assert_eq!(err.kind(), ErrorKind::Resource);
    }

    #[test]
    fn healthy_prefix_of_failing_source_still_extracts() {
        let source = FailingFrame::new(4, 6, 4);
        let image = extract_sub_image(&EngineConfig::default(), source, Region::new(1, 1, 2, 3))
            .unwrap()
            .expect("rows 1..4 are readable");
        assert_eq!(image.into_bytes().unwrap(), vec![1, 1, 2, 2, 3, 3]);
    }
}
