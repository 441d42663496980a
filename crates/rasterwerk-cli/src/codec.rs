// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image file codec: decodes files into frames and encodes raw samples back
// into PNG/TIFF/JPEG through the `image` crate.
//
// Sixteen-bit samples travel as big-endian bytes inside the engine and as
// native `u16` inside `image` buffers; this module converts at the edge.

use std::path::Path;

use image::{DynamicImage, ImageBuffer, Luma, LumaA, Rgb, Rgba};
use rasterwerk_core::error::{RasterError, Result};
use rasterwerk_core::frame::{BufferFrame, ImageFrame};
use rasterwerk_core::plane::RasterPlane;
use rasterwerk_core::types::{ColorSpace, FrameInfo};
use tracing::{debug, info, instrument};

/// Decode an image file into an in-memory frame.
///
/// Files carry no usable resolution through `image`, so `resolution` (dpi)
/// is recorded on the frame.
///
/// `image` decodes the whole file up front, so the frame holds the full
/// source in memory. Extraction from it still streams: only the output goes
/// through scratch storage.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn open_frame(path: impl AsRef<Path>, resolution: f64) -> Result<BufferFrame> {
    let image = image::open(path.as_ref()).map_err(|err| {
        RasterError::Codec(format!("failed to open {}: {}", path.as_ref().display(), err))
    })?;
    info!(width = image.width(), height = image.height(), "Image loaded");
    frame_from_dynamic(image, resolution)
}

/// Describe a decoded image as a frame, keeping its depth and alpha channel.
pub fn frame_from_dynamic(image: DynamicImage, resolution: f64) -> Result<BufferFrame> {
    let (width, height) = (image.width(), image.height());
    let describe = |color_space: ColorSpace, bits: u8, channels: u8| {
        FrameInfo::new(color_space, width, height, bits, resolution, resolution).with_channels(channels)
    };

    let (info, data) = match image {
        DynamicImage::ImageLuma8(buf) => (describe(ColorSpace::DeviceGray, 8, 1), buf.into_raw()),
        DynamicImage::ImageLumaA8(buf) => (describe(ColorSpace::DeviceGray, 8, 2), buf.into_raw()),
        DynamicImage::ImageRgb8(buf) => (describe(ColorSpace::DeviceRgb, 8, 3), buf.into_raw()),
        DynamicImage::ImageRgba8(buf) => (describe(ColorSpace::DeviceRgb, 8, 4), buf.into_raw()),
        DynamicImage::ImageLuma16(buf) => (describe(ColorSpace::DeviceGray, 16, 1), to_be_bytes(&buf)),
        DynamicImage::ImageLumaA16(buf) => (describe(ColorSpace::DeviceGray, 16, 2), to_be_bytes(&buf)),
        DynamicImage::ImageRgb16(buf) => (describe(ColorSpace::DeviceRgb, 16, 3), to_be_bytes(&buf)),
        DynamicImage::ImageRgba16(buf) => (describe(ColorSpace::DeviceRgb, 16, 4), to_be_bytes(&buf)),
        other => {
            debug!("Widening floating-point image to 16-bit RGBA");
            let buf = other.to_rgba16();
            (describe(ColorSpace::DeviceRgb, 16, 4), to_be_bytes(&buf))
        }
    };
    BufferFrame::new(info, data)
}

/// Build an encodable image from tightly packed rows described by `info`.
///
/// Only 8- and 16-bit Gray and RGB, with or without alpha, can be encoded;
/// convert other colour spaces first.
pub fn dynamic_from_raw(info: &FrameInfo, data: Vec<u8>) -> Result<DynamicImage> {
    let (width, height) = (info.width, info.height);
    let layout = (&info.color_space, info.channels, info.bits_per_sample);
    let image = match layout {
        (ColorSpace::DeviceGray, 1, 8) => ImageBuffer::<Luma<u8>, _>::from_raw(width, height, data).map(DynamicImage::ImageLuma8),
        (ColorSpace::DeviceGray, 2, 8) => ImageBuffer::<LumaA<u8>, _>::from_raw(width, height, data).map(DynamicImage::ImageLumaA8),
        (ColorSpace::DeviceRgb, 3, 8) => ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, data).map(DynamicImage::ImageRgb8),
        (ColorSpace::DeviceRgb, 4, 8) => ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, data).map(DynamicImage::ImageRgba8),
        (ColorSpace::DeviceGray, 1, 16) => ImageBuffer::<Luma<u16>, _>::from_raw(width, height, from_be_bytes(&data)).map(DynamicImage::ImageLuma16),
        (ColorSpace::DeviceGray, 2, 16) => ImageBuffer::<LumaA<u16>, _>::from_raw(width, height, from_be_bytes(&data)).map(DynamicImage::ImageLumaA16),
        (ColorSpace::DeviceRgb, 3, 16) => ImageBuffer::<Rgb<u16>, _>::from_raw(width, height, from_be_bytes(&data)).map(DynamicImage::ImageRgb16),
        (ColorSpace::DeviceRgb, 4, 16) => ImageBuffer::<Rgba<u16>, _>::from_raw(width, height, from_be_bytes(&data)).map(DynamicImage::ImageRgba16),
        (space, channels, bits) => {
            return Err(RasterError::UnsupportedFormat(format!(
                "cannot encode {bits}-bit {space} with {channels} channels"
            )));
        }
    };
    image.ok_or_else(|| {
        RasterError::Codec(format!("sample buffer does not fill a {width}x{height} image"))
    })
}

/// Encode `info`/`data` to `path`; the format follows the file extension.
#[instrument(skip(info, data), fields(path = %path.as_ref().display()))]
pub fn save_raw(path: impl AsRef<Path>, info: &FrameInfo, data: Vec<u8>) -> Result<()> {
    let image = dynamic_from_raw(info, data)?;
    image.save(path.as_ref()).map_err(|err| {
        RasterError::Codec(format!("failed to write {}: {}", path.as_ref().display(), err))
    })?;
    debug!(width = info.width, height = info.height, "Image written");
    Ok(())
}

/// Encode one separation plane as a grayscale image.
pub fn save_plane(path: impl AsRef<Path>, plane: &RasterPlane, resolution: f64) -> Result<()> {
    let info = FrameInfo::new(
        ColorSpace::DeviceGray,
        plane.width(),
        plane.height(),
        plane.depth().bits(),
        resolution,
        resolution,
    );
    save_raw(path, &info, plane.to_packed())
}

/// Pull every remaining row of `frame` into one buffer.
pub fn read_all(frame: impl ImageFrame) -> Result<Vec<u8>> {
    let rows = frame.into_scanlines().collect::<Result<Vec<_>>>()?;
    Ok(rows.concat())
}

fn to_be_bytes(samples: &[u16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_be_bytes()).collect()
}

fn from_be_bytes(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect()
}
