// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster assembler: packs per-ink planes into a single multi-channel image.
//
// Interleaved output stores the channels of each pixel together, in plane
// order. Planar output keeps one tightly packed buffer per plane. Either
// way, padding from the source planes is dropped.
//
// Samples are ink coverage (0 = no ink) whatever the process space. For
// additive spaces that is the complement of what an encoder expects, so
// `preview_chain` inverts them before converting.

use rasterwerk_core::config::EngineConfig;
use rasterwerk_core::error::{RasterError, Result};
use rasterwerk_core::frame::BufferFrame;
use rasterwerk_core::plane::{RasterPlane, read_sample, write_sample};
use rasterwerk_core::types::{ColorSpace, FrameInfo};
use rasterwerk_scanline::{ColorConverter, Inverter, RawImage, TransformChain};
use tracing::{debug, instrument};

/// An interleaved image built from separation planes.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledRaster {
    info: FrameInfo,
    data: Vec<u8>,
}

impl AssembledRaster {
    pub fn info(&self) -> &FrameInfo {
        &self.info
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Read the raster back as a frame, e.g. to feed a `ColorConverter`.
    pub fn into_frame(self) -> Result<BufferFrame> {
        BufferFrame::new(self.info, self.data)
    }

    pub fn into_parts(self) -> (FrameInfo, Vec<u8>) {
        (self.info, self.data)
    }
}

/// Interleave `planes` into one image in `color_space`.
///
/// The plane count must match the colour space's component count, and all
/// planes must agree on size and depth.
#[instrument(skip(planes), fields(planes = planes.len()))]
pub fn assemble_interleaved(
    planes: &[RasterPlane],
    color_space: ColorSpace,
    x_resolution: f64,
    y_resolution: f64,
) -> Result<AssembledRaster> {
    let info = describe(planes, color_space, x_resolution, y_resolution)?;
    let stride = info.row_stride();
    let mut data = vec![0u8; stride * info.height as usize];
    for (y, row) in data.chunks_exact_mut(stride.max(1)).enumerate() {
        interleave_row(planes, y as u32, row);
    }
    debug!(width = info.width, height = info.height, bytes = data.len(), "Planes interleaved");
    Ok(AssembledRaster { info, data })
}

/// Copy each plane into its own tightly packed buffer, in plane order.
pub fn assemble_planar(planes: &[RasterPlane]) -> Vec<Vec<u8>> {
    planes.iter().map(RasterPlane::to_packed).collect()
}

/// Interleave `planes` row by row into a scratch-backed `RawImage`, without
/// holding the whole output in memory.
#[instrument(skip(config, planes), fields(planes = planes.len()))]
pub fn stream_interleaved(
    config: &EngineConfig,
    planes: &[RasterPlane],
    color_space: ColorSpace,
    x_resolution: f64,
    y_resolution: f64,
) -> Result<RawImage> {
    let info = describe(planes, color_space, x_resolution, y_resolution)?;
    let mut row = vec![0u8; info.row_stride()];
    let height = info.height;
    let mut writer = RawImage::create_writer(config, info)?;
    for y in 0..height {
        interleave_row(planes, y, &mut row);
        writer.write_scanline(&row)?;
    }
    writer.flush()
}

/// Transforms that turn an assembled coverage raster in `process_space` into
/// a viewable image in `target`.
pub fn preview_chain(process_space: &ColorSpace, target: ColorSpace) -> TransformChain {
    let chain = if process_space.is_subtractive() {
        TransformChain::new()
    } else {
        debug!(process = %process_space, "Additive process space; coverage inverted for preview");
        TransformChain::new().then(Inverter)
    };
    chain.then(ColorConverter::new(target))
}

fn describe(
    planes: &[RasterPlane],
    color_space: ColorSpace,
    x_resolution: f64,
    y_resolution: f64,
) -> Result<FrameInfo> {
    let Some(first) = planes.first() else {
        return Err(RasterError::UnsupportedFormat("no planes to assemble".into()));
    };
    let components = color_space.num_components();
    if planes.len() != components {
        return Err(RasterError::UnsupportedFormat(format!(
            "{} planes for {color_space} ({components} components)",
            planes.len()
        )));
    }
    for plane in &planes[1..] {
        if !plane.same_dimensions(first) {
            return Err(RasterError::DimensionMismatch {
                expected_width: first.width(),
                expected_height: first.height(),
                actual_width: plane.width(),
                actual_height: plane.height(),
            });
        }
        if plane.depth() != first.depth() {
            return Err(RasterError::UnsupportedFormat(format!(
                "mixed {}-bit and {}-bit planes",
                first.depth().bits(),
                plane.depth().bits()
            )));
        }
    }
    Ok(FrameInfo::new(
        color_space,
        first.width(),
        first.height(),
        first.depth().bits(),
        x_resolution,
        y_resolution,
    ))
}

fn interleave_row(planes: &[RasterPlane], y: u32, out: &mut [u8]) {
    let channels = planes.len();
    for (c, plane) in planes.iter().enumerate() {
        let depth = plane.depth();
        let src = plane.row(y);
        for x in 0..plane.width() as usize {
            write_sample(out, x * channels + c, depth, read_sample(src, x, depth));
        }
    }
}
