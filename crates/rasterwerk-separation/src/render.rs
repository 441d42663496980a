// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Separation renderer: produces one grayscale plane per retained ink, either
// as owned planes or written into caller-supplied frame buffers.
//
// Rasterisation itself is delegated to a `Rasterizer`; this module resolves
// the ink selection, sizes the output, checks what comes back, and lays the
// samples out. Both output modes go through the same rendered planes, so
// they always agree byte for byte.

use rasterwerk_core::config::EngineConfig;
use rasterwerk_core::error::{RasterError, Result};
use rasterwerk_core::plane::{RasterPlane, read_sample, write_sample};
use rasterwerk_core::types::{ColorSpace, Rect, SampleDepth};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::ink::{Ink, InkSelection, SeparationSet};

/// Everything a rasterizer needs to render one page region.
#[derive(Debug, Clone)]
pub struct RenderRequest<'a> {
    pub process_space: &'a ColorSpace,
    /// Spots that get their own plane, in plane order after the process
    /// planes.
    pub spots: &'a [Ink],
    /// Spots that must not paint.
    pub ignored: &'a [String],
    /// Page region in page units.
    pub bounds: Rect,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub depth: SampleDepth,
}

impl RenderRequest<'_> {
    /// Number of planes the rasterizer must return.
    pub fn plane_count(&self) -> usize {
        self.process_space.num_components() + self.spots.len()
    }
}

/// External collaborator that turns page content into ink planes.
pub trait Rasterizer {
    type Content: ?Sized;

    /// Spot inks used by `content`, represented in `process_space`.
    fn find_inks(&self, content: &Self::Content, process_space: &ColorSpace) -> Result<Vec<Ink>>;

    /// Render one plane per process channel followed by one per requested
    /// spot, each `pixel_width` x `pixel_height` at `depth`.
    fn render(&self, content: &Self::Content, request: &RenderRequest<'_>) -> Result<Vec<RasterPlane>>;
}

/// Placement of one ink's samples inside a shared output buffer.
///
/// Sample `(x, y)` starts at `offset + y * row_stride + x * pixel_stride`.
/// A `pixel_stride` of 0 means samples are tightly packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameBufferInfo {
    pub offset: usize,
    pub row_stride: usize,
    pub pixel_stride: usize,
}

impl FrameBufferInfo {
    /// Layout for plane `index` of a buffer holding whole planes back to back.
    pub fn planar(index: usize, width: u32, height: u32, depth: SampleDepth) -> Self {
        let row_stride = width as usize * depth.bytes();
        Self {
            offset: index * row_stride * height as usize,
            row_stride,
            pixel_stride: 0,
        }
    }

    /// Layout for channel `index` of a pixel-interleaved buffer.
    pub fn interleaved(index: usize, channels: usize, width: u32, depth: SampleDepth) -> Self {
        let pixel_stride = channels * depth.bytes();
        Self {
            offset: index * depth.bytes(),
            row_stride: width as usize * pixel_stride,
            pixel_stride,
        }
    }

    fn effective_pixel_stride(&self, depth: SampleDepth) -> usize {
        if self.pixel_stride == 0 {
            depth.bytes()
        } else {
            self.pixel_stride
        }
    }

    /// Smallest buffer length that holds every sample of a plane.
    pub fn required_len(&self, width: u32, height: u32, depth: SampleDepth) -> usize {
        if width == 0 || height == 0 {
            return self.offset;
        }
        self.offset
            + (height as usize - 1) * self.row_stride
            + (width as usize - 1) * self.effective_pixel_stride(depth)
            + depth.bytes()
    }
}

/// Result of the plane-returning output mode.
#[derive(Debug, Clone)]
pub struct SeparationOutput {
    pub set: SeparationSet,
    pub planes: Vec<RasterPlane>,
}

/// Renders separations at the configured resolution and depth.
#[derive(Debug)]
pub struct SeparationRenderer<R> {
    rasterizer: R,
    config: EngineConfig,
}

impl<R: Rasterizer> SeparationRenderer<R> {
    pub fn new(rasterizer: R, config: EngineConfig) -> Self {
        Self { rasterizer, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Pixel size of `bounds` at the configured resolution.
    pub fn pixel_size(&self, bounds: &Rect) -> (u32, u32) {
        (
            self.config.page_to_pixels(bounds.width),
            self.config.page_to_pixels(bounds.height),
        )
    }

    /// Spot inks used by the page.
    pub fn find_inks(&self, content: &R::Content, process_space: &ColorSpace) -> Result<Vec<Ink>> {
        self.rasterizer.find_inks(content, process_space)
    }

    /// Render one plane per retained ink (process channels first).
    #[instrument(skip_all, fields(process = %process_space))]
    pub fn render_separations(
        &self,
        content: &R::Content,
        process_space: &ColorSpace,
        selection: &InkSelection,
        bounds: Rect,
    ) -> Result<SeparationOutput> {
        let (set, ignored) = self.resolve_set(content, process_space, selection)?;
        let planes = self.render_planes(content, &set, &ignored, bounds)?;
        info!(
            inks = set.len(),
            width = planes[0].width(),
            height = planes[0].height(),
            "Separations rendered"
        );
        Ok(SeparationOutput { set, planes })
    }

    /// Render into `buffer`, placing ink `i` according to `layouts[i]`.
    ///
    /// The layout count and buffer size are checked before anything is
    /// rendered or written.
    #[instrument(skip_all, fields(process = %process_space, buffer_len = buffer.len()))]
    pub fn render_to_frame_buffers(
        &self,
        content: &R::Content,
        process_space: &ColorSpace,
        selection: &InkSelection,
        bounds: Rect,
        buffer: &mut [u8],
        layouts: &[FrameBufferInfo],
    ) -> Result<SeparationSet> {
        let (set, ignored) = self.resolve_set(content, process_space, selection)?;
        if layouts.len() != set.len() {
            return Err(RasterError::UnsupportedFormat(format!(
                "{} frame buffer layouts for {} inks",
                layouts.len(),
                set.len()
            )));
        }
        let (width, height) = self.pixel_size(&bounds);
        let depth = SampleDepth::from_bits(self.config.render_depth)?;
        for layout in layouts {
            let required = layout.required_len(width, height, depth);
            if buffer.len() < required {
                return Err(RasterError::BufferTooSmall {
                    required,
                    actual: buffer.len(),
                });
            }
        }

        let planes = self.render_planes(content, &set, &ignored, bounds)?;
        for (plane, layout) in planes.iter().zip(layouts) {
            scatter_plane(plane, layout, buffer);
        }
        info!(inks = set.len(), width, height, "Separations written to frame buffers");
        Ok(set)
    }

    fn resolve_set(
        &self,
        content: &R::Content,
        process_space: &ColorSpace,
        selection: &InkSelection,
    ) -> Result<(SeparationSet, Vec<String>)> {
        let inventory = self.rasterizer.find_inks(content, process_space)?;
        let resolved = selection.resolve(&inventory)?;
        let set = SeparationSet::new(process_space.clone(), resolved.retained)?;
        Ok((set, resolved.ignored))
    }

    fn render_planes(
        &self,
        content: &R::Content,
        set: &SeparationSet,
        ignored: &[String],
        bounds: Rect,
    ) -> Result<Vec<RasterPlane>> {
        if set.is_empty() {
            return Err(RasterError::UnsupportedFormat(format!(
                "{} has no colorants to render",
                set.process_space()
            )));
        }
        let (pixel_width, pixel_height) = self.pixel_size(&bounds);
        if pixel_width == 0 || pixel_height == 0 {
            return Err(RasterError::UnsupportedFormat(format!(
                "page region renders to {pixel_width}x{pixel_height} pixels"
            )));
        }
        let request = RenderRequest {
            process_space: set.process_space(),
            spots: set.spot_inks(),
            ignored,
            bounds,
            pixel_width,
            pixel_height,
            depth: SampleDepth::from_bits(self.config.render_depth)?,
        };
        debug!(
            pixel_width,
            pixel_height,
            planes = request.plane_count(),
            "Rasterizing"
        );

        let planes = self.rasterizer.render(content, &request)?;
        if planes.len() != request.plane_count() {
            return Err(RasterError::Rasterizer(format!(
                "returned {} planes for {} inks",
                planes.len(),
                request.plane_count()
            )));
        }
        for plane in &planes {
            if plane.width() != pixel_width || plane.height() != pixel_height {
                return Err(RasterError::DimensionMismatch {
                    expected_width: pixel_width,
                    expected_height: pixel_height,
                    actual_width: plane.width(),
                    actual_height: plane.height(),
                });
            }
            if plane.depth() != request.depth {
                return Err(RasterError::Rasterizer(format!(
                    "returned {}-bit plane for a {}-bit request",
                    plane.depth().bits(),
                    request.depth.bits()
                )));
            }
        }
        Ok(planes)
    }
}

fn scatter_plane(plane: &RasterPlane, layout: &FrameBufferInfo, buffer: &mut [u8]) {
    let depth = plane.depth();
    let pixel_stride = layout.effective_pixel_stride(depth);
    for y in 0..plane.height() {
        let row = plane.row(y);
        let row_start = layout.offset + y as usize * layout.row_stride;
        for x in 0..plane.width() as usize {
            let value = read_sample(row, x, depth);
            let at = row_start + x * pixel_stride;
            write_sample(&mut buffer[at..at + depth.bytes()], 0, depth, value);
        }
    }
}
