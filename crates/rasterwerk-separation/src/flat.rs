// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Flat-fill rasterizer for declarative page content.
//
// A `FlatPage` is a list of opaque rectangles painted in order with either a
// process colour or a tint of a named spot ink. Later fills knock out
// earlier ones. A pixel is covered when its centre lies inside the fill.

use rasterwerk_core::error::{RasterError, Result};
use rasterwerk_core::plane::RasterPlane;
use rasterwerk_core::types::{ColorSpace, Rect};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::ink::Ink;
use crate::render::{Rasterizer, RenderRequest};

/// Paint applied by one fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Paint {
    /// Ink coverage per process channel, each in 0..=1.
    Process { components: Vec<f32> },
    /// Coverage of a spot ink defined in the page's `spots`.
    Spot { name: String, tint: f32 },
}

/// One opaque rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub rect: Rect,
    pub paint: Paint,
}

/// Page content for the [`FlatRasterizer`]. Lengths are in page units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatPage {
    pub width: f64,
    pub height: f64,
    /// Spot definitions, represented in the process space.
    #[serde(default)]
    pub spots: Vec<Ink>,
    #[serde(default)]
    pub fills: Vec<Fill>,
}

impl FlatPage {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            spots: Vec::new(),
            fills: Vec::new(),
        }
    }

    /// The whole page as a render region.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn with_spot(mut self, ink: Ink) -> Self {
        self.spots.push(ink);
        self
    }

    pub fn with_fill(mut self, rect: Rect, paint: Paint) -> Self {
        self.fills.push(Fill { rect, paint });
        self
    }

    fn spot_definition(&self, name: &str) -> Result<&Ink> {
        self.spots
            .iter()
            .find(|ink| ink.name() == name)
            .ok_or_else(|| RasterError::Rasterizer(format!("fill uses undefined spot \"{name}\"")))
    }
}

/// Per-plane coverage a fill writes, already resolved against a request.
enum Coverage {
    /// Leave everything as it is.
    Skip,
    /// Values for every plane, in plane order.
    Planes(Vec<f32>),
}

/// Rasterizer for [`FlatPage`] content.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatRasterizer;

impl FlatRasterizer {
    fn coverage(page: &FlatPage, paint: &Paint, request: &RenderRequest<'_>) -> Result<Coverage> {
        let process_count = request.process_space.num_components();
        let mut values = vec![0.0f32; request.plane_count()];
        match paint {
            Paint::Process { components } => {
                if components.len() != process_count {
                    return Err(RasterError::Rasterizer(format!(
                        "process fill has {} components, {} expects {process_count}",
                        components.len(),
                        request.process_space
                    )));
                }
                values[..process_count].copy_from_slice(components);
            }
            Paint::Spot { name, tint } => {
                if request.ignored.iter().any(|ignored| ignored == name) {
                    return Ok(Coverage::Skip);
                }
                if let Some(index) = request.spots.iter().position(|ink| ink.name() == name) {
                    values[process_count + index] = *tint;
                } else {
                    let ink = page.spot_definition(name)?;
                    for (value, component) in values.iter_mut().zip(ink.representation()) {
                        *value = tint * component;
                    }
                }
            }
        }
        Ok(Coverage::Planes(values))
    }
}

impl Rasterizer for FlatRasterizer {
    type Content = FlatPage;

    fn find_inks(&self, page: &FlatPage, process_space: &ColorSpace) -> Result<Vec<Ink>> {
        let mut inks: Vec<Ink> = Vec::new();
        for fill in &page.fills {
            let Paint::Spot { name, .. } = &fill.paint else {
                continue;
            };
            if inks.iter().any(|ink| ink.name() == name) {
                continue;
            }
            let ink = page.spot_definition(name)?;
            if ink.target_space() != process_space {
                return Err(RasterError::InvalidInk(format!(
                    "{name}: represented in {}, page renders in {process_space}",
                    ink.target_space()
                )));
            }
            inks.push(ink.clone());
        }
        debug!(spots = inks.len(), "Ink inventory collected");
        Ok(inks)
    }

    #[instrument(skip_all, fields(fills = page.fills.len(), width = request.pixel_width, height = request.pixel_height))]
    fn render(&self, page: &FlatPage, request: &RenderRequest<'_>) -> Result<Vec<RasterPlane>> {
        let coverages = page
            .fills
            .iter()
            .map(|fill| Self::coverage(page, &fill.paint, request))
            .collect::<Result<Vec<_>>>()?;

        let mut planes: Vec<RasterPlane> = (0..request.plane_count())
            .map(|_| RasterPlane::new(request.pixel_width, request.pixel_height, request.depth))
            .collect();
        let max = request.depth.max_value() as f32;
        let bounds = request.bounds;
        let scale_x = bounds.width / request.pixel_width as f64;
        let scale_y = bounds.height / request.pixel_height as f64;

        for (fill, coverage) in page.fills.iter().zip(&coverages) {
            let Coverage::Planes(values) = coverage else {
                continue;
            };
            let samples: Vec<u16> = values
                .iter()
                .map(|v| (v.clamp(0.0, 1.0) * max + 0.5) as u16)
                .collect();

            let (x0, x1) = pixel_span(fill.rect.x - bounds.x, fill.rect.width, scale_x, request.pixel_width);
            let (y0, y1) = pixel_span(fill.rect.y - bounds.y, fill.rect.height, scale_y, request.pixel_height);
            for y in y0..y1 {
                let cy = bounds.y + (y as f64 + 0.5) * scale_y;
                for x in x0..x1 {
                    let cx = bounds.x + (x as f64 + 0.5) * scale_x;
                    if !fill.rect.contains_point(cx, cy) {
                        continue;
                    }
                    for (plane, sample) in planes.iter_mut().zip(&samples) {
                        plane.set_sample(x, y, *sample);
                    }
                }
            }
        }
        Ok(planes)
    }
}

/// Candidate pixel range `[first, last)` along one axis for a span starting
/// `start` page units into the region.
fn pixel_span(start: f64, length: f64, scale: f64, pixels: u32) -> (u32, u32) {
    let first = (start / scale).floor().max(0.0);
    let last = ((start + length) / scale).ceil().max(0.0);
    (
        (first as u32).min(pixels),
        (last as u32).min(pixels),
    )
}
