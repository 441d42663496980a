// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ink compositor: merges spot-ink planes onto process-ink planes.
//
// Each ink is modelled as a filter layer that absorbs a fraction of the
// light reaching it. For process channel `c`, spot `i` with coverage `s`
// and representation `r` passes `1 - r[c] * s` of the light; layers
// multiply, so the merge order does not matter:
//
//     result = 1 - (1 - r[c] * s) * (1 - result)
//
// Values are normalised to 0..=1 by the plane's maximum sample, and written
// back as `trunc(result * max + 0.5)`.

use rasterwerk_core::error::{RasterError, Result};
use rasterwerk_core::plane::{RasterPlane, read_sample, write_sample};
use tracing::{debug, info, instrument};

use crate::render::SeparationOutput;

/// Merge `spots` onto `process`, returning the process planes with the
/// spot contribution blended in.
///
/// `representations[i][c]` is the amount of process channel `c` in spot
/// `i`. Every plane must share the process planes' size and depth, and
/// every representation value must lie in 0..=1. With no spots the process
/// planes are returned unchanged.
#[instrument(skip_all, fields(process = process.len(), spots = spots.len()))]
pub fn composite_separations(
    mut process: Vec<RasterPlane>,
    spots: &[RasterPlane],
    representations: &[Vec<f32>],
) -> Result<Vec<RasterPlane>> {
    validate(&process, spots, representations)?;
    if spots.is_empty() {
        debug!("No spot planes; process planes pass through");
        return Ok(process);
    }

    let depth = process[0].depth();
    let max = depth.max_value() as f32;
    let inv_max = 1.0 / max;
    let width = process[0].width() as usize;

    for y in 0..process[0].height() {
        let spot_rows: Vec<&[u8]> = spots.iter().map(|plane| plane.row(y)).collect();
        for (channel, plane) in process.iter_mut().enumerate() {
            let row = plane.row_mut(y);
            for x in 0..width {
                let mut result = read_sample(row, x, depth) as f32 * inv_max;
                for (spot_row, representation) in spot_rows.iter().zip(representations) {
                    let spot = read_sample(spot_row, x, depth) as f32 * inv_max;
                    result = 1.0 - (1.0 - representation[channel] * spot) * (1.0 - result);
                }
                write_sample(row, x, depth, (result * max + 0.5) as u16);
            }
        }
    }

    info!(
        width,
        height = process[0].height(),
        "Spot planes merged"
    );
    Ok(process)
}

/// Merge the spot planes of a rendered separation set onto its process
/// planes.
pub fn merge_spots(output: SeparationOutput) -> Result<Vec<RasterPlane>> {
    let SeparationOutput { set, mut planes } = output;
    if planes.len() != set.len() {
        return Err(RasterError::UnsupportedFormat(format!(
            "{} planes for {} inks",
            planes.len(),
            set.len()
        )));
    }
    let spots = planes.split_off(set.process_count());
    composite_separations(planes, &spots, &set.spot_representations())
}

fn validate(process: &[RasterPlane], spots: &[RasterPlane], representations: &[Vec<f32>]) -> Result<()> {
    let Some(first) = process.first() else {
        return Err(RasterError::UnsupportedFormat("no process planes".into()));
    };
    if spots.len() != representations.len() {
        return Err(RasterError::InvalidInk(format!(
            "{} spot planes but {} representations",
            spots.len(),
            representations.len()
        )));
    }
    for plane in process.iter().chain(spots) {
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
    for (index, representation) in representations.iter().enumerate() {
        if representation.len() != process.len() {
            return Err(RasterError::InvalidInk(format!(
                "spot {index}: {} components for {} process planes",
                representation.len(),
                process.len()
            )));
        }
        if representation.iter().any(|v| !(0.0..=1.0).contains(v)) {
            return Err(RasterError::InvalidInk(format!(
                "spot {index}: representation outside 0..=1"
            )));
        }
    }
    Ok(())
}
