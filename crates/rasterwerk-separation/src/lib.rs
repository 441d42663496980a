// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// rasterwerk-separation: Separations for the Rasterwerk imaging core.
//
// Renders page content into one grayscale plane per ink, merges spot inks
// onto process planes with a subtractive blend, and assembles the result
// into interleaved or planar buffers ready for an encoder.

pub mod assemble;
pub mod composite;
pub mod flat;
pub mod ink;
pub mod render;

pub use assemble::{AssembledRaster, assemble_interleaved, assemble_planar, preview_chain, stream_interleaved};
pub use composite::{composite_separations, merge_spots};
pub use flat::{FlatPage, FlatRasterizer};
pub use ink::{Ink, InkSelection, SeparationSet};
pub use render::{FrameBufferInfo, Rasterizer, RenderRequest, SeparationOutput, SeparationRenderer};
