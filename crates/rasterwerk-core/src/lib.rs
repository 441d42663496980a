// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rasterwerk: Core raster types, frame traits, and error definitions shared
// across all crates.

pub mod config;
pub mod error;
pub mod frame;
pub mod human_errors;
pub mod plane;
pub mod types;

pub use config::EngineConfig;
pub use error::RasterError;
pub use frame::{BufferFrame, ImageFrame};
pub use plane::RasterPlane;
pub use types::*;
