// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// rasterwerk-scanline: Scanline codec pipeline for Rasterwerk.
//
// Provides packed-sample helpers, a chain of lazy image transforms (bit
// scaling, inversion, device colour conversion), compressed temporary
// stores, a scanline writer that produces read-once raw images, and
// single-pass sub-image extraction over forward-only sources.

pub mod bits;
pub mod extract;
pub mod raw_image;
pub mod temp_store;
pub mod transform;

pub use extract::{extract_sub_image, normalize_depth};
pub use raw_image::{FrameWriter, RawImage, RawImageFrame};
pub use temp_store::{TempReader, TempWriter, create_temporary};
pub use transform::{BitScaler, ColorConverter, ImageTransform, Inverter, TransformChain};
