// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error reports for command-line front ends.
//
// Every error maps to a plain message, a suggestion, and a process exit code
// derived from its taxonomy kind.

use crate::error::{ErrorKind, RasterError};
use crate::types::Region;

/// Exit code for a rejected (out-of-bounds) sub-image region.
pub const EXIT_BOUNDS: i32 = 2;
/// Exit code for unsupported formats, unknown inks and layout errors.
pub const EXIT_UNSUPPORTED: i32 = 3;
/// Exit code for I/O, scratch and collaborator failures.
pub const EXIT_RESOURCE: i32 = 4;

/// A human-readable error with a suggestion and exit status.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Short summary (first line of output).
    pub message: String,
    /// What to try next.
    pub suggestion: String,
    /// Process exit status.
    pub exit_code: i32,
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n  hint: {}", self.message, self.suggestion)
    }
}

/// Convert a `RasterError` into a report for the terminal.
pub fn humanize_error(err: &RasterError) -> HumanError {
    let exit_code = match err.kind() {
        ErrorKind::UnsupportedFormat => EXIT_UNSUPPORTED,
        ErrorKind::Resource => EXIT_RESOURCE,
    };

    let (message, suggestion) = match err {
        RasterError::UnsupportedFormat(detail) => (
            format!("Unsupported image format: {detail}."),
            "Convert the image to 8 or 16 bits per sample in Gray, RGB or CMYK.".to_owned(),
        ),
        RasterError::DimensionMismatch { .. } => (
            format!("Separation planes do not line up ({err})."),
            "Render every ink of a page at the same resolution and bounds.".to_owned(),
        ),
        RasterError::UnknownInk(name) => (
            format!("The page does not use an ink named \"{name}\"."),
            "Run `rasterwerk separate --list-inks` to see the inks on the page.".to_owned(),
        ),
        RasterError::InvalidInk(detail) => (
            format!("An ink definition is invalid: {detail}."),
            "Give every spot ink one component per process channel, each in 0..=1.".to_owned(),
        ),
        RasterError::BufferTooSmall { required, actual } => (
            format!("Output buffer too small: {actual} bytes for {required} needed."),
            "Check the frame buffer offset, row stride and pixel stride.".to_owned(),
        ),
        RasterError::IncompleteImage { expected, written } => (
            format!("Image writer stopped after {written} of {expected} rows."),
            "The source ended early; the output was discarded.".to_owned(),
        ),
        RasterError::Rasterizer(detail) => (
            format!("Rendering failed: {detail}."),
            "Check that the page description is valid.".to_owned(),
        ),
        RasterError::Codec(detail) => (
            format!("Image could not be encoded or decoded: {detail}."),
            "Use PNG, TIFF or JPEG files.".to_owned(),
        ),
        RasterError::Scratch(detail) => (
            format!("Temporary storage failed: {detail}."),
            "Free some disk space or set `scratch_backing` to \"memory\".".to_owned(),
        ),
        RasterError::SourceExhausted { rows_read, height } => (
            format!("Source image ended after {rows_read} of {height} rows."),
            "The input file is truncated.".to_owned(),
        ),
        RasterError::Io(io) => (
            format!("File error: {io}."),
            "Check the path and permissions.".to_owned(),
        ),
        RasterError::Serialization(json) => (
            format!("Could not read JSON: {json}."),
            "Validate the page or configuration file.".to_owned(),
        ),
    };

    HumanError {
        message,
        suggestion,
        exit_code,
    }
}

/// Report for an extraction whose region falls outside the source image.
pub fn bounds_violation(region: &Region, width: u32, height: u32) -> HumanError {
    HumanError {
        message: format!("Region {region} lies outside the {width}x{height} source image."),
        suggestion: "Choose x + width <= image width and y + height <= image height.".to_owned(),
        exit_code: EXIT_BOUNDS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ink_is_unsupported() {
        let report = humanize_error(&RasterError::UnknownInk("Reflex Blue".into()));
        assert_eq!(report.exit_code, EXIT_UNSUPPORTED);
        assert!(report.message.contains("Reflex Blue"));
    }

    #[test]
    fn scratch_failure_is_resource() {
        let report = humanize_error(&RasterError::Scratch("disk full".into()));
        assert_eq!(report.exit_code, EXIT_RESOURCE);
    }

    #[test]
    fn bounds_report_names_region() {
        let report = bounds_violation(&Region::new(10, 0, 5, 5), 12, 12);
        assert_eq!(report.exit_code, EXIT_BOUNDS);
        assert!(report.message.contains("5x5+10+0"));
    }
}
