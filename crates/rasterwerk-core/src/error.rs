// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Rasterwerk.

use thiserror::Error;

/// Top-level error type for all Rasterwerk operations.
///
/// A sub-image region that falls outside its source is *not* represented
/// here: extraction reports it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum RasterError {
    // -- Format errors --
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("plane dimensions mismatch: expected {expected_width}x{expected_height}, got {actual_width}x{actual_height}")]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("ink not present in page inventory: {0}")]
    UnknownInk(String),

    #[error("invalid ink definition: {0}")]
    InvalidInk(String),

    #[error("frame buffer too small: need {required} bytes, got {actual}")]
    BufferTooSmall { required: usize, actual: usize },

    #[error("image incomplete: expected {expected} rows, {written} written")]
    IncompleteImage { expected: u32, written: u32 },

    // -- Collaborator errors --
    #[error("rasterizer failed: {0}")]
    Rasterizer(String),

    #[error("image codec failed: {0}")]
    Codec(String),

    // -- Resource / I/O --
    #[error("scratch store failed: {0}")]
    Scratch(String),

    #[error("scanline source exhausted after {rows_read} of {height} rows")]
    SourceExhausted { rows_read: u32, height: u32 },

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse error taxonomy used for reporting and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bit depth, plane geometry, ink inventory, or buffer layout cannot be
    /// reconciled. Raised before any partial work is performed.
    UnsupportedFormat,
    /// Scratch stream, source stream, or collaborator failure. Fatal for the
    /// current operation.
    Resource,
}

impl RasterError {
    /// Classify the error into the reporting taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFormat(_)
            | Self::DimensionMismatch { .. }
            | Self::UnknownInk(_)
            | Self::InvalidInk(_)
            | Self::BufferTooSmall { .. } => ErrorKind::UnsupportedFormat,

            Self::IncompleteImage { .. }
            | Self::Rasterizer(_)
            | Self::Codec(_)
            | Self::Scratch(_)
            | Self::SourceExhausted { .. }
            | Self::Io(_)
            | Self::Serialization(_) => ErrorKind::Resource,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RasterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_errors_classified_as_unsupported() {
        let err = RasterError::DimensionMismatch {
            expected_width: 4,
            expected_height: 4,
            actual_width: 4,
            actual_height: 5,
        };
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert_eq!(
            RasterError::UnknownInk("Pantone 485 C".into()).kind(),
            ErrorKind::UnsupportedFormat
        );
    }

    #[test]
    fn io_errors_classified_as_resource() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        let err: RasterError = io.into();
        assert_eq!(err.kind(), ErrorKind::Resource);
    }

    #[test]
    fn dimension_mismatch_message() {
        let err = RasterError::DimensionMismatch {
            expected_width: 10,
            expected_height: 20,
            actual_width: 10,
            actual_height: 21,
        };
        assert_eq!(
            err.to_string(),
            "plane dimensions mismatch: expected 10x20, got 10x21"
        );
    }
}
