// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plane fingerprints: SHA-256 over sample bytes, used to show that the two
// separation output modes produce identical planes.

use rasterwerk_core::plane::RasterPlane;
use rasterwerk_core::types::SampleDepth;
use rasterwerk_separation::FrameBufferInfo;
use sha2::{Digest, Sha256};

/// Fingerprint of a plane's samples in row order, ignoring row padding.
pub fn plane_fingerprint(plane: &RasterPlane) -> String {
    let mut hasher = Sha256::new();
    for y in 0..plane.height() {
        hasher.update(plane.row(y));
    }
    hex::encode(hasher.finalize())
}

/// Fingerprint of one ink's samples inside a shared frame buffer.
///
/// Samples are gathered in row order, so the result equals
/// [`plane_fingerprint`] of the plane that was scattered into `buffer`.
pub fn frame_buffer_fingerprint(
    buffer: &[u8],
    layout: &FrameBufferInfo,
    width: u32,
    height: u32,
    depth: SampleDepth,
) -> String {
    let sample = depth.bytes();
    let pixel_stride = if layout.pixel_stride == 0 { sample } else { layout.pixel_stride };
    let mut hasher = Sha256::new();
    for y in 0..height as usize {
        let row_start = layout.offset + y * layout.row_stride;
        for x in 0..width as usize {
            let at = row_start + x * pixel_stride;
            hasher.update(&buffer[at..at + sample]);
        }
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_bytes(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hex::encode(hasher.finalize())
    }

    #[test]
    fn plane_fingerprint_known_value() {
        // SHA-256("hello"), verified against coreutils sha256sum.
        let expected = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";
        let plane = RasterPlane::from_raw(5, 1, SampleDepth::Bits8, 5, b"hello".to_vec()).unwrap();
        assert_eq!(plane_fingerprint(&plane), expected);
    }

    #[test]
    fn padding_does_not_change_plane_fingerprint() {
        let mut tight = RasterPlane::new(2, 2, SampleDepth::Bits8);
        let mut padded = RasterPlane::with_stride(2, 2, SampleDepth::Bits8, 6).unwrap();
        for (x, y, v) in [(0, 0, 1), (1, 0, 2), (0, 1, 3), (1, 1, 4)] {
            tight.set_sample(x, y, v);
            padded.set_sample(x, y, v);
        }
        assert_eq!(plane_fingerprint(&tight), plane_fingerprint(&padded));
        assert_eq!(plane_fingerprint(&tight), hash_bytes(&[1, 2, 3, 4]));
    }

    #[test]
    fn interleaved_buffer_matches_plane() {
        // Two channels interleaved: A = [1, 2], B = [9, 8].
        let buffer = [1u8, 9, 2, 8];
        let layout = FrameBufferInfo::interleaved(1, 2, 2, SampleDepth::Bits8);
        let got = frame_buffer_fingerprint(&buffer, &layout, 2, 1, SampleDepth::Bits8);
        assert_eq!(got, hash_bytes(&[9, 8]));
    }
}
