// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Packed sample access. Samples of 1..=32 bits are stored most-significant
// bit first with no padding between samples.

/// Read sample `index` of `bits` width from a packed row.
pub fn read_packed(row: &[u8], index: usize, bits: u8) -> u32 {
    let bits = bits as usize;
    let mut bit = index * bits;
    let mut remaining = bits;
    let mut value = 0u32;
    while remaining > 0 {
        let offset = bit % 8;
        let available = 8 - offset;
        let take = available.min(remaining);
        let shift = available - take;
        let mask = ((1u16 << take) - 1) as u8;
        let chunk = (row[bit / 8] >> shift) & mask;
        value = (value << take) | chunk as u32;
        remaining -= take;
        bit += take;
    }
    value
}

/// Write sample `index` of `bits` width into a packed row. Bits outside the
/// sample are preserved.
pub fn write_packed(row: &mut [u8], index: usize, bits: u8, value: u32) {
    let bits = bits as usize;
    let mut bit = index * bits;
    let mut remaining = bits;
    while remaining > 0 {
        let offset = bit % 8;
        let available = 8 - offset;
        let take = available.min(remaining);
        let shift = available - take;
        let mask = (((1u16 << take) - 1) as u8) << shift;
        let chunk = ((value >> (remaining - take)) as u8) << shift;
        let byte = &mut row[bit / 8];
        *byte = (*byte & !mask) | (chunk & mask);
        remaining -= take;
        bit += take;
    }
}

/// Largest value representable in `bits` bits.
pub fn max_value(bits: u8) -> u64 {
    (1u64 << bits) - 1
}

/// Rescale `value` from `from` bits to `to` bits, rounding to nearest.
///
/// Full scale maps to full scale, so a 1-bit sample becomes 0 or 255 at 8
/// bits.
pub fn scale_sample(value: u32, from: u8, to: u8) -> u32 {
    if from == to {
        return value;
    }
    let from_max = max_value(from);
    let to_max = max_value(to);
    ((value as u64 * to_max + from_max / 2) / from_max) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_bit_samples_msb_first() {
        let row = [0b1010_0000u8, 0b1000_0000];
        let samples: Vec<u32> = (0..9).map(|i| read_packed(&row, i, 1)).collect();
        assert_eq!(samples, [1, 0, 1, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn four_and_twelve_bit_samples() {
        let row = [0xAB, 0xCD, 0xEF];
        assert_eq!(read_packed(&row, 0, 4), 0xA);
        assert_eq!(read_packed(&row, 3, 4), 0xD);
        assert_eq!(read_packed(&row, 0, 12), 0xABC);
        assert_eq!(read_packed(&row, 1, 12), 0xDEF);
    }

    #[test]
    fn write_preserves_neighbours() {
        let mut row = [0xFFu8; 2];
        write_packed(&mut row, 1, 4, 0x3);
        assert_eq!(row, [0xF3, 0xFF]);
        write_packed(&mut row, 0, 12, 0x000);
        assert_eq!(row, [0x00, 0x0F]);
        write_packed(&mut row, 0, 16, 0xBEEF);
        assert_eq!(row, [0xBE, 0xEF]);
    }

    #[test]
    fn scaling_hits_full_scale() {
        assert_eq!(scale_sample(1, 1, 8), 255);
        assert_eq!(scale_sample(0, 1, 8), 0);
        assert_eq!(scale_sample(0xF, 4, 8), 255);
        assert_eq!(scale_sample(0x8, 4, 8), 136);
        assert_eq!(scale_sample(4095, 12, 16), 65535);
        assert_eq!(scale_sample(u32::MAX, 32, 16), 65535);
        assert_eq!(scale_sample(255, 8, 16), 65535);
    }
}
