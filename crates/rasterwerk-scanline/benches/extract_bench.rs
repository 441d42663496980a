// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the scanline pipeline: sub-image extraction over
// both scratch backings, and 1-bit normalisation.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use rasterwerk_core::config::{EngineConfig, ScratchBacking};
use rasterwerk_core::frame::BufferFrame;
use rasterwerk_core::types::{ColorSpace, FrameInfo, Region};
use rasterwerk_scanline::extract_sub_image;

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Extract a 400x250 region from a 2000x1500 RGB image.
fn bench_extract(c: &mut Criterion) {
    let info = FrameInfo::new(ColorSpace::DeviceRgb, 2000, 1500, 8, 96.0, 96.0);
    let data: Vec<u8> = (0..2000 * 1500 * 3).map(|v| (v % 253) as u8).collect();
    let region = Region::new(230, 230, 400, 250);

    for backing in [ScratchBacking::File, ScratchBacking::Memory] {
        let config = EngineConfig {
            scratch_backing: backing,
            ..EngineConfig::default()
        };
        c.bench_function(&format!("extract 400x250 of 2000x1500 ({backing:?})"), |b| {
            b.iter(|| {
                let source = BufferFrame::new(info.clone(), black_box(data.clone())).unwrap();
                let image = extract_sub_image(&config, source, region).unwrap();
                black_box(image);
            });
        });
    }
}

/// Extract the whole of a 1-bit 2400x2400 bitmap, exercising the bit scaler.
fn bench_one_bit_normalise(c: &mut Criterion) {
    let info = FrameInfo::new(ColorSpace::DeviceGray, 2400, 2400, 1, 300.0, 300.0);
    let data = vec![0b1100_1010u8; info.row_stride() * 2400];
    let config = EngineConfig::default();

    c.bench_function("normalise 1-bit 2400x2400", |b| {
        b.iter(|| {
            let source = BufferFrame::new(info.clone(), black_box(data.clone())).unwrap();
            let image = extract_sub_image(&config, source, Region::full(2400, 2400)).unwrap();
            black_box(image);
        });
    });
}

criterion_group!(benches, bench_extract, bench_one_bit_normalise);
criterion_main!(benches);
