// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for spot compositing and raster assembly.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use rasterwerk_core::plane::RasterPlane;
use rasterwerk_core::types::{ColorSpace, SampleDepth};
use rasterwerk_separation::{assemble_interleaved, composite_separations};

const WIDTH: u32 = 1240;
const HEIGHT: u32 = 1754;

fn gradient(seed: u32) -> RasterPlane {
    let mut plane = RasterPlane::new(WIDTH, HEIGHT, SampleDepth::Bits8);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            plane.set_sample(x, y, ((x + y + seed * 37) % 256) as u16);
        }
    }
    plane
}

/// Merge three spot planes onto an A4 page of CMYK at 150 dpi.
fn bench_composite(c: &mut Criterion) {
    let process: Vec<RasterPlane> = (0..4).map(gradient).collect();
    let spots: Vec<RasterPlane> = (4..7).map(gradient).collect();
    let reps = vec![
        vec![0.0, 0.9, 0.8, 0.0],
        vec![1.0, 0.5, 0.0, 0.1],
        vec![0.2, 0.2, 0.2, 0.6],
    ];

    c.bench_function("composite 3 spots onto CMYK 1240x1754", |b| {
        b.iter(|| {
            let merged = composite_separations(black_box(process.clone()), &spots, &reps).unwrap();
            black_box(merged);
        });
    });
}

/// Interleave four CMYK planes into one raster.
fn bench_assemble(c: &mut Criterion) {
    let planes: Vec<RasterPlane> = (0..4).map(gradient).collect();

    c.bench_function("assemble CMYK 1240x1754", |b| {
        b.iter(|| {
            let raster =
                assemble_interleaved(black_box(&planes), ColorSpace::DeviceCmyk, 150.0, 150.0).unwrap();
            black_box(raster);
        });
    });
}

criterion_group!(benches, bench_composite, bench_assemble);
criterion_main!(benches);
