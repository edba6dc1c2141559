//! Benchmarks for tet mesh loading, extraction and traversal.

use std::fmt::Write;

use criterion::{criterion_group, criterion_main, Criterion};
use tetkit::io::tet::{parse, LoadOptions};
use tetkit::prelude::*;

/// Axis orders of the six Kuhn tets of a unit cube.
const KUHN: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

/// `.t` text for an `n x n x n` cube grid, six tets per cell.
fn create_grid_text(n: usize) -> String {
    let side = n + 1;
    let id = |i: usize, j: usize, k: usize| 1 + i + side * (j + side * k);
    let mut text = String::new();

    for k in 0..side {
        for j in 0..side {
            for i in 0..side {
                writeln!(text, "Vertex {} {} {} {}", id(i, j, k), i, j, k).unwrap();
            }
        }
    }

    for k in 0..n {
        for j in 0..n {
            for i in 0..n {
                for axes in &KUHN {
                    let mut corner = [i, j, k];
                    let mut tet = [id(i, j, k), 0, 0, 0];
                    for (slot, &axis) in axes.iter().enumerate() {
                        corner[axis] += 1;
                        tet[slot + 1] = id(corner[0], corner[1], corner[2]);
                    }
                    writeln!(text, "Tet 4 {} {} {} {}", tet[0], tet[1], tet[2], tet[3]).unwrap();
                }
            }
        }
    }
    text
}

fn bench_loading(c: &mut Criterion) {
    let text = create_grid_text(10);
    let options = LoadOptions::default();

    c.bench_function("parse_grid_10", |b| {
        b.iter(|| parse(&text, &options).unwrap())
    });

    let unchecked = options.clone().with_check_orientation(false);
    c.bench_function("parse_grid_10_unchecked", |b| {
        b.iter(|| parse(&text, &unchecked).unwrap())
    });
}

fn bench_extraction(c: &mut Criterion) {
    let tets = parse(&create_grid_text(10), &LoadOptions::default()).unwrap();

    c.bench_function("extract_grid_10", |b| {
        b.iter(|| SurfaceMesh::from_tet_mesh(&tets).unwrap())
    });

    c.bench_function("validate_grid_10", |b| b.iter(|| tets.validate().unwrap()));
}

fn bench_traversal(c: &mut Criterion) {
    let tets = parse(&create_grid_text(10), &LoadOptions::default()).unwrap();
    let surface = SurfaceMesh::from_tet_mesh(&tets).unwrap();

    c.bench_function("vertex_ccw_vertices", |b| {
        b.iter(|| {
            let mut count = 0;
            for v in surface.vertex_ids() {
                count += surface.vertex_ccw_vertices(v).count();
            }
            count
        })
    });

    c.bench_function("face_vertices", |b| {
        b.iter(|| {
            let mut count = 0;
            for f in surface.face_ids() {
                count += surface.face_vertices(f).count();
            }
            count
        })
    });
}

criterion_group!(benches, bench_loading, bench_extraction, bench_traversal);
criterion_main!(benches);
