//! Benchmarks for sv360 operations.
//!
//! Run with: `cargo bench -p sv360-bench`

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use sv360_core::{ChromaFormat, Picture, Sample};
use sv360_geometry::{Geometry, InterpKind, InterpolationConfig, ProjectionDescriptor, ProjectionKind};
use sv360_math::{RotationDirection, SphereRotation};

fn interp() -> InterpolationConfig {
    InterpolationConfig::new(InterpKind::Bilinear, InterpKind::Lanczos2)
}

fn erp(width: usize) -> Geometry {
    let desc = ProjectionDescriptor::new(ProjectionKind::Equirectangular, width, width / 2);
    let mut geo = Geometry::new(desc, interp()).unwrap();
    for comp in 0..geo.num_components() {
        let plane = geo.faces_mut().plane_mut(0, comp);
        for y in 0..plane.height() {
            for (x, v) in plane.row_mut(y).iter_mut().enumerate() {
                *v = ((x * 3 + y * 5) % 256) as Sample;
            }
        }
    }
    geo
}

fn target(kind: ProjectionKind, face: usize) -> Geometry {
    Geometry::new(ProjectionDescriptor::new(kind, face, face), interp()).unwrap()
}

/// Building the resampling map of a destination geometry.
fn bench_mapping(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapping");
    group.sample_size(10);
    let src = erp(1024);

    for kind in [ProjectionKind::Cubemap, ProjectionKind::EquiangularCubemap, ProjectionKind::Octahedron] {
        group.bench_with_input(BenchmarkId::new("build", kind), &kind, |b, &kind| {
            b.iter_batched(
                || target(kind, 256),
                |mut dst| {
                    dst.build_mapping(&src, RotationDirection::Forward).unwrap();
                    dst
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

/// Resampling through a cached map.
fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");

    for face in [128usize, 256] {
        let mut src = erp(face * 4);
        let desc = ProjectionDescriptor::new(ProjectionKind::Cubemap, face, face)
            .with_rotation(SphereRotation::from_degrees(30.0, 10.0, 0.0));
        let mut dst = Geometry::new(desc, interp()).unwrap();
        src.geo_convert(&mut dst).unwrap();

        group.throughput(Throughput::Elements((6 * face * face) as u64));
        group.bench_function(BenchmarkId::new("erp_to_cmp", face), |b| {
            b.iter(|| src.geo_convert(black_box(&mut dst)).unwrap())
        });
    }

    group.finish();
}

/// Sphere padding of face margins.
fn bench_padding(c: &mut Criterion) {
    let mut group = c.benchmark_group("padding");

    for kind in [ProjectionKind::Cubemap, ProjectionKind::Icosahedron] {
        let mut geo = target(kind, 128);
        geo.sphere_padding(false);
        group.bench_with_input(BenchmarkId::new("forced", kind), &kind, |b, _| {
            b.iter(|| geo.sphere_padding(black_box(true)))
        });
    }

    group.finish();
}

/// Unpacking and packing a 4:2:0 frame.
fn bench_frame_pack(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_pack");
    let mut geo = target(ProjectionKind::Cubemap, 256);
    let (w, h) = geo.descriptor().packed_size();
    let mut pic = Picture::new(w, h, ChromaFormat::Yuv420, 8).unwrap();
    pic.fill_mid_gray();

    group.throughput(Throughput::Elements((w * h) as u64));
    group.bench_function("unpack", |b| b.iter(|| geo.convert_yuv(black_box(&pic)).unwrap()));
    group.bench_function("pack", |b| b.iter(|| geo.frame_pack(black_box(&mut pic)).unwrap()));

    group.finish();
}

criterion_group!(benches, bench_mapping, bench_convert, bench_padding, bench_frame_pack);

criterion_main!(benches);
