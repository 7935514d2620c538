//! Benchmark for adaptive voxel rasterization
//!
//! Measures full depth passes over a synthetic ground plane, through an
//! overhead light camera and an oblique pinhole sensor.

use criterion::{criterion_group, criterion_main, Criterion};
use cube::Aabb;
use glam::Vec3;
use renderer::{depth_pass, KrtCamera, LightRig, Pass, RasterLimits, ShadowMaskBuilder};
use std::hint::black_box;

/// Benchmark configuration
struct BenchConfig {
    side: usize,
    half_extent: f32,
    map_size: u32,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            side: 128,
            half_extent: 0.5,
            map_size: 512,
        }
    }
}

/// Gently rolling ground plane, one sample per unit
fn create_plane(side: usize) -> Vec<Vec3> {
    (0..side)
        .flat_map(|y| {
            (0..side).map(move |x| {
                let (fx, fy) = (x as f32, y as f32);
                Vec3::new(fx, fy, (fx * 0.1).sin() * 2.0 + (fy * 0.07).cos())
            })
        })
        .collect()
}

fn create_sensor(side: usize) -> KrtCamera {
    let c = side as f32 * 0.5;
    // Looking down from above the plane center
    let text = format!(
        "400 0 320  0 400 240  0 0 1   1 0 0  0 -1 0  0 0 -1   {} {} {}   640 480",
        -c,
        c,
        side as f32 * 1.5
    );
    text.parse().unwrap_or_else(|e| panic!("invalid bench camera: {e}"))
}

fn bench_light_depth(c: &mut Criterion) {
    let config = BenchConfig::default();
    let points = create_plane(config.side);
    let bounds = Aabb::from_points(points.iter().copied()).unwrap();
    let light = LightRig::new(183.29, 62.16, config.map_size)
        .camera(&bounds.expanded(config.half_extent));

    c.bench_function("light_depth_pass", |b| {
        b.iter(|| {
            let buffer = depth_pass(
                &light,
                black_box(&points),
                config.half_extent,
                RasterLimits::default(),
                &mut (),
                Pass::LightDepth,
            );
            black_box(buffer)
        })
    });
}

fn bench_shadow_mask(c: &mut Criterion) {
    let config = BenchConfig::default();
    let points = create_plane(config.side);
    let bounds = Aabb::from_points(points.iter().copied()).unwrap();
    let light = LightRig::new(183.29, 62.16, config.map_size)
        .camera(&bounds.expanded(config.half_extent));
    let sensor = create_sensor(config.side);

    let mut group = c.benchmark_group("shadow_mask");
    group.sample_size(10);
    group.bench_function("full_pipeline", |b| {
        b.iter(|| {
            let output =
                ShadowMaskBuilder::new(&light, &sensor).build(black_box(&points), &mut ());
            black_box(output.shadowed())
        })
    });
    group.finish();
}

criterion_group!(benches, bench_light_depth, bench_shadow_mask);
criterion_main!(benches);
