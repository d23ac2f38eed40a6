mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use synth_scatter::sampling::{BlueNoiseSampling, DartThrowingSampling, PoissonDiskSampling};

const RADII: [f32; 5] = [2.0, 1.0, 0.5, 0.25, 0.125];

fn bench_strategy(c: &mut Criterion, name: &str, strategy: &dyn BlueNoiseSampling) {
    let extent = Vec2::new(32.0, 32.0);
    let mut group = c.benchmark_group(format!("sampling/{name}"));

    for &radius in &RADII {
        let expected = strategy
            .generate(extent.into(), radius, &mut common::rng_for(-radius))
            .len();
        group.throughput(common::points_throughput(expected));

        let mut rng = common::rng_for(radius);
        group.bench_with_input(BenchmarkId::from_parameter(radius), &radius, |b, &r| {
            b.iter(|| {
                let pts = strategy.generate(extent.into(), r, &mut rng);
                black_box(pts.len());
            });
        });
    }

    group.finish();
}

fn sampling_poisson_benches(c: &mut Criterion) {
    bench_strategy(c, "poisson_disk", &PoissonDiskSampling::default());
}

fn sampling_dart_benches(c: &mut Criterion) {
    bench_strategy(c, "dart_throwing", &DartThrowingSampling::default());
}

criterion_group! {
    name = benches;
    config = common::bench_criterion();
    targets = sampling_poisson_benches, sampling_dart_benches
}
criterion_main!(benches);
