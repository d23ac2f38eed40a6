mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use glam::Vec3;
use synth_scatter::prelude::*;

fn controller(settings: ScatterSettings) -> IterationController<PrefabArena> {
    let library = PrefabLibrary::new()
        .with_prefab(SceneNode::mesh("cube", Vec3::ZERO, Vec3::splat(0.5)))
        .with_prefab(
            SceneNode::new("table")
                .with_child(SceneNode::mesh("top", Vec3::Y, Vec3::new(1.0, 0.05, 0.6)))
                .with_child(SceneNode::mesh("leg", Vec3::ZERO, Vec3::new(0.05, 0.5, 0.05))),
        );
    let selectors = LayerSelectors::uniform(&library);
    match IterationController::try_new(settings, PrefabArena::new(library), selectors) {
        Ok(ctrl) => ctrl,
        Err(e) => panic!("bench settings are valid: {e}"),
    }
}

fn iteration_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("iteration");

    let mut ctrl = controller(ScatterSettings::new(common::BENCH_SEED));
    group.bench_function("default", |b| {
        b.iter(|| {
            let placed = ctrl
                .run_iteration(&mut (), |report, _| report.placements.len())
                .unwrap_or(0);
            black_box(placed);
        });
    });

    let dense = ScatterSettings::new(common::BENCH_SEED).with_foreground(
        ForegroundSettings::default()
            .with_object_size(UniformRange::constant(0.2))
            .with_max_object_count(200),
    );
    let mut ctrl = controller(dense);
    group.bench_function("dense_foreground", |b| {
        b.iter(|| {
            let placed = ctrl
                .run_iteration(&mut (), |report, _| report.placements.len())
                .unwrap_or(0);
            black_box(placed);
        });
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::bench_criterion();
    targets = iteration_benches
}
criterion_main!(benches);
