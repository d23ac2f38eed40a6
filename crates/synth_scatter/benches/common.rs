#![allow(dead_code)]

use std::time::Duration;

use criterion::{Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Master seed shared by every bench so runs compare like with like.
pub const BENCH_SEED: u64 = 0x5CA7_7E12;

/// Short runs: sampling and iteration benches allocate per call and settle quickly.
pub fn bench_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(30)
        .warm_up_time(Duration::from_millis(500))
        .measurement_time(Duration::from_secs(3))
}

/// Independent generator per bench input, derived from [`BENCH_SEED`].
pub fn rng_for(input: f32) -> StdRng {
    StdRng::seed_from_u64(BENCH_SEED ^ (input.to_bits() as u64).rotate_left(32))
}

/// Throughput in produced points or placements; never zero so criterion keeps the group.
pub fn points_throughput(points: usize) -> Throughput {
    Throughput::Elements(points.max(1) as u64)
}
