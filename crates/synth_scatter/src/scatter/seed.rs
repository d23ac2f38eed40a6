//! Deterministic seed derivation for iterations and layers.
//!
//! Every sampling call gets its own seed, derived from the master seed, the iteration
//! index, and the pass index, so any single iteration can be replayed in isolation.

/// Seed for pass `pass` of iteration `iteration`.
pub fn seed_for_pass(base_seed: u64, iteration: u64, pass: u32) -> u64 {
    let mixed = base_seed
        ^ iteration.wrapping_mul(0x9E3779B97F4A7C15)
        ^ (pass as u64 + 1).wrapping_mul(0xBF58476D1CE4E5B9);
    mix_u64(mixed)
}

/// Splits an independent stream off `seed`, e.g. for prefab selection next to point sampling.
pub fn split_seed(seed: u64, stream: u64) -> u64 {
    mix_u64(seed ^ stream.wrapping_mul(0x94D049BB133111EB).rotate_left(17))
}

#[inline]
fn mix_u64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}
