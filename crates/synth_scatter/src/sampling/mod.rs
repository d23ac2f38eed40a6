//! Blue-noise point sampling over a rectangular domain.
//!
//! Every strategy honors the same contract: points lie in `[0, width] x [0, height]`, no two
//! points of one call are closer than the requested minimum distance, and the output is fully
//! determined by the RNG state (and therefore by the seed passed to [`sample_blue_noise`]).
use glam::Vec2;
use mint::Vector2;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

pub mod dart_throwing;
pub mod grid;
pub mod poisson_disk;

pub use dart_throwing::DartThrowingSampling;
pub use grid::{grid_dimensions, SeparationGrid, MAX_GRID_CELLS};
pub use poisson_disk::PoissonDiskSampling;

/// Trait for minimum-separation point sampling.
pub trait BlueNoiseSampling: Send + Sync {
    /// Generates points in `[0, extent.x] x [0, extent.y]` at least `min_distance` apart.
    ///
    /// Callers validate inputs; strategies return no points for degenerate values.
    fn generate(
        &self,
        domain_extent: Vector2<f32>,
        min_distance: f32,
        rng: &mut dyn RngCore,
    ) -> Vec<Vector2<f32>>;
}

/// Configurable choice between the available strategies.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SamplerStrategy {
    /// Grid-accelerated Poisson disk with `k` candidates per active point.
    PoissonDisk { k: usize },
    /// Uniform dart throwing that stops after this many consecutive rejections.
    DartThrowing { max_consecutive_misses: usize },
}

impl Default for SamplerStrategy {
    fn default() -> Self {
        SamplerStrategy::PoissonDisk {
            k: poisson_disk::DEFAULT_CANDIDATES,
        }
    }
}

impl BlueNoiseSampling for SamplerStrategy {
    fn generate(
        &self,
        domain_extent: Vector2<f32>,
        min_distance: f32,
        rng: &mut dyn RngCore,
    ) -> Vec<Vector2<f32>> {
        match *self {
            SamplerStrategy::PoissonDisk { k } => {
                PoissonDiskSampling::new(k).generate(domain_extent, min_distance, rng)
            }
            SamplerStrategy::DartThrowing {
                max_consecutive_misses,
            } => DartThrowingSampling::new(max_consecutive_misses).generate(
                domain_extent,
                min_distance,
                rng,
            ),
        }
    }
}

/// Checks the sampling inputs, returning [`Error::Domain`] for degenerate values.
pub fn validate_domain(width: f32, height: f32, min_distance: f32) -> Result<()> {
    if !(width.is_finite() && width > 0.0) || !(height.is_finite() && height > 0.0) {
        return Err(Error::Domain(format!(
            "domain extent must be finite and > 0, got {width} x {height}"
        )));
    }
    if !(min_distance.is_finite() && min_distance > 0.0) {
        return Err(Error::Domain(format!(
            "minimum distance must be finite and > 0, got {min_distance}"
        )));
    }
    if grid_dimensions(Vec2::new(width, height), min_distance).is_none() {
        return Err(Error::Domain(format!(
            "{width} x {height} at minimum distance {min_distance} needs more than \
             {MAX_GRID_CELLS} grid cells"
        )));
    }
    Ok(())
}

/// Samples a blue-noise point set for `seed`.
///
/// Identical inputs always reproduce the same sequence. Points are in sampler-local
/// coordinates; callers apply their own centering offset.
pub fn sample_blue_noise(
    strategy: &dyn BlueNoiseSampling,
    width: f32,
    height: f32,
    min_distance: f32,
    seed: u64,
) -> Result<Vec<Vec2>> {
    validate_domain(width, height, min_distance)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let points: Vec<Vec2> = strategy
        .generate(Vec2::new(width, height).into(), min_distance, &mut rng)
        .into_iter()
        .map(Vec2::from)
        .collect();
    debug!(
        "Sampled {} points in {}x{} (min distance {}, seed {:#x}).",
        points.len(),
        width,
        height,
        min_distance,
        seed
    );
    Ok(points)
}

/// Generate a random float in the range [0, 1).
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f32 {
    // Top 24 bits so the result never rounds up to 1.0.
    ((rng.next_u32() >> 8) as f32) / ((1u32 << 24) as f32)
}
