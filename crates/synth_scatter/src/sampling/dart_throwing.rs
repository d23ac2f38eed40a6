//! Dart-throwing position sampling strategy.
use glam::Vec2;
use mint::Vector2;
use rand::RngCore;

use crate::sampling::grid::SeparationGrid;
use crate::sampling::{rand01, BlueNoiseSampling};

pub const DEFAULT_MAX_CONSECUTIVE_MISSES: usize = 3_000;

/// Throws uniform darts over the whole domain, keeping those that respect the separation.
///
/// Stops once `max_consecutive_misses` darts in a row were rejected, which approximates a
/// maximal set without tracking an active list.
#[derive(Debug, Clone)]
pub struct DartThrowingSampling {
    pub max_consecutive_misses: usize,
}

impl Default for DartThrowingSampling {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONSECUTIVE_MISSES)
    }
}

impl DartThrowingSampling {
    pub fn new(max_consecutive_misses: usize) -> Self {
        Self {
            max_consecutive_misses: max_consecutive_misses.max(1),
        }
    }
}

impl BlueNoiseSampling for DartThrowingSampling {
    fn generate(
        &self,
        domain_extent: Vector2<f32>,
        min_distance: f32,
        rng: &mut dyn RngCore,
    ) -> Vec<Vector2<f32>> {
        let extent = Vec2::from(domain_extent);
        if !min_distance.is_finite() || min_distance <= 0.0 || extent.x <= 0.0 || extent.y <= 0.0
        {
            return Vec::new();
        }

        let Some(mut grid) = SeparationGrid::new(extent, min_distance) else {
            return Vec::new();
        };
        let mut points: Vec<Vector2<f32>> = Vec::new();
        let mut misses = 0;

        while misses < self.max_consecutive_misses {
            let dart = Vec2::new(rand01(rng) * extent.x, rand01(rng) * extent.y);
            if grid.accepts(dart) {
                grid.insert(dart);
                points.push(dart.into());
                misses = 0;
            } else {
                misses += 1;
            }
        }

        points
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::sampling::tests::pairwise_min_distance;

    #[test]
    fn first_dart_is_always_accepted() {
        let mut rng = StdRng::seed_from_u64(4);
        let points = DartThrowingSampling::new(1).generate(Vec2::new(3.0, 3.0).into(), 0.5, &mut rng);
        assert!(!points.is_empty());
    }

    #[test]
    fn darts_respect_separation() {
        let mut rng = StdRng::seed_from_u64(11);
        let points: Vec<Vec2> = DartThrowingSampling::default()
            .generate(Vec2::new(5.0, 5.0).into(), 0.5, &mut rng)
            .into_iter()
            .map(Vec2::from)
            .collect();
        assert!(points.len() > 30);
        assert!(pairwise_min_distance(&points) >= 0.5 - 1e-6);
    }

    #[test]
    fn non_positive_extent_returns_no_points() {
        let mut rng = StdRng::seed_from_u64(1);
        let s = DartThrowingSampling::default();
        assert!(s.generate(Vec2::new(0.0, 5.0).into(), 1.0, &mut rng).is_empty());
        assert!(s.generate(Vec2::new(5.0, -1.0).into(), 1.0, &mut rng).is_empty());
    }
}
