//! Grid-accelerated Poisson disk sampling (Bridson).
use std::f32::consts::TAU;

use glam::Vec2;
use mint::Vector2;
use rand::RngCore;

use crate::sampling::grid::SeparationGrid;
use crate::sampling::{rand01, BlueNoiseSampling};

/// Candidates tried around an active point before it is retired.
pub const DEFAULT_CANDIDATES: usize = 30;

/// Poisson disk sampling strategy.
#[derive(Debug, Clone)]
pub struct PoissonDiskSampling {
    /// Candidates generated in the `[r, 2r]` annulus per active point.
    pub k: usize,
}

impl Default for PoissonDiskSampling {
    fn default() -> Self {
        Self::new(DEFAULT_CANDIDATES)
    }
}

impl PoissonDiskSampling {
    pub fn new(k: usize) -> Self {
        Self { k: k.max(1) }
    }
}

impl BlueNoiseSampling for PoissonDiskSampling {
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

        let Some(mut sampler) = PoissonDiskSampler::new(extent, min_distance, self.k) else {
            return Vec::new();
        };
        sampler.generate(rng).into_iter().map(Into::into).collect()
    }
}

struct PoissonDiskSampler {
    grid: SeparationGrid,
    extent: Vec2,
    radius: f32,
    k: usize,
    active: Vec<Vec2>,
    points: Vec<Vec2>,
}

impl PoissonDiskSampler {
    fn new(extent: Vec2, radius: f32, k: usize) -> Option<Self> {
        Some(Self {
            grid: SeparationGrid::new(extent, radius)?,
            extent,
            radius,
            k,
            active: Vec::new(),
            points: Vec::new(),
        })
    }

    fn accept(&mut self, point: Vec2) {
        self.grid.insert(point);
        self.active.push(point);
        self.points.push(point);
    }

    fn candidate_around(&self, rng: &mut dyn RngCore, origin: Vec2) -> Option<Vec2> {
        for _ in 0..self.k {
            let angle = rand01(rng) * TAU;
            let distance = self.radius * (1.0 + rand01(rng));
            let candidate = origin + Vec2::from_angle(angle) * distance;
            if self.grid.accepts(candidate) {
                return Some(candidate);
            }
        }
        None
    }

    fn generate(&mut self, rng: &mut dyn RngCore) -> Vec<Vec2> {
        let initial = Vec2::new(rand01(rng) * self.extent.x, rand01(rng) * self.extent.y);
        self.accept(initial);

        while !self.active.is_empty() {
            let last = self.active.len() - 1;
            let slot = ((rand01(rng) * self.active.len() as f32) as usize).min(last);
            let origin = self.active[slot];
            match self.candidate_around(rng, origin) {
                Some(p) => self.accept(p),
                // Retired points stay in the output.
                None => {
                    self.active.swap_remove(slot);
                }
            }
        }

        std::mem::take(&mut self.points)
    }
}
