//! Prefab selection for sampled positions.
//!
//! A layer asks its [`PrefabSelector`] for one prefab per sample point:
//! - [`CategoricalSelector`]: draws proportionally to per-prefab weights via [`pick_weighted`].
//! - [`UniformIndexSelector`]: draws a uniform index into a fixed prefab array.
use rand::RngCore;

use crate::pool::{PrefabId, PrefabLibrary};
use crate::sampling::rand01;

/// Chooses the prefab to instantiate at a sample point.
pub trait PrefabSelector: Send + Sync {
    /// Returns `None` when there is nothing to choose from.
    fn select(&self, rng: &mut dyn RngCore) -> Option<PrefabId>;
}

/// Draws one of `entries` with probability proportional to its weight.
///
/// Non-positive weights never win; returns `None` if no weight is positive.
pub fn pick_weighted(entries: &[(PrefabId, f32)], rng: &mut dyn RngCore) -> Option<PrefabId> {
    let total_weight: f32 = entries.iter().map(|(_, w)| w.max(0.0)).sum();
    if total_weight <= 0.0 {
        return None;
    }

    let mut roll = rand01(rng) * total_weight;
    for &(id, weight) in entries {
        if weight <= 0.0 {
            continue;
        }
        roll -= weight;
        if roll < 0.0 {
            return Some(id);
        }
    }

    // Rounding left a sliver of the total; fall back to the last eligible entry.
    entries.iter().rev().find(|(_, w)| *w > 0.0).map(|(id, _)| *id)
}

/// Weighted categorical choice over a fixed prefab set.
#[derive(Debug, Clone, Default)]
pub struct CategoricalSelector {
    entries: Vec<(PrefabId, f32)>,
}

impl CategoricalSelector {
    pub fn new(entries: Vec<(PrefabId, f32)>) -> Self {
        Self { entries }
    }

    /// Equal weight for every prefab in `library`.
    pub fn uniform(library: &PrefabLibrary) -> Self {
        Self::new(library.ids().into_iter().map(|id| (id, 1.0)).collect())
    }

    pub fn with_weight(mut self, id: PrefabId, weight: f32) -> Self {
        self.entries.push((id, weight));
        self
    }

    pub fn entries(&self) -> &[(PrefabId, f32)] {
        &self.entries
    }
}

impl PrefabSelector for CategoricalSelector {
    fn select(&self, rng: &mut dyn RngCore) -> Option<PrefabId> {
        pick_weighted(&self.entries, rng)
    }
}

/// Uniform index into a fixed prefab array.
#[derive(Debug, Clone, Default)]
pub struct UniformIndexSelector {
    prefabs: Vec<PrefabId>,
}

impl UniformIndexSelector {
    pub fn new(prefabs: Vec<PrefabId>) -> Self {
        Self { prefabs }
    }

    pub fn from_library(library: &PrefabLibrary) -> Self {
        Self::new(library.ids())
    }
}

impl PrefabSelector for UniformIndexSelector {
    fn select(&self, rng: &mut dyn RngCore) -> Option<PrefabId> {
        if self.prefabs.is_empty() {
            return None;
        }
        let last = self.prefabs.len() - 1;
        let index = ((rand01(rng) * self.prefabs.len() as f32) as usize).min(last);
        Some(self.prefabs[index])
    }
}
