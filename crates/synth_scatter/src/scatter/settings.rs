//! Configuration for the three placement passes.
//!
//! Defaults mirror a typical detection setup: foreground targets on a 5x5 plane at depth 3,
//! two background sheets behind them, and a sparse occluder sheet in front at depth 5.
use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::params::UniformRange;
use crate::sampling::SamplerStrategy;

/// Smallest sampling extent used when the foreground margin eats the whole area.
pub const MIN_DOMAIN_EXTENT: f32 = 1.0e-3;

/// Foreground targets. Their sampled size becomes the iteration's reference size.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ForegroundSettings {
    pub placement_area: Vec2,
    /// Z coordinate of the placement plane.
    pub depth: f32,
    pub max_object_count: usize,
    /// Normalized half-diagonal of every foreground object, drawn once per iteration.
    pub object_size: UniformRange,
    /// Separation as a multiple of the object size.
    pub relative_separation: f32,
    /// The sampled area shrinks by `object_size * margin_factor` so objects stay inside.
    pub margin_factor: f32,
    pub normalize_bounds: bool,
    pub sampler: SamplerStrategy,
}

impl Default for ForegroundSettings {
    fn default() -> Self {
        Self {
            placement_area: Vec2::new(5.0, 5.0),
            depth: 3.0,
            max_object_count: 30,
            object_size: UniformRange::new(0.9, 4.9),
            relative_separation: 4.0,
            margin_factor: 1.5,
            normalize_bounds: true,
            sampler: SamplerStrategy::default(),
        }
    }
}

impl ForegroundSettings {
    /// The rectangle actually handed to the sampler for a given object size.
    pub fn sampling_domain(&self, size: f32) -> Vec2 {
        (self.placement_area - Vec2::splat(size * self.margin_factor))
            .max(Vec2::splat(MIN_DOMAIN_EXTENT))
    }

    pub fn with_placement_area(mut self, placement_area: Vec2) -> Self {
        self.placement_area = placement_area;
        self
    }

    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_max_object_count(mut self, max_object_count: usize) -> Self {
        self.max_object_count = max_object_count;
        self
    }

    pub fn with_object_size(mut self, object_size: UniformRange) -> Self {
        self.object_size = object_size;
        self
    }

    pub fn with_relative_separation(mut self, relative_separation: f32) -> Self {
        self.relative_separation = relative_separation;
        self
    }

    pub fn with_margin_factor(mut self, margin_factor: f32) -> Self {
        self.margin_factor = margin_factor;
        self
    }

    pub fn with_normalize_bounds(mut self, normalize_bounds: bool) -> Self {
        self.normalize_bounds = normalize_bounds;
        self
    }

    pub fn with_sampler(mut self, sampler: SamplerStrategy) -> Self {
        self.sampler = sampler;
        self
    }

    fn validate(&self) -> Result<()> {
        validate_area("foreground.placement_area", self.placement_area)?;
        self.object_size.validate_positive("foreground.object_size")?;
        validate_positive("foreground.relative_separation", self.relative_separation)?;
        if !self.margin_factor.is_finite() || self.margin_factor < 0.0 {
            return Err(Error::InvalidConfig(
                "foreground.margin_factor must be finite and >= 0".into(),
            ));
        }
        Ok(())
    }
}

/// A dependent pass whose sizes derive from the foreground reference size.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DependentSettings {
    pub placement_area: Vec2,
    /// Z coordinate of the first sheet.
    pub depth: f32,
    /// Number of stacked sheets, each one separation distance further back.
    pub sheet_count: u32,
    /// Separation as a multiple of the reference size.
    pub relative_separation: f32,
    /// Per-instance size ratio to the reference size.
    pub relative_size: UniformRange,
    pub normalize_bounds: bool,
    pub sampler: SamplerStrategy,
}

impl DependentSettings {
    pub fn background() -> Self {
        Self {
            placement_area: Vec2::new(6.0, 6.0),
            depth: 0.0,
            sheet_count: 2,
            relative_separation: 1.5,
            relative_size: UniformRange::new(0.8, 1.2),
            normalize_bounds: true,
            sampler: SamplerStrategy::default(),
        }
    }

    pub fn occluder() -> Self {
        Self {
            placement_area: Vec2::new(6.0, 6.0),
            depth: 5.0,
            sheet_count: 1,
            relative_separation: 1.5,
            relative_size: UniformRange::new(0.3, 0.5),
            normalize_bounds: true,
            sampler: SamplerStrategy::default(),
        }
    }

    pub fn with_placement_area(mut self, placement_area: Vec2) -> Self {
        self.placement_area = placement_area;
        self
    }

    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_sheet_count(mut self, sheet_count: u32) -> Self {
        self.sheet_count = sheet_count;
        self
    }

    pub fn with_relative_separation(mut self, relative_separation: f32) -> Self {
        self.relative_separation = relative_separation;
        self
    }

    pub fn with_relative_size(mut self, relative_size: UniformRange) -> Self {
        self.relative_size = relative_size;
        self
    }

    pub fn with_normalize_bounds(mut self, normalize_bounds: bool) -> Self {
        self.normalize_bounds = normalize_bounds;
        self
    }

    pub fn with_sampler(mut self, sampler: SamplerStrategy) -> Self {
        self.sampler = sampler;
        self
    }

    fn validate(&self, name: &str) -> Result<()> {
        validate_area(&format!("{name}.placement_area"), self.placement_area)?;
        validate_positive(
            &format!("{name}.relative_separation"),
            self.relative_separation,
        )?;
        self.relative_size
            .validate_positive(&format!("{name}.relative_size"))
    }
}

/// Full configuration of an [`crate::scatter::iteration::IterationController`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScatterSettings {
    /// Master seed; every iteration derives its own seeds from it.
    pub seed: u64,
    pub foreground: ForegroundSettings,
    pub background: DependentSettings,
    pub occluder: DependentSettings,
}

impl Default for ScatterSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            foreground: ForegroundSettings::default(),
            background: DependentSettings::background(),
            occluder: DependentSettings::occluder(),
        }
    }
}

impl ScatterSettings {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    pub fn with_foreground(mut self, foreground: ForegroundSettings) -> Self {
        self.foreground = foreground;
        self
    }

    pub fn with_background(mut self, background: DependentSettings) -> Self {
        self.background = background;
        self
    }

    pub fn with_occluder(mut self, occluder: DependentSettings) -> Self {
        self.occluder = occluder;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.foreground.validate()?;
        self.background.validate("background")?;
        self.occluder.validate("occluder")
    }
}

fn validate_area(what: &str, area: Vec2) -> Result<()> {
    if !area.is_finite() || area.x <= 0.0 || area.y <= 0.0 {
        return Err(Error::InvalidConfig(format!(
            "{what} must be > 0 in both components"
        )));
    }
    Ok(())
}

fn validate_positive(what: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidConfig(format!("{what} must be > 0")));
    }
    Ok(())
}
