//! Scalar parameters sampled once per use.
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sampling::rand01;

/// Uniform distribution over `[min, max)`; `min == max` yields a constant.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UniformRange {
    pub min: f32,
    pub max: f32,
}

impl UniformRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub const fn constant(value: f32) -> Self {
        Self::new(value, value)
    }

    pub fn sample(&self, rng: &mut dyn RngCore) -> f32 {
        self.min + rand01(rng) * (self.max - self.min)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Checks that both bounds are finite and ordered; `what` names the parameter in errors.
    pub fn validate(&self, what: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(Error::InvalidConfig(format!("{what} must be finite")));
        }
        if self.min > self.max {
            return Err(Error::InvalidConfig(format!(
                "{what} has min {} > max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Like [`UniformRange::validate`], additionally requiring `min > 0`.
    pub fn validate_positive(&self, what: &str) -> Result<()> {
        self.validate(what)?;
        if self.min <= 0.0 {
            return Err(Error::InvalidConfig(format!("{what} must be > 0")));
        }
        Ok(())
    }
}
