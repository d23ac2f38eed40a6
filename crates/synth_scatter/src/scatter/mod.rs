//! Layered placement: foreground targets, background distractors and occluders.
use std::fmt;

use glam::{Vec2, Vec3};
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::params::UniformRange;
use crate::pool::{InstanceHandle, PrefabId};

pub mod events;
pub mod iteration;
pub mod layer;
pub mod seed;
pub mod selection;
pub mod settings;

pub use iteration::IterationContext;

/// The placement pass a layer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LayerKind {
    Foreground,
    Background,
    Occluder,
}

impl LayerKind {
    pub const ALL: [LayerKind; 3] = [
        LayerKind::Foreground,
        LayerKind::Background,
        LayerKind::Occluder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::Foreground => "foreground",
            LayerKind::Background => "background",
            LayerKind::Occluder => "occluder",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One instance placed during an iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub layer: LayerKind,
    pub handle: InstanceHandle,
    pub prefab: PrefabId,
    /// Sample point in sampler-local coordinates, before centering.
    pub sample: Vec2,
    /// Final local position of the instance pivot.
    pub position: Vec3,
    /// Final uniform scale, including normalization.
    pub scale: f32,
}

/// How a layer derives the size of each instance.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScalePolicy {
    /// A fixed factor independent of other layers.
    Constant(f32),
    /// The reference size written by the foreground pass.
    Reference,
    /// Reference size times a ratio drawn per instance.
    RelativeToReference(UniformRange),
}

impl ScalePolicy {
    /// True when sampling reads the iteration's reference size.
    pub fn needs_reference(&self) -> bool {
        !matches!(self, ScalePolicy::Constant(_))
    }

    pub fn sample(&self, ctx: &IterationContext, rng: &mut dyn RngCore) -> Result<f32> {
        match *self {
            ScalePolicy::Constant(value) => Ok(value),
            ScalePolicy::Reference => ctx.reference_size().ok_or(Error::MissingReferenceSize),
            ScalePolicy::RelativeToReference(ratio) => {
                let reference = ctx.reference_size().ok_or(Error::MissingReferenceSize)?;
                Ok(reference * ratio.sample(rng))
            }
        }
    }
}

/// Offset that moves a `domain`-sized sampler rectangle so it is centered on the origin.
#[inline]
pub fn centering_offset(domain: Vec2) -> Vec2 {
    domain * -0.5
}
