#![forbid(unsafe_code)]
//! synth_scatter: Blue-noise placement of objects for synthetic training scenes.
//!
//! Modules:
//! - bounds: axis-aligned bounds through transform hierarchies
//! - sampling: minimum-distance point sets (Poisson disk, dart throwing)
//! - pool: prefab library and recyclable instances
//! - scatter: layers, settings, iteration controller, selection, events
//!
//! For examples and docs, see README and the `synth_scatter_examples` crate.
pub mod bounds;
pub mod error;
pub mod params;
pub mod pool;
pub mod sampling;
pub mod scatter;

/// Convenient re-exports for common types. Import with `use synth_scatter::prelude::*;`.
pub mod prelude {
    pub use crate::bounds::{compute_bounds, Aabb, BoundsNode, SceneNode, Transform};
    pub use crate::error::{Error, Result};
    pub use crate::params::UniformRange;
    pub use crate::pool::{
        InstanceHandle, InstancePool, Prefab, PrefabArena, PrefabId, PrefabLibrary,
    };
    pub use crate::sampling::{
        sample_blue_noise, BlueNoiseSampling, DartThrowingSampling, PoissonDiskSampling,
        SamplerStrategy,
    };
    pub use crate::scatter::events::{
        EventSink, FnSink, ScatterEvent, ScatterEventKind, VecSink,
    };
    pub use crate::scatter::iteration::{
        IterationContext, IterationController, IterationPhase, IterationReport, LayerSelectors,
    };
    pub use crate::scatter::layer::{Layer, PopulateRequest};
    pub use crate::scatter::seed::seed_for_pass;
    pub use crate::scatter::selection::{
        CategoricalSelector, PrefabSelector, UniformIndexSelector,
    };
    pub use crate::scatter::settings::{DependentSettings, ForegroundSettings, ScatterSettings};
    pub use crate::scatter::{LayerKind, Placement, ScalePolicy};
}
