//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! missing geometry, degenerate sampling domains, invalid configuration, and misuse of the
//! instance pool or layer lifecycle.
use thiserror::Error;

use crate::pool::{InstanceHandle, PrefabId};

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("object '{name}' has no leaf geometry in its hierarchy")]
    InvalidGeometry { name: String },

    #[error("invalid sampling domain: {0}")]
    Domain(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("reference size read before the foreground layer wrote it")]
    MissingReferenceSize,

    #[error("unknown prefab {0:?}")]
    UnknownPrefab(PrefabId),

    #[error("stale or released instance handle {0:?}")]
    StaleHandle(InstanceHandle),

    #[error("layer '{layer}' still holds {active} active instances; reset it first")]
    LayerNotReset { layer: String, active: usize },

    #[error("iteration {0} is still in progress; end it first")]
    IterationInProgress(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_in_progress_names_the_iteration() {
        assert_eq!(
            Error::IterationInProgress(4).to_string(),
            "iteration 4 is still in progress; end it first"
        );
    }

    #[test]
    fn invalid_geometry_names_the_object() {
        let err = Error::InvalidGeometry {
            name: "crate_lid".into(),
        };
        assert!(err.to_string().contains("crate_lid"));
    }

    #[test]
    fn layer_not_reset_reports_active_count() {
        let err = Error::LayerNotReset {
            layer: "foreground".into(),
            active: 3,
        };
        assert_eq!(
            err.to_string(),
            "layer 'foreground' still holds 3 active instances; reset it first"
        );
    }
}
