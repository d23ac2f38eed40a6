//! Event types and sinks for observing iterations.
//!
//! This module defines [`ScatterEvent`] and a set of sinks to emit, collect, or forward
//! events while an [`crate::scatter::iteration::IterationController`] populates and resets
//! its layers.
use crate::scatter::{LayerKind, Placement};

/// Describes events emitted while running iterations.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum ScatterEvent {
    /// Emitted before any layer of an iteration is populated.
    IterationStarted {
        /// Zero-based iteration index.
        iteration: u64,
    },

    /// Emitted once the foreground pass fixed the iteration's reference size.
    ReferenceSizeChosen { iteration: u64, size: f32 },

    /// Emitted after a layer populated successfully.
    LayerPopulated {
        iteration: u64,
        layer: LayerKind,
        /// Points produced by the sampler across all passes of the layer.
        sampled: usize,
        /// Instances actually placed.
        placed: usize,
    },

    /// Emitted for every placed instance.
    PlacementMade { iteration: u64, placement: Placement },

    /// Emitted after a layer returned its instances to the pool.
    LayerReset {
        iteration: u64,
        layer: LayerKind,
        released: usize,
    },

    /// Emitted when all layers are reset.
    IterationFinished {
        iteration: u64,
        /// Whether every layer populated without error.
        succeeded: bool,
    },

    /// Non-fatal warning generated during an iteration.
    Warning {
        /// Context string (e.g. layer name).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Discriminant of [`ScatterEvent`], used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScatterEventKind {
    IterationStarted,
    ReferenceSizeChosen,
    LayerPopulated,
    PlacementMade,
    LayerReset,
    IterationFinished,
    Warning,
}

impl ScatterEvent {
    pub fn kind(&self) -> ScatterEventKind {
        match self {
            ScatterEvent::IterationStarted { .. } => ScatterEventKind::IterationStarted,
            ScatterEvent::ReferenceSizeChosen { .. } => ScatterEventKind::ReferenceSizeChosen,
            ScatterEvent::LayerPopulated { .. } => ScatterEventKind::LayerPopulated,
            ScatterEvent::PlacementMade { .. } => ScatterEventKind::PlacementMade,
            ScatterEvent::LayerReset { .. } => ScatterEventKind::LayerReset,
            ScatterEvent::IterationFinished { .. } => ScatterEventKind::IterationFinished,
            ScatterEvent::Warning { .. } => ScatterEventKind::Warning,
        }
    }
}

/// A generic event sink that accepts [`ScatterEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: ScatterEvent);

    /// Lets emitters skip building events nobody listens to.
    #[inline]
    fn wants(&self, _kind: ScatterEventKind) -> bool {
        true
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: ScatterEvent) {}

    #[inline]
    fn wants(&self, _kind: ScatterEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(ScatterEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(ScatterEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(ScatterEvent),
{
    #[inline]
    fn send(&mut self, event: ScatterEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects all events in a `Vec`.
#[derive(Default)]
pub struct VecSink {
    events: Vec<ScatterEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn into_inner(self) -> Vec<ScatterEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[ScatterEvent] {
        &self.events
    }

    pub fn count(&self, kind: ScatterEventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: ScatterEvent) {
        self.events.push(event);
    }
}
