//! Iteration controller: sequences the foreground, background and occluder passes.
//!
//! Each iteration creates a fresh [`IterationContext`]. The foreground pass draws the
//! object size, writes it as the reference size and places its targets; the background
//! and occluder passes then read that size for their separation and scale. Whatever
//! happens during population, every layer is reset before the next iteration starts.
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::pool::{InstancePool, PrefabId, PrefabLibrary};
use crate::scatter::events::{EventSink, ScatterEvent, ScatterEventKind};
use crate::scatter::layer::{Layer, PopulateRequest};
use crate::scatter::seed::seed_for_pass;
use crate::scatter::selection::{CategoricalSelector, PrefabSelector, UniformIndexSelector};
use crate::scatter::settings::{DependentSettings, ScatterSettings};
use crate::scatter::{LayerKind, Placement, ScalePolicy};

const SIZE_PASS: u32 = 0;

/// Iteration-scoped state shared between layers.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationContext {
    iteration: u64,
    reference_size: Option<f32>,
}

impl IterationContext {
    pub fn new(iteration: u64) -> Self {
        Self {
            iteration,
            reference_size: None,
        }
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// The foreground size for this iteration, if it was written already.
    pub fn reference_size(&self) -> Option<f32> {
        self.reference_size
    }

    pub fn write_reference_size(&mut self, size: f32) {
        self.reference_size = Some(size);
    }
}

/// Lifecycle phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationPhase {
    Idle,
    Populating,
    Populated,
}

/// Everything placed in one iteration.
#[derive(Debug, Clone, Default)]
pub struct IterationReport {
    pub iteration: u64,
    pub reference_size: f32,
    pub placements: Vec<Placement>,
}

impl IterationReport {
    pub fn layer(&self, kind: LayerKind) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(move |p| p.layer == kind)
    }

    pub fn count(&self, kind: LayerKind) -> usize {
        self.layer(kind).count()
    }
}

/// Prefab selectors for the three layers.
pub struct LayerSelectors {
    pub foreground: Box<dyn PrefabSelector>,
    pub background: Box<dyn PrefabSelector>,
    pub occluder: Box<dyn PrefabSelector>,
}

impl LayerSelectors {
    pub fn new(
        foreground: impl PrefabSelector + 'static,
        background: impl PrefabSelector + 'static,
        occluder: impl PrefabSelector + 'static,
    ) -> Self {
        Self {
            foreground: Box::new(foreground),
            background: Box::new(background),
            occluder: Box::new(occluder),
        }
    }

    /// Every layer picks uniformly from the whole library.
    pub fn uniform(library: &PrefabLibrary) -> Self {
        Self::new(
            UniformIndexSelector::from_library(library),
            CategoricalSelector::uniform(library),
            CategoricalSelector::uniform(library),
        )
    }

    /// Foreground picks among `targets`; background and occluders share `distractors`.
    pub fn split(targets: Vec<PrefabId>, distractors: Vec<PrefabId>) -> Self {
        let weighted: Vec<_> = distractors.into_iter().map(|id| (id, 1.0)).collect();
        Self::new(
            UniformIndexSelector::new(targets),
            CategoricalSelector::new(weighted.clone()),
            CategoricalSelector::new(weighted),
        )
    }
}

/// Runs placement iterations against a pool.
pub struct IterationController<P: InstancePool> {
    settings: ScatterSettings,
    pool: P,
    foreground: Layer,
    background: Layer,
    occluder: Layer,
    phase: IterationPhase,
    next_iteration: u64,
    current: Option<u64>,
}

impl<P: InstancePool> IterationController<P> {
    pub fn try_new(settings: ScatterSettings, pool: P, selectors: LayerSelectors) -> Result<Self> {
        settings.validate()?;

        let fg = &settings.foreground;
        let foreground = Layer::new(LayerKind::Foreground, selectors.foreground)
            .with_sampler(fg.sampler)
            .with_max_instances(fg.max_object_count)
            .with_normalize_bounds(fg.normalize_bounds);
        let background = dependent_layer(
            LayerKind::Background,
            selectors.background,
            &settings.background,
        );
        let occluder = dependent_layer(LayerKind::Occluder, selectors.occluder, &settings.occluder);

        Ok(Self {
            settings,
            pool,
            foreground,
            background,
            occluder,
            phase: IterationPhase::Idle,
            next_iteration: 0,
            current: None,
        })
    }

    pub fn settings(&self) -> &ScatterSettings {
        &self.settings
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    pub fn into_pool(self) -> P {
        self.pool
    }

    pub fn phase(&self) -> IterationPhase {
        self.phase
    }

    pub fn layer(&self, kind: LayerKind) -> &Layer {
        match kind {
            LayerKind::Foreground => &self.foreground,
            LayerKind::Background => &self.background,
            LayerKind::Occluder => &self.occluder,
        }
    }

    /// Index the next [`IterationController::begin_iteration`] will use.
    pub fn next_iteration(&self) -> u64 {
        self.next_iteration
    }

    /// Jumps to iteration `index`, e.g. to replay a single iteration of a longer run.
    pub fn seek(&mut self, index: u64) -> Result<()> {
        if self.phase != IterationPhase::Idle {
            return Err(Error::IterationInProgress(
                self.current.unwrap_or_default(),
            ));
        }
        self.next_iteration = index;
        Ok(())
    }

    /// Populates all layers for the next iteration.
    ///
    /// On error every layer is reset before returning, so the pool holds no active instances.
    pub fn begin_iteration(&mut self, sink: &mut dyn EventSink) -> Result<IterationReport> {
        if self.phase != IterationPhase::Idle {
            return Err(Error::IterationInProgress(
                self.current.unwrap_or_default(),
            ));
        }

        let iteration = self.next_iteration;
        self.next_iteration += 1;
        self.current = Some(iteration);
        self.phase = IterationPhase::Populating;
        info!("Iteration {}: populating layers.", iteration);
        if sink.wants(ScatterEventKind::IterationStarted) {
            sink.send(ScatterEvent::IterationStarted { iteration });
        }

        let mut ctx = IterationContext::new(iteration);
        match self.populate_layers(&mut ctx, sink) {
            Ok(placements) => {
                self.phase = IterationPhase::Populated;
                Ok(IterationReport {
                    iteration,
                    reference_size: ctx.reference_size().unwrap_or_default(),
                    placements,
                })
            }
            Err(e) => {
                warn!("Iteration {} failed: {}.", iteration, e);
                if sink.wants(ScatterEventKind::Warning) {
                    sink.send(ScatterEvent::Warning {
                        context: format!("iteration:{iteration}"),
                        message: e.to_string(),
                    });
                }
                self.finish(iteration, false, sink);
                Err(e)
            }
        }
    }

    /// Returns every instance to the pool. A no-op when no iteration is in progress.
    pub fn end_iteration(&mut self, sink: &mut dyn EventSink) -> usize {
        match self.current {
            Some(iteration) if self.phase != IterationPhase::Idle => {
                self.finish(iteration, true, sink)
            }
            _ => 0,
        }
    }

    /// Begins an iteration, hands the placed scene to `capture`, then always ends it,
    /// including when `capture` panics.
    pub fn run_iteration<R>(
        &mut self,
        sink: &mut dyn EventSink,
        capture: impl FnOnce(&IterationReport, &P) -> R,
    ) -> Result<R> {
        let report = self.begin_iteration(sink)?;
        let guard = EndOnDrop {
            controller: self,
            sink,
        };
        let out = capture(&report, &guard.controller.pool);
        drop(guard);
        Ok(out)
    }

    fn populate_layers(
        &mut self,
        ctx: &mut IterationContext,
        sink: &mut dyn EventSink,
    ) -> Result<Vec<Placement>> {
        let iteration = ctx.iteration();
        let base_seed = self.settings.seed;

        let fg = &self.settings.foreground;
        let mut size_rng = StdRng::seed_from_u64(seed_for_pass(base_seed, iteration, SIZE_PASS));
        let size = fg.object_size.sample(&mut size_rng);
        ctx.write_reference_size(size);
        if sink.wants(ScatterEventKind::ReferenceSizeChosen) {
            sink.send(ScatterEvent::ReferenceSizeChosen { iteration, size });
        }

        let foreground_request = PopulateRequest::new(
            fg.sampling_domain(size),
            size * fg.relative_separation,
            ScalePolicy::Reference,
        )
        .with_z_offset(fg.depth)
        .with_seed(seed_for_pass(base_seed, iteration, 1));
        let background_request =
            dependent_request(&self.settings.background, size, base_seed, iteration, 2);
        let occluder_request =
            dependent_request(&self.settings.occluder, size, base_seed, iteration, 3);

        let mut placements = Vec::new();
        for (layer, request) in [
            (&mut self.foreground, foreground_request),
            (&mut self.background, background_request),
            (&mut self.occluder, occluder_request),
        ] {
            let placed = layer.populate(&mut self.pool, ctx, &request)?;
            if sink.wants(ScatterEventKind::LayerPopulated) {
                sink.send(ScatterEvent::LayerPopulated {
                    iteration,
                    layer: layer.kind(),
                    sampled: layer.last_sampled_count(),
                    placed: placed.len(),
                });
            }
            if sink.wants(ScatterEventKind::PlacementMade) {
                for placement in &placed {
                    sink.send(ScatterEvent::PlacementMade {
                        iteration,
                        placement: placement.clone(),
                    });
                }
            }
            placements.extend(placed);
        }

        Ok(placements)
    }

    fn finish(&mut self, iteration: u64, succeeded: bool, sink: &mut dyn EventSink) -> usize {
        let mut released = 0;
        for layer in [&mut self.foreground, &mut self.background, &mut self.occluder] {
            let count = layer.reset(&mut self.pool);
            released += count;
            if sink.wants(ScatterEventKind::LayerReset) {
                sink.send(ScatterEvent::LayerReset {
                    iteration,
                    layer: layer.kind(),
                    released: count,
                });
            }
        }
        if self.pool.active_count() != 0 {
            warn!(
                "Pool still reports {} active instances after iteration {}.",
                self.pool.active_count(),
                iteration
            );
        }

        self.phase = IterationPhase::Idle;
        self.current = None;
        info!("Iteration {}: released {} instances.", iteration, released);
        if sink.wants(ScatterEventKind::IterationFinished) {
            sink.send(ScatterEvent::IterationFinished {
                iteration,
                succeeded,
            });
        }
        released
    }
}

/// Ends the controller's current iteration when dropped.
struct EndOnDrop<'a, P: InstancePool> {
    controller: &'a mut IterationController<P>,
    sink: &'a mut dyn EventSink,
}

impl<P: InstancePool> Drop for EndOnDrop<'_, P> {
    fn drop(&mut self) {
        self.controller.end_iteration(self.sink);
    }
}

fn dependent_layer(
    kind: LayerKind,
    selector: Box<dyn PrefabSelector>,
    settings: &DependentSettings,
) -> Layer {
    Layer::new(kind, selector)
        .with_sampler(settings.sampler)
        .with_normalize_bounds(settings.normalize_bounds)
}

fn dependent_request(
    settings: &DependentSettings,
    reference_size: f32,
    base_seed: u64,
    iteration: u64,
    pass: u32,
) -> PopulateRequest {
    PopulateRequest::new(
        settings.placement_area,
        reference_size * settings.relative_separation,
        ScalePolicy::RelativeToReference(settings.relative_size),
    )
    .with_z_offset(settings.depth)
    .with_passes(settings.sheet_count)
    .with_seed(seed_for_pass(base_seed, iteration, pass))
}
