//! Layer compositor: turns sample points into normalized, scaled instances.
//!
//! A [`Layer`] owns the handles it acquired during the current iteration and nothing else.
//! [`Layer::populate`] samples points, selects a prefab per point, normalizes each instance
//! to unit bounds and applies the layer's [`ScalePolicy`]. [`Layer::reset`] hands every
//! instance back to the pool.
use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{info, warn};

use crate::bounds::{compute_bounds, Transform};
use crate::error::{Error, Result};
use crate::pool::{InstanceHandle, InstancePool, PrefabId};
use crate::sampling::{sample_blue_noise, SamplerStrategy};
use crate::scatter::seed::split_seed;
use crate::scatter::selection::PrefabSelector;
use crate::scatter::{centering_offset, IterationContext, LayerKind, Placement, ScalePolicy};

const SELECTION_STREAM: u64 = u64::MAX;

/// Per-call placement parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulateRequest {
    /// Size of the sampled rectangle; it is centered on the origin.
    pub domain: Vec2,
    /// Minimum separation between sample points.
    pub min_distance: f32,
    /// Depth of the first pass.
    pub z_offset: f32,
    pub scale: ScalePolicy,
    pub seed: u64,
    /// Stacked sampling passes; pass `i` sits `min_distance * i` behind `z_offset`.
    pub passes: u32,
}

impl PopulateRequest {
    pub fn new(domain: Vec2, min_distance: f32, scale: ScalePolicy) -> Self {
        Self {
            domain,
            min_distance,
            z_offset: 0.0,
            scale,
            seed: 0,
            passes: 1,
        }
    }

    pub fn with_z_offset(mut self, z_offset: f32) -> Self {
        self.z_offset = z_offset;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_passes(mut self, passes: u32) -> Self {
        self.passes = passes;
        self
    }
}

/// One placement pass of an iteration.
pub struct Layer {
    kind: LayerKind,
    selector: Box<dyn PrefabSelector>,
    sampler: SamplerStrategy,
    max_instances: Option<usize>,
    normalize_bounds: bool,
    active: Vec<InstanceHandle>,
    last_sampled: usize,
}

impl Layer {
    pub fn new(kind: LayerKind, selector: Box<dyn PrefabSelector>) -> Self {
        Self {
            kind,
            selector,
            sampler: SamplerStrategy::default(),
            max_instances: None,
            normalize_bounds: true,
            active: Vec::new(),
            last_sampled: 0,
        }
    }

    pub fn new_with<S: PrefabSelector + 'static>(kind: LayerKind, selector: S) -> Self {
        Self::new(kind, Box::new(selector))
    }

    pub fn with_sampler(mut self, sampler: SamplerStrategy) -> Self {
        self.sampler = sampler;
        self
    }

    /// Caps the number of instances per populate call. Extra sample points are ignored.
    pub fn with_max_instances(mut self, max_instances: usize) -> Self {
        self.max_instances = Some(max_instances);
        self
    }

    /// When disabled, instances are placed by pivot and keep their prefab scale.
    pub fn with_normalize_bounds(mut self, normalize_bounds: bool) -> Self {
        self.normalize_bounds = normalize_bounds;
        self
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn active_handles(&self) -> &[InstanceHandle] {
        &self.active
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Sample points produced by the most recent populate call, before the cap.
    pub fn last_sampled_count(&self) -> usize {
        self.last_sampled
    }

    /// Places one instance per sample point, up to the layer's cap.
    ///
    /// Handles are recorded as soon as they are acquired, so a failed call leaves the layer
    /// holding exactly what must be released by [`Layer::reset`].
    pub fn populate<P: InstancePool + ?Sized>(
        &mut self,
        pool: &mut P,
        ctx: &IterationContext,
        request: &PopulateRequest,
    ) -> Result<Vec<Placement>> {
        if !self.active.is_empty() {
            return Err(Error::LayerNotReset {
                layer: self.kind.to_string(),
                active: self.active.len(),
            });
        }

        self.last_sampled = 0;
        let offset = centering_offset(request.domain);
        let mut rng = StdRng::seed_from_u64(split_seed(request.seed, SELECTION_STREAM));
        let mut placements = Vec::new();
        let mut sampled = 0;

        'passes: for pass in 0..request.passes {
            let points = sample_blue_noise(
                &self.sampler,
                request.domain.x,
                request.domain.y,
                request.min_distance,
                split_seed(request.seed, pass as u64),
            )?;
            sampled += points.len();
            self.last_sampled = sampled;
            let z = request.z_offset - request.min_distance * pass as f32;

            for sample in points {
                if self.max_instances.is_some_and(|max| placements.len() >= max) {
                    break 'passes;
                }
                let anchor = Vec3::new(sample.x + offset.x, sample.y + offset.y, z);
                let (handle, prefab, position, scale) =
                    self.place(pool, ctx, &request.scale, anchor, &mut rng)?;
                placements.push(Placement {
                    layer: self.kind,
                    handle,
                    prefab,
                    sample,
                    position,
                    scale,
                });
            }
        }

        info!(
            "Layer '{}' placed {} of {} sampled points.",
            self.kind,
            placements.len(),
            sampled
        );
        Ok(placements)
    }

    fn place<P: InstancePool + ?Sized>(
        &mut self,
        pool: &mut P,
        ctx: &IterationContext,
        policy: &ScalePolicy,
        anchor: Vec3,
        rng: &mut dyn RngCore,
    ) -> Result<(InstanceHandle, PrefabId, Vec3, f32)> {
        let prefab = self.selector.select(rng).ok_or_else(|| {
            Error::InvalidConfig(format!("layer '{}' has no prefabs to select", self.kind))
        })?;
        let handle = pool.acquire(prefab)?;
        self.active.push(handle);

        if self.normalize_bounds {
            pool.set_transform(handle, Transform::IDENTITY)?;
            let bounds = compute_bounds(&pool.hierarchy(handle)?)?;
            let magnitude = bounds.extents().length();
            if magnitude <= 0.0 {
                return Err(Error::InvalidGeometry {
                    name: pool.hierarchy(handle)?.node.name.clone(),
                });
            }

            let scale = policy.sample(ctx, rng)? / magnitude;
            // The bounds center moves with the scale, so offset by the scaled center.
            let position = anchor - bounds.center() * scale;
            pool.set_transform(
                handle,
                Transform::from_translation(position).with_uniform_scale(scale),
            )?;
            Ok((handle, prefab, position, scale))
        } else {
            let factor = policy.sample(ctx, rng)?;
            let mut transform = pool.transform(handle)?;
            transform.translation = anchor;
            transform.scale *= factor;
            pool.set_transform(handle, transform)?;
            Ok((handle, prefab, anchor, factor))
        }
    }

    /// Releases every instance acquired since the last reset. Calling it again is a no-op.
    pub fn reset<P: InstancePool + ?Sized>(&mut self, pool: &mut P) -> usize {
        let mut released = 0;
        for handle in self.active.drain(..) {
            match pool.release(handle) {
                Ok(()) => released += 1,
                Err(e) => warn!("Layer '{}' could not release {:?}: {}.", self.kind, handle, e),
            }
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::SceneNode;
    use crate::params::UniformRange;
    use crate::pool::{PrefabArena, PrefabLibrary};
    use crate::scatter::selection::UniformIndexSelector;

    fn arena(roots: Vec<SceneNode>) -> (PrefabArena, Vec<PrefabId>) {
        let mut lib = PrefabLibrary::new();
        let ids = roots.into_iter().map(|r| lib.add(r)).collect();
        (PrefabArena::new(lib), ids)
    }

    fn cube_arena() -> (PrefabArena, Vec<PrefabId>) {
        arena(vec![SceneNode::mesh("cube", Vec3::ZERO, Vec3::splat(0.5))])
    }

    fn layer(ids: &[PrefabId]) -> Layer {
        Layer::new_with(
            LayerKind::Foreground,
            UniformIndexSelector::new(ids.to_vec()),
        )
    }

    fn request(domain: f32, min_distance: f32) -> PopulateRequest {
        PopulateRequest::new(Vec2::splat(domain), min_distance, ScalePolicy::Constant(1.0))
            .with_seed(42)
    }

    fn world_bounds(pool: &PrefabArena, handle: InstanceHandle) -> crate::bounds::Aabb {
        compute_bounds(&pool.hierarchy(handle).unwrap()).unwrap()
    }

    #[test]
    fn caps_at_max_instances() {
        let (mut pool, ids) = cube_arena();
        let mut fg = layer(&ids).with_max_instances(30);
        let ctx = IterationContext::new(0);

        let uncapped = sample_blue_noise(&SamplerStrategy::default(), 20.0, 20.0, 1.0, 0)
            .map(|p| p.len())
            .unwrap_or(0);
        assert!(uncapped > 30);

        let placed = fg.populate(&mut pool, &ctx, &request(20.0, 1.0)).unwrap();
        assert_eq!(placed.len(), 30);
        assert!(fg.last_sampled_count() > 30);
        assert_eq!(fg.active_count(), 30);
        assert_eq!(pool.active_count(), 30);
    }

    #[test]
    fn reset_then_populate_starts_from_zero() {
        let (mut pool, ids) = cube_arena();
        let mut fg = layer(&ids);
        let ctx = IterationContext::new(0);
        let req = request(8.0, 1.0);

        let first = fg.populate(&mut pool, &ctx, &req).unwrap().len();
        assert!(matches!(
            fg.populate(&mut pool, &ctx, &req),
            Err(Error::LayerNotReset { .. })
        ));

        assert_eq!(fg.reset(&mut pool), first);
        assert_eq!(fg.reset(&mut pool), 0);
        assert_eq!(pool.active_count(), 0);

        let second = fg.populate(&mut pool, &ctx, &req).unwrap().len();
        assert_eq!(second, first);
        assert_eq!(fg.active_count(), second);
        assert_eq!(pool.capacity(), first, "instances are recycled");
    }

    #[test]
    fn bounds_center_lands_on_sample_with_normalized_size() {
        let shade = SceneNode::mesh("shade", Vec3::new(4.0, 1.0, 0.0), Vec3::new(2.0, 1.0, 3.0));
        let off_center = SceneNode::new("lamp").with_child(shade);
        let (mut pool, ids) = arena(vec![off_center]);
        let mut fg = layer(&ids);
        let ctx = IterationContext::new(0);
        let req = PopulateRequest::new(Vec2::new(10.0, 6.0), 2.0, ScalePolicy::Constant(1.5))
            .with_z_offset(3.0)
            .with_seed(1);

        let placements = fg.populate(&mut pool, &ctx, &req).unwrap();
        assert!(!placements.is_empty());
        for p in &placements {
            let aabb = world_bounds(&pool, p.handle);
            let expected = Vec3::new(p.sample.x - 5.0, p.sample.y - 3.0, 3.0);
            assert!((aabb.center() - expected).length() < 1e-4);
            assert!((aabb.extents().length() - 1.5).abs() < 1e-4);
        }
    }

    #[test]
    fn disabled_normalization_places_by_pivot() {
        let (mut pool, ids) = cube_arena();
        let mut fg = layer(&ids).with_normalize_bounds(false);
        let ctx = IterationContext::new(0);
        let req = PopulateRequest::new(Vec2::splat(4.0), 1.0, ScalePolicy::Constant(2.0));

        for p in fg.populate(&mut pool, &ctx, &req).unwrap() {
            assert_eq!(p.scale, 2.0);
            let t = pool.transform(p.handle).unwrap();
            assert_eq!(t.translation, Vec3::new(p.sample.x - 2.0, p.sample.y - 2.0, 0.0));
            assert_eq!(t.scale, Vec3::splat(2.0));
        }
    }

    #[test]
    fn missing_geometry_fails_but_keeps_handle_for_reset() {
        let (mut pool, ids) = arena(vec![SceneNode::new("hollow")]);
        let mut fg = layer(&ids);
        let ctx = IterationContext::new(0);

        let err = fg.populate(&mut pool, &ctx, &request(5.0, 1.0)).unwrap_err();
        assert!(matches!(err, Error::InvalidGeometry { ref name } if name == "hollow"));
        assert_eq!(fg.active_count(), 1);
        assert_eq!(fg.reset(&mut pool), 1);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn relative_policy_needs_reference_size() {
        let (mut pool, ids) = cube_arena();
        let mut bg = layer(&ids);
        let mut ctx = IterationContext::new(0);
        let policy = ScalePolicy::RelativeToReference(UniformRange::new(0.8, 1.2));
        let req = PopulateRequest::new(Vec2::splat(6.0), 1.0, policy);

        assert!(matches!(
            bg.populate(&mut pool, &ctx, &req),
            Err(Error::MissingReferenceSize)
        ));
        bg.reset(&mut pool);

        ctx.write_reference_size(2.0);
        for p in bg.populate(&mut pool, &ctx, &req).unwrap() {
            let size = world_bounds(&pool, p.handle).extents().length();
            assert!((1.6 - 1e-4..=2.4 + 1e-4).contains(&size), "{size}");
        }
    }

    #[test]
    fn stacked_passes_step_back_in_depth() {
        let (mut pool, ids) = cube_arena();
        let mut bg = layer(&ids);
        let ctx = IterationContext::new(0);
        let req = request(6.0, 1.5).with_z_offset(1.0).with_passes(3);

        let placements = bg.populate(&mut pool, &ctx, &req).unwrap();
        let mut depths: Vec<f32> = placements
            .iter()
            .map(|p| world_bounds(&pool, p.handle).center().z)
            .collect();
        depths.sort_by(f32::total_cmp);
        depths.dedup_by(|a, b| (*a - *b).abs() < 1e-4);
        assert_eq!(depths.len(), 3);
        assert!((depths[0] - -2.0).abs() < 1e-4);
        assert!((depths[2] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn domain_errors_propagate() {
        let (mut pool, ids) = cube_arena();
        let mut fg = layer(&ids);
        let ctx = IterationContext::new(0);
        let err = fg.populate(&mut pool, &ctx, &request(5.0, 0.0)).unwrap_err();
        assert!(matches!(err, Error::Domain(_)));
        assert_eq!(fg.active_count(), 0);
    }

    #[test]
    fn same_seed_reproduces_placements() {
        let (mut pool_a, ids) = cube_arena();
        let (mut pool_b, _) = cube_arena();
        let ctx = IterationContext::new(0);
        let a = layer(&ids).populate(&mut pool_a, &ctx, &request(8.0, 1.0)).unwrap();
        let b = layer(&ids).populate(&mut pool_b, &ctx, &request(8.0, 1.0)).unwrap();
        assert_eq!(a, b);
    }
}
