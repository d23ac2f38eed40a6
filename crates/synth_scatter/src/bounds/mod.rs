//! Axis-aligned bounds computed through a transform hierarchy.
//!
//! [`compute_bounds`] walks a [`BoundsNode`] tree bottom-up: each node encapsulates its
//! own geometry with the bounds of its children and re-expresses the union in its
//! parent's space through its local TRS transform. The result is used to normalize
//! heterogeneous prefabs to a common size before placement.
use glam::{Mat3, Mat4, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub mod node;
pub mod transform;

pub use node::{BoundsNode, RootOverride, SceneNode};
pub use transform::Transform;

/// Min/max axis-aligned bounding box.
///
/// [`Aabb::EMPTY`] (`+inf` mins, `-inf` maxes) is the identity for [`Aabb::encapsulate`]
/// and stays invalid until some geometry is merged into it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    pub const EMPTY: Self = Self {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Builds a box from its center and half extents.
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// True once at least one piece of geometry contributed, i.e. `min <= max` everywhere.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min.cmple(self.max).all()
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half the size along each axis.
    #[inline]
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Grows `self` to contain `other`. Merging an invalid box is a no-op.
    pub fn encapsulate(&mut self, other: &Aabb) {
        if !other.is_valid() {
            return;
        }
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        let mut out = *self;
        out.encapsulate(other);
        out
    }

    /// Bounds of this box after the affine transform `matrix`.
    ///
    /// Rotating the corners alone is not enough; the center is transformed as a point and
    /// the extents are projected onto the absolute values of the transformed basis axes.
    pub fn transformed(&self, matrix: &Mat4) -> Aabb {
        if !self.is_valid() {
            return *self;
        }
        let center = matrix.transform_point3(self.center());
        let e = self.extents();
        let basis = Mat3::from_mat4(*matrix);
        let extents =
            basis.x_axis.abs() * e.x + basis.y_axis.abs() * e.y + basis.z_axis.abs() * e.z;
        Aabb::from_center_extents(center, extents)
    }
}

/// Computes the bounds of `node` in its parent's space, failing when the hierarchy has no geometry.
pub fn compute_bounds(node: &dyn BoundsNode) -> Result<Aabb> {
    let aabb = compute_bounds_unchecked(node);
    if !aabb.is_valid() {
        return Err(Error::InvalidGeometry {
            name: node.name().to_owned(),
        });
    }
    Ok(aabb)
}

/// Like [`compute_bounds`], but returns [`Aabb::EMPTY`] instead of failing.
pub fn compute_bounds_unchecked(node: &dyn BoundsNode) -> Aabb {
    let mut aabb = node.leaf_bounds().unwrap_or(Aabb::EMPTY);
    node.visit_children(&mut |child| {
        aabb.encapsulate(&compute_bounds_unchecked(child));
    });
    aabb.transformed(&node.local_transform().to_matrix())
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use glam::Quat;

    use super::*;

    fn assert_vec3_near(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn empty_box_is_invalid_and_identity_for_encapsulate() {
        assert!(!Aabb::EMPTY.is_valid());
        let unit = Aabb::from_center_extents(Vec3::ZERO, Vec3::ONE);

        let mut acc = Aabb::EMPTY;
        acc.encapsulate(&unit);
        assert_eq!(acc, unit);

        let mut kept = unit;
        kept.encapsulate(&Aabb::EMPTY);
        assert_eq!(kept, unit);
    }

    #[test]
    fn sibling_cubes_union() {
        let root = SceneNode::new("pair")
            .with_child(SceneNode::mesh(
                "left",
                Vec3::new(-2.0, 0.0, 0.0),
                Vec3::ONE,
            ))
            .with_child(SceneNode::mesh("right", Vec3::new(2.0, 0.0, 0.0), Vec3::ONE));

        let aabb = compute_bounds(&root).expect("has geometry");
        assert_vec3_near(aabb.min, Vec3::new(-3.0, -1.0, -1.0));
        assert_vec3_near(aabb.max, Vec3::new(3.0, 1.0, 1.0));
    }

    #[test]
    fn object_without_geometry_fails() {
        let root = SceneNode::new("hollow");
        let err = compute_bounds(&root).unwrap_err();
        assert!(matches!(err, Error::InvalidGeometry { ref name } if name == "hollow"));
        assert!(!compute_bounds_unchecked(&root).is_valid());
    }

    #[test]
    fn nested_groups_without_geometry_still_fail() {
        let root = SceneNode::new("outer")
            .with_child(SceneNode::new("inner").with_child(SceneNode::new("deepest")));
        assert!(compute_bounds(&root).is_err());
    }

    #[test]
    fn quarter_turn_swaps_extents() {
        let b = Aabb::from_center_extents(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 0.5));
        let m = Transform::IDENTITY
            .with_rotation(Quat::from_rotation_z(FRAC_PI_2))
            .to_matrix();
        let r = b.transformed(&m);
        assert_vec3_near(r.center(), Vec3::new(0.0, 1.0, 0.0));
        assert_vec3_near(r.extents(), Vec3::new(1.0, 2.0, 0.5));
    }

    #[test]
    fn diagonal_rotation_grows_extents() {
        let b = Aabb::from_center_extents(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0));
        let m = Transform::IDENTITY
            .with_rotation(Quat::from_rotation_z(FRAC_PI_2 * 0.5))
            .to_matrix();
        let r = b.transformed(&m);
        let expected = std::f32::consts::SQRT_2;
        assert_vec3_near(r.extents(), Vec3::new(expected, expected, 1.0));
    }

    #[test]
    fn child_transforms_compose_through_parents() {
        let leaf = SceneNode::mesh("leaf", Vec3::ZERO, Vec3::splat(0.5))
            .with_transform(Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        let group = SceneNode::new("group")
            .with_transform(Transform::IDENTITY.with_uniform_scale(2.0))
            .with_child(leaf);
        let root = SceneNode::new("root")
            .with_transform(Transform::from_translation(Vec3::new(0.0, 0.0, 10.0)))
            .with_child(group);

        let aabb = compute_bounds(&root).unwrap();
        assert_vec3_near(aabb.center(), Vec3::new(2.0, 0.0, 10.0));
        assert_vec3_near(aabb.extents(), Vec3::ONE);
    }

    #[test]
    fn own_geometry_merges_with_children() {
        let root = SceneNode::mesh("body", Vec3::ZERO, Vec3::ONE)
            .with_child(SceneNode::mesh("antenna", Vec3::new(0.0, 3.0, 0.0), Vec3::splat(0.5)));
        let aabb = compute_bounds(&root).unwrap();
        assert_vec3_near(aabb.min, Vec3::new(-1.0, -1.0, -1.0));
        assert_vec3_near(aabb.max, Vec3::new(1.0, 3.5, 1.0));
    }

    #[test]
    fn normalized_extents_have_unit_magnitude() {
        let aabb = Aabb::from_center_extents(Vec3::new(3.0, -1.0, 2.0), Vec3::new(0.3, 4.0, 1.7));
        let magnitude = aabb.extents().length();
        assert!(magnitude > 0.0);
        let scale = 1.0 / magnitude;
        let normalized = aabb.transformed(&Transform::IDENTITY.with_uniform_scale(scale).to_matrix());
        assert!((normalized.extents().length() - 1.0).abs() < 1e-5);
    }
}
