//! Hierarchy abstraction walked by the bounds engine.
use glam::Vec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounds::transform::Transform;
use crate::bounds::Aabb;

/// A node in a transform hierarchy.
///
/// Implementors expose their local transform relative to the parent, the bounds of
/// any geometry attached directly to the node (in node-local space), and their children.
pub trait BoundsNode {
    fn name(&self) -> &str;

    fn local_transform(&self) -> Transform;

    /// Local-space bounds of geometry owned by this node, if any.
    fn leaf_bounds(&self) -> Option<Aabb>;

    fn visit_children(&self, visit: &mut dyn FnMut(&dyn BoundsNode));
}

/// Owned scene-graph node used to describe prefab hierarchies.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    /// Geometry bounds in local space, e.g. a mesh's bounding box.
    pub geometry: Option<Aabb>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// An empty group node with an identity transform.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            geometry: None,
            children: Vec::new(),
        }
    }

    /// A leaf node carrying a box mesh of the given center and half extents.
    pub fn mesh(name: impl Into<String>, center: Vec3, extents: Vec3) -> Self {
        Self::new(name).with_geometry(Aabb::from_center_extents(center, extents))
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_geometry(mut self, geometry: Aabb) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = SceneNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }
}

impl BoundsNode for SceneNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn local_transform(&self) -> Transform {
        self.transform
    }

    fn leaf_bounds(&self) -> Option<Aabb> {
        self.geometry
    }

    fn visit_children(&self, visit: &mut dyn FnMut(&dyn BoundsNode)) {
        for child in &self.children {
            visit(child);
        }
    }
}

/// Views a prefab hierarchy with its root transform overridden.
///
/// Instances share their prefab's scene graph; only the root transform differs.
#[derive(Debug, Clone, Copy)]
pub struct RootOverride<'a> {
    pub node: &'a SceneNode,
    pub transform: Transform,
}

impl BoundsNode for RootOverride<'_> {
    fn name(&self) -> &str {
        &self.node.name
    }

    fn local_transform(&self) -> Transform {
        self.transform
    }

    fn leaf_bounds(&self) -> Option<Aabb> {
        self.node.geometry
    }

    fn visit_children(&self, visit: &mut dyn FnMut(&dyn BoundsNode)) {
        self.node.visit_children(visit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_children() {
        let root = SceneNode::new("root")
            .with_child(SceneNode::mesh("a", Vec3::ZERO, Vec3::ONE))
            .with_children([SceneNode::new("b"), SceneNode::new("c")]);
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.node_count(), 4);
    }

    #[test]
    fn root_override_replaces_only_the_root_transform() {
        let child = SceneNode::mesh("leaf", Vec3::ZERO, Vec3::ONE)
            .with_transform(Transform::from_translation(Vec3::X));
        let prefab = SceneNode::new("prefab")
            .with_transform(Transform::from_translation(Vec3::splat(9.0)))
            .with_child(child);

        let view = RootOverride {
            node: &prefab,
            transform: Transform::IDENTITY,
        };
        assert_eq!(view.local_transform(), Transform::IDENTITY);
        assert_eq!(view.name(), "prefab");

        let mut seen = Vec::new();
        view.visit_children(&mut |c| seen.push(c.local_transform().translation));
        assert_eq!(seen, vec![Vec3::X]);
    }
}
