//! Spatial placement component
//!
//! The one component every entity carries, created at construction and
//! never removable. It fronts the entity's spatial node: local TRS access,
//! world transform queries, and look-at orientation.

use std::any::Any;
use std::sync::Arc;

use crate::foundation::math::{look_at_rotation, Quat, Transform, Vec3};
use crate::scene::component::{Component, ComponentKind};
use crate::spatial::NodeHandle;

/// Constraint limiting how a placement's orientation may be driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrientationConstraint {
    /// Orientation is freely assignable
    #[default]
    Free,
    /// Orientation follows the active camera; direct orientation is illegal
    Billboard,
    /// Orientation is held fixed; direct orientation is illegal
    Frozen,
}

/// Spatial placement fronting the entity's node
pub struct Placement {
    node: NodeHandle,
    constraint: OrientationConstraint,
}

impl Placement {
    pub(crate) fn new(node: NodeHandle) -> Self {
        Self {
            node,
            constraint: OrientationConstraint::Free,
        }
    }

    /// Local position relative to the parent
    pub fn local_position(&self) -> Vec3 {
        self.node.local_position()
    }

    /// Set the local position
    pub fn set_local_position(&self, position: Vec3) {
        self.node.set_local_position(position);
    }

    /// Local orientation relative to the parent
    pub fn local_rotation(&self) -> Quat {
        self.node.local_rotation()
    }

    /// Set the local orientation
    ///
    /// # Panics
    ///
    /// Driving orientation while a constraint is active is a contract
    /// violation and aborts.
    pub fn set_local_rotation(&self, rotation: Quat) {
        self.assert_orientation_free();
        self.node.set_local_rotation(rotation);
    }

    /// Local scale relative to the parent
    pub fn local_scale(&self) -> Vec3 {
        self.node.local_scale()
    }

    /// Set the local scale
    pub fn set_local_scale(&self, scale: Vec3) {
        self.node.set_local_scale(scale);
    }

    /// World-space transform accumulated through the node chain
    pub fn world_transform(&self) -> Transform {
        self.node.world_transform()
    }

    /// World-space position
    pub fn world_position(&self) -> Vec3 {
        self.node.world_transform().position
    }

    /// Move the placement by a local-space delta
    pub fn translate(&self, delta: Vec3) {
        self.node
            .set_local_position(self.node.local_position() + delta);
    }

    /// Compose an additional local rotation
    ///
    /// # Panics
    ///
    /// Driving orientation while a constraint is active is a contract
    /// violation and aborts.
    pub fn rotate(&self, rotation: Quat) {
        self.assert_orientation_free();
        self.node
            .set_local_rotation(rotation * self.node.local_rotation());
    }

    /// Orient the +Z axis toward a world-space target
    ///
    /// # Panics
    ///
    /// Calling while an orientation constraint is active is a contract
    /// violation and aborts.
    pub fn look_at(&self, target: Vec3, up: Vec3) {
        self.assert_orientation_free();
        let world = self.node.world_transform();
        let desired = look_at_rotation(world.position, target, up);
        // Re-express the world-space goal in parent space.
        let parent_rotation = world.rotation * self.node.local_rotation().inverse();
        self.node
            .set_local_rotation(parent_rotation.inverse() * desired);
    }

    /// Active orientation constraint
    pub fn constraint(&self) -> OrientationConstraint {
        self.constraint
    }

    /// Set the orientation constraint
    pub fn set_constraint(&mut self, constraint: OrientationConstraint) {
        self.constraint = constraint;
    }

    /// The node this placement fronts
    pub fn node(&self) -> NodeHandle {
        Arc::clone(&self.node)
    }

    fn assert_orientation_free(&self) {
        assert!(
            self.constraint == OrientationConstraint::Free,
            "orientation driven while {:?} constraint is active",
            self.constraint
        );
    }
}

impl Component for Placement {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Placement
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::entity::Entity;
    use approx::assert_relative_eq;

    #[test]
    fn test_placement_drives_the_node() {
        let entity = Entity::new("mover");
        let placement = entity.placement();
        placement.with(|p| p.set_local_position(Vec3::new(1.0, 2.0, 3.0)));

        assert_relative_eq!(entity.node().local_position().y, 2.0);
        placement.with(|p| p.translate(Vec3::new(0.0, 1.0, 0.0)));
        assert_relative_eq!(entity.node().local_position().y, 3.0);
    }

    #[test]
    fn test_look_at_respects_parent_space() {
        let parent = Entity::new("parent");
        let child = Entity::new("child");
        parent.add_child(&child);
        parent
            .placement()
            .with(|p| p.set_local_position(Vec3::new(5.0, 0.0, 0.0)));

        child
            .placement()
            .with(|p| p.look_at(Vec3::new(5.0, 0.0, 10.0), Vec3::new(0.0, 1.0, 0.0)));

        let forward = child.placement().with(|p| p.world_transform().rotation) * Vec3::new(0.0, 0.0, 1.0);
        assert_relative_eq!(forward.z, 1.0, epsilon = 1e-5);
    }

    #[test]
    #[should_panic(expected = "constraint is active")]
    fn test_look_at_under_constraint_aborts() {
        let entity = Entity::new("billboard");
        entity
            .placement()
            .with_mut(|p| p.set_constraint(OrientationConstraint::Billboard));
        entity
            .placement()
            .with(|p| p.look_at(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 0.0)));
    }
}
