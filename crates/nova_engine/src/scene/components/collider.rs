//! Collider descriptor component

use std::any::Any;

use crate::foundation::math::Vec3;
use crate::physics::ColliderShape;
use crate::scene::component::{Component, ComponentKind};

/// One collision shape on an entity
///
/// Several colliders may sit on the same entity; the physics collaborator
/// aggregates them into a single compound shape on demand.
#[derive(Debug, Clone)]
pub struct Collider {
    /// Shape variant
    pub shape: ColliderShape,
    /// Local-space offset from the entity's placement
    pub offset: Vec3,
    /// Trigger volumes report events but produce no physical response
    pub is_trigger: bool,
}

impl Collider {
    /// Collider with the given shape at the placement origin
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            offset: Vec3::zeros(),
            is_trigger: false,
        }
    }

    /// Sphere collider
    pub fn sphere(radius: f32) -> Self {
        Self::new(ColliderShape::Sphere { radius })
    }

    /// Box collider
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::new(ColliderShape::Box { half_extents })
    }

    /// Builder pattern: set the local offset
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    /// Builder pattern: mark as a trigger volume
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }
}

impl Component for Collider {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Collider
    }

    fn duplicate(&self) -> Option<Box<dyn Component>> {
        Some(Box::new(self.clone()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
