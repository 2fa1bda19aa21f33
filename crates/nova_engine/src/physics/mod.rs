//! Physics collaborator boundary
//!
//! The core carries rigid-body and collider descriptors on entities and
//! aggregates them into a single compound shape on demand; integration and
//! collision detection live outside this crate. The external physics engine
//! reports contacts back through [`notify`], which fans out to the script
//! hooks on the affected entity.

use crate::foundation::math::Vec3;
use crate::scene::component::ComponentKind;
use crate::scene::components::{Collider, RigidBody};
use crate::scene::entity::EntityRef;
use crate::scene::script::ScriptHost;

/// Collision shape variants
#[derive(Debug, Clone, PartialEq)]
pub enum ColliderShape {
    /// Sphere around the collider origin
    Sphere {
        /// Sphere radius
        radius: f32,
    },
    /// Axis-aligned box around the collider origin
    Box {
        /// Half-extents along each axis
        half_extents: Vec3,
    },
    /// Capsule along the local Y axis
    Capsule {
        /// Capsule radius
        radius: f32,
        /// Distance between the cap centers
        height: f32,
    },
}

/// One shape of an aggregated body
#[derive(Debug, Clone)]
pub struct ShapePart {
    /// Local-space offset from the entity's placement
    pub offset: Vec3,
    /// Trigger parts report events but produce no physical response
    pub is_trigger: bool,
    /// Shape variant
    pub shape: ColliderShape,
}

/// Rigid-body descriptor plus every collider on the entity, compounded
#[derive(Debug, Clone)]
pub struct BodyAggregate {
    /// Dynamics descriptor
    pub body: RigidBody,
    /// Compound shape parts in component-list order
    pub parts: Vec<ShapePart>,
}

/// Aggregate an entity's physics descriptors into a single body
///
/// Absent when the entity carries no rigid-body component. A body without
/// colliders is returned with an empty part list; the physics collaborator
/// decides what that means.
pub fn aggregate_body(entity: &EntityRef) -> Option<BodyAggregate> {
    let body = entity.get_component::<RigidBody>()?.with(Clone::clone);
    let parts = entity
        .get_components::<Collider>()
        .iter()
        .map(|collider| {
            collider.with(|c| ShapePart {
                offset: c.offset,
                is_trigger: c.is_trigger,
                shape: c.shape.clone(),
            })
        })
        .collect();
    Some(BodyAggregate { body, parts })
}

/// Contact events reported by the physics collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionEvent {
    /// Contact with another collider began
    CollisionEnter,
    /// Contact with another collider ended
    CollisionExit,
    /// Another collider entered a trigger volume
    TriggerEnter,
    /// Another collider left a trigger volume
    TriggerExit,
}

/// Deliver a contact event to every script on `entity`
///
/// Disabled script hosts are skipped; non-script components are untouched.
pub fn notify(entity: &EntityRef, event: CollisionEvent, other: &EntityRef) {
    for slot in entity.component_slots() {
        if slot.kind != ComponentKind::Script {
            continue;
        }
        let mut guard = slot.cell.lock().unwrap();
        if let Some(host) = guard.as_any_mut().downcast_mut::<ScriptHost>() {
            host.notify_collision(entity, event, other);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::entity::Entity;

    #[test]
    fn test_aggregate_requires_a_rigid_body() {
        let entity = Entity::new("shapeless");
        entity.add_component(Collider::sphere(1.0));
        assert!(aggregate_body(&entity).is_none());
    }

    #[test]
    fn test_aggregate_compounds_all_colliders() {
        let entity = Entity::new("body");
        entity.add_component(RigidBody::new(2.0));
        entity.add_component(Collider::sphere(0.5));
        entity.add_component(
            Collider::cuboid(Vec3::new(1.0, 1.0, 1.0)).with_offset(Vec3::new(0.0, 2.0, 0.0)),
        );

        let aggregate = aggregate_body(&entity).unwrap();
        assert!((aggregate.body.mass - 2.0).abs() < f32::EPSILON);
        assert_eq!(aggregate.parts.len(), 2);
        assert!(matches!(
            aggregate.parts[0].shape,
            ColliderShape::Sphere { .. }
        ));
        assert!((aggregate.parts[1].offset.y - 2.0).abs() < f32::EPSILON);
    }
}
