//! Rigid-body descriptor component
//!
//! Pure data for the physics collaborator; integration happens outside
//! this crate.

use std::any::Any;

use crate::scene::component::{Component, ComponentKind};

/// Dynamics descriptor aggregated with the entity's colliders on demand
#[derive(Debug, Clone)]
pub struct RigidBody {
    /// Mass in kilograms
    pub mass: f32,
    /// Kinematic bodies are driven by placement, not by forces
    pub kinematic: bool,
    /// Whether gravity applies
    pub use_gravity: bool,
    /// Linear velocity damping factor
    pub linear_damping: f32,
    /// Angular velocity damping factor
    pub angular_damping: f32,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            mass: 1.0,
            kinematic: false,
            use_gravity: true,
            linear_damping: 0.0,
            angular_damping: 0.05,
        }
    }
}

impl RigidBody {
    /// Dynamic body with the given mass
    pub fn new(mass: f32) -> Self {
        Self {
            mass,
            ..Default::default()
        }
    }

    /// Builder pattern: mark the body kinematic
    pub fn kinematic(mut self) -> Self {
        self.kinematic = true;
        self
    }

    /// Builder pattern: disable gravity
    pub fn without_gravity(mut self) -> Self {
        self.use_gravity = false;
        self
    }
}

impl Component for RigidBody {
    fn kind(&self) -> ComponentKind {
        ComponentKind::RigidBody
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
