//! Camera component

use std::any::Any;
use std::sync::Arc;

use crate::scene::component::{Behaviour, Component, ComponentKind, Context};
use crate::spatial::{NodeHandle, NodePayload, PayloadKind};

/// Camera projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective projection
    Perspective {
        /// Vertical field of view in degrees
        fov_y_degrees: f32,
        /// Near clip distance
        near: f32,
        /// Far clip distance
        far: f32,
    },
    /// Orthographic projection
    Orthographic {
        /// Vertical view height in world units
        height: f32,
        /// Near clip distance
        near: f32,
        /// Far clip distance
        far: f32,
    },
}

impl Default for Projection {
    fn default() -> Self {
        Self::Perspective {
            fov_y_degrees: 60.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Behaviour-kind component marking its entity as a viewpoint
///
/// Attaches a camera payload to the entity's spatial node; projection math
/// is the renderer collaborator's concern.
#[derive(Default)]
pub struct Camera {
    behaviour: Behaviour,
    /// Projection parameters consumed by the renderer
    pub projection: Projection,
    node: Option<NodeHandle>,
}

impl Camera {
    /// Camera with default perspective projection
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: set the projection
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }
}

impl Component for Camera {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Camera
    }

    fn awake(&mut self, ctx: &Context<'_>) {
        let node = Arc::clone(ctx.entity.node());
        node.attach_payload(NodePayload::Camera);
        self.node = Some(node);
    }

    fn on_destroy(&mut self) {
        if let Some(node) = self.node.take() {
            node.detach_payload(PayloadKind::Camera);
        }
    }

    fn behaviour(&self) -> Option<&Behaviour> {
        Some(&self.behaviour)
    }

    fn behaviour_mut(&mut self) -> Option<&mut Behaviour> {
        Some(&mut self.behaviour)
    }

    fn duplicate(&self) -> Option<Box<dyn Component>> {
        Some(Box::new(Self {
            behaviour: self.behaviour.clone(),
            projection: self.projection,
            node: None,
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
