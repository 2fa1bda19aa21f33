//! Light component

use std::any::Any;
use std::sync::Arc;

use crate::foundation::math::Vec3;
use crate::scene::component::{Behaviour, Component, ComponentKind, Context};
use crate::spatial::{NodeHandle, NodePayload, PayloadKind};

/// Light source variants
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Parallel rays along the entity's forward axis
    Directional,
    /// Omnidirectional with a falloff range
    Point {
        /// Falloff range in world units
        range: f32,
    },
    /// Cone along the forward axis
    Spot {
        /// Falloff range in world units
        range: f32,
        /// Full cone angle in degrees
        angle_degrees: f32,
    },
}

/// Behaviour-kind component emitting light from its entity
#[derive(Clone)]
pub struct Light {
    behaviour: Behaviour,
    /// Light variant and falloff parameters
    pub kind: LightKind,
    /// Linear RGB color
    pub color: Vec3,
    /// Intensity multiplier
    pub intensity: f32,
    node: Option<NodeHandle>,
}

impl Light {
    /// Directional white light
    pub fn directional() -> Self {
        Self {
            behaviour: Behaviour::new(),
            kind: LightKind::Directional,
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
            node: None,
        }
    }

    /// Point light with the given range
    pub fn point(range: f32) -> Self {
        Self {
            kind: LightKind::Point { range },
            ..Self::directional()
        }
    }

    /// Builder pattern: set the color
    pub fn with_color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.color = Vec3::new(r, g, b);
        self
    }

    /// Builder pattern: set the intensity
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }
}

impl Component for Light {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Light
    }

    fn awake(&mut self, ctx: &Context<'_>) {
        let node = Arc::clone(ctx.entity.node());
        node.attach_payload(NodePayload::Light);
        self.node = Some(node);
    }

    fn on_destroy(&mut self) {
        if let Some(node) = self.node.take() {
            node.detach_payload(PayloadKind::Light);
        }
    }

    fn behaviour(&self) -> Option<&Behaviour> {
        Some(&self.behaviour)
    }

    fn behaviour_mut(&mut self) -> Option<&mut Behaviour> {
        Some(&mut self.behaviour)
    }

    fn duplicate(&self) -> Option<Box<dyn Component>> {
        let mut clone = self.clone();
        clone.node = None;
        Some(Box::new(clone))
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

    #[test]
    fn test_light_attaches_node_payload() {
        let entity = Entity::new("sun");
        entity.add_component(Light::directional().with_intensity(2.0));
        assert!(entity.node().has_payload(PayloadKind::Light));
    }

    #[test]
    fn test_point_light_keeps_range() {
        let light = Light::point(15.0).with_color(1.0, 0.5, 0.2);
        assert!(matches!(light.kind, LightKind::Point { range } if (range - 15.0).abs() < f32::EPSILON));
    }
}
