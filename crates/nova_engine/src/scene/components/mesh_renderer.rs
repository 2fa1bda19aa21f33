//! Mesh renderer component
//!
//! Reserved kind: created through `Entity::with_geometry`, not the public
//! add-component entry point. The renderer collaborator reads the entity's
//! geometry payload, this component's material list, and the world bounds
//! cached here during the post-update pass.

use std::any::Any;

use crate::render::Material;
use crate::scene::component::{Component, ComponentKind, Context, Phase};
use crate::spatial::Aabb;

/// Visual output descriptor for one entity
pub struct MeshRenderer {
    /// Materials, one per submesh slot
    pub materials: Vec<Material>,
    /// Whether this geometry casts shadows; seeded from the scene policy
    pub cast_shadows: bool,
    world_bounds: Option<Aabb>,
}

impl MeshRenderer {
    pub(crate) fn new(materials: Vec<Material>) -> Self {
        Self {
            materials,
            cast_shadows: true,
            world_bounds: None,
        }
    }

    /// World bounds cached by the last post-update pass, for culling
    pub fn world_bounds(&self) -> Option<Aabb> {
        self.world_bounds
    }
}

impl Component for MeshRenderer {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Renderer
    }

    fn phases(&self) -> Phase {
        Phase::POST_UPDATE
    }

    fn post_update(&mut self, ctx: &Context<'_>) {
        self.world_bounds = ctx.entity.node().world_bounds();
    }

    fn duplicate(&self) -> Option<Box<dyn Component>> {
        Some(Box::new(Self {
            materials: self.materials.clone(),
            cast_shadows: self.cast_shadows,
            world_bounds: None,
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
