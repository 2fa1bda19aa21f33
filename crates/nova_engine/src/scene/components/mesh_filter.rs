//! Geometry filter component
//!
//! Reserved kind: created through `Entity::with_geometry`, not the public
//! add-component entry point.

use std::any::Any;
use std::sync::Arc;

use crate::render::Mesh;
use crate::scene::component::{Component, ComponentKind, Context};
use crate::spatial::{NodeHandle, NodePayload, PayloadKind};

/// Carries the renderable mesh and publishes it as the node's geometry
/// payload, together with the node's local bounds
pub struct MeshFilter {
    /// Geometry descriptor
    pub mesh: Mesh,
    node: Option<NodeHandle>,
}

impl MeshFilter {
    pub(crate) fn new(mesh: Mesh) -> Self {
        Self { mesh, node: None }
    }
}

impl Component for MeshFilter {
    fn kind(&self) -> ComponentKind {
        ComponentKind::MeshFilter
    }

    fn awake(&mut self, ctx: &Context<'_>) {
        let node = Arc::clone(ctx.entity.node());
        node.set_local_bounds(Some(self.mesh.local_bounds));
        node.attach_payload(NodePayload::Geometry(self.mesh.clone()));
        self.node = Some(node);
    }

    fn on_destroy(&mut self) {
        if let Some(node) = self.node.take() {
            node.detach_payload(PayloadKind::Geometry);
            node.set_local_bounds(None);
        }
    }

    fn duplicate(&self) -> Option<Box<dyn Component>> {
        Some(Box::new(Self::new(self.mesh.clone())))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
