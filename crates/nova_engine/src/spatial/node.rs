//! Spatial node contract and the default in-memory implementation
//!
//! The entity hierarchy mirrors its structure 1:1 onto spatial nodes:
//! every `add_child`/`remove_child` on an entity attaches/detaches the
//! corresponding nodes. Backends implement [`SpatialNode`] to receive that
//! structure; the core itself only relies on the contract below.

use std::any::Any;
use std::sync::{Arc, RwLock, Weak};

use crate::foundation::math::{Quat, Transform, Vec3};
use crate::render::Mesh;
use crate::spatial::Aabb;

/// Shared handle to an opaque spatial node
pub type NodeHandle = Arc<dyn SpatialNode>;

/// Payload attached to a spatial node
///
/// At most one payload of each kind is attached at a time; attaching a
/// second replaces the first.
#[derive(Debug, Clone)]
pub enum NodePayload {
    /// Renderable geometry with its local-space bounds
    Geometry(Mesh),
    /// A camera views the scene from this node
    Camera,
    /// A light illuminates the scene from this node
    Light,
}

impl NodePayload {
    /// The kind slot this payload occupies
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Geometry(_) => PayloadKind::Geometry,
            Self::Camera => PayloadKind::Camera,
            Self::Light => PayloadKind::Light,
        }
    }
}

/// Payload slot discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Geometry slot
    Geometry,
    /// Camera slot
    Camera,
    /// Light slot
    Light,
}

/// Contract every spatial backend node fulfills
///
/// All methods take `&self`; implementations are expected to use interior
/// mutability since handles are shared between the entity and its backend.
pub trait SpatialNode: Any + Send + Sync {
    /// Local-space position relative to the parent node
    fn local_position(&self) -> Vec3;
    /// Set the local-space position
    fn set_local_position(&self, position: Vec3);

    /// Local-space orientation relative to the parent node
    fn local_rotation(&self) -> Quat;
    /// Set the local-space orientation
    fn set_local_rotation(&self, rotation: Quat);

    /// Local-space scale relative to the parent node
    fn local_scale(&self) -> Vec3;
    /// Set the local-space scale
    fn set_local_scale(&self, scale: Vec3);

    /// World-space transform accumulated through the parent chain
    fn world_transform(&self) -> Transform;

    /// Attach a child node; no-op if already attached
    fn attach_child(&self, child: NodeHandle);
    /// Detach a child node by identity; no-op if absent
    fn detach_child(&self, child: &NodeHandle);
    /// Snapshot of the current child nodes
    fn children(&self) -> Vec<NodeHandle>;

    /// Set the local-space bounding volume (usually from attached geometry)
    fn set_local_bounds(&self, bounds: Option<Aabb>);
    /// World-space bounding volume, if any geometry bounds are known
    fn world_bounds(&self) -> Option<Aabb>;

    /// Attach a payload, replacing any existing payload of the same kind
    fn attach_payload(&self, payload: NodePayload);
    /// Detach the payload of the given kind; no-op if absent
    fn detach_payload(&self, kind: PayloadKind);
    /// Whether a payload of the given kind is attached
    fn has_payload(&self, kind: PayloadKind) -> bool;

    /// Upcast for backend-specific downcasting
    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Default in-memory spatial node
///
/// Pure math implementation with no backend attached. Keeps local TRS,
/// parent/child links, and payload slots so the hierarchy is fully
/// exercisable headless.
pub struct TransformNode {
    self_weak: Weak<TransformNode>,
    local: RwLock<Transform>,
    parent: RwLock<Weak<TransformNode>>,
    children: RwLock<Vec<Arc<TransformNode>>>,
    local_bounds: RwLock<Option<Aabb>>,
    payloads: RwLock<Vec<NodePayload>>,
}

impl TransformNode {
    /// Create a detached node at the origin
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            self_weak: weak.clone(),
            local: RwLock::new(Transform::identity()),
            parent: RwLock::new(Weak::new()),
            children: RwLock::new(Vec::new()),
            local_bounds: RwLock::new(None),
            payloads: RwLock::new(Vec::new()),
        })
    }

    /// Create a detached node with an initial local transform
    pub fn with_transform(local: Transform) -> Arc<Self> {
        let node = Self::new();
        *node.local.write().unwrap() = local;
        node
    }

    /// Snapshot of the local transform
    pub fn local_transform(&self) -> Transform {
        self.local.read().unwrap().clone()
    }

    fn downcast(handle: NodeHandle) -> Option<Arc<TransformNode>> {
        handle.as_any_arc().downcast::<TransformNode>().ok()
    }
}

impl SpatialNode for TransformNode {
    fn local_position(&self) -> Vec3 {
        self.local.read().unwrap().position
    }

    fn set_local_position(&self, position: Vec3) {
        self.local.write().unwrap().position = position;
    }

    fn local_rotation(&self) -> Quat {
        self.local.read().unwrap().rotation
    }

    fn set_local_rotation(&self, rotation: Quat) {
        self.local.write().unwrap().rotation = rotation;
    }

    fn local_scale(&self) -> Vec3 {
        self.local.read().unwrap().scale
    }

    fn set_local_scale(&self, scale: Vec3) {
        self.local.write().unwrap().scale = scale;
    }

    fn world_transform(&self) -> Transform {
        let local = self.local_transform();
        match self.parent.read().unwrap().upgrade() {
            Some(parent) => parent.world_transform().combine(&local),
            None => local,
        }
    }

    fn attach_child(&self, child: NodeHandle) {
        let Some(child) = Self::downcast(child) else {
            log::warn!("TransformNode can only parent other TransformNodes; ignoring attach");
            return;
        };
        {
            let mut children = self.children.write().unwrap();
            if children.iter().any(|c| Arc::ptr_eq(c, &child)) {
                return;
            }
            children.push(Arc::clone(&child));
        }
        // Weak back-reference: ownership flows strictly downward.
        *child.parent.write().unwrap() = self.self_weak.clone();
    }

    fn detach_child(&self, child: &NodeHandle) {
        let Some(child) = Self::downcast(Arc::clone(child)) else {
            return;
        };
        let mut children = self.children.write().unwrap();
        if let Some(index) = children.iter().position(|c| Arc::ptr_eq(c, &child)) {
            children.remove(index);
            *child.parent.write().unwrap() = Weak::new();
        }
    }

    fn children(&self) -> Vec<NodeHandle> {
        self.children
            .read()
            .unwrap()
            .iter()
            .map(|c| Arc::clone(c) as NodeHandle)
            .collect()
    }

    fn set_local_bounds(&self, bounds: Option<Aabb>) {
        *self.local_bounds.write().unwrap() = bounds;
    }

    fn world_bounds(&self) -> Option<Aabb> {
        let bounds = (*self.local_bounds.read().unwrap())?;
        Some(bounds.transformed(&self.world_transform()))
    }

    fn attach_payload(&self, payload: NodePayload) {
        let mut payloads = self.payloads.write().unwrap();
        payloads.retain(|p| p.kind() != payload.kind());
        payloads.push(payload);
    }

    fn detach_payload(&self, kind: PayloadKind) {
        self.payloads.write().unwrap().retain(|p| p.kind() != kind);
    }

    fn has_payload(&self, kind: PayloadKind) -> bool {
        self.payloads.read().unwrap().iter().any(|p| p.kind() == kind)
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
