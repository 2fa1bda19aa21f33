//! Spatial backend boundary
//!
//! Every entity wraps exactly one opaque spatial node. The node contract is
//! defined here; concrete renderer-backed implementations live outside the
//! core. [`TransformNode`] is the default in-memory implementation so the
//! hierarchy is fully usable (and testable) without a renderer attached.

pub mod bounds;
pub mod node;

pub use bounds::Aabb;
pub use node::{NodeHandle, NodePayload, PayloadKind, SpatialNode, TransformNode};
