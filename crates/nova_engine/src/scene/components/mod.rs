//! Built-in components
//!
//! Pure data descriptors in front of the collaborator boundaries, plus the
//! placement every entity carries. Reserved kinds (placement, renderer,
//! mesh filter, canvas) are created through the entity's internal
//! initialization path only.

pub mod audio_source;
pub mod camera;
pub mod canvas;
pub mod collider;
pub mod light;
pub mod mesh_filter;
pub mod mesh_renderer;
pub mod placement;
pub mod rigid_body;

pub use audio_source::AudioSource;
pub use camera::{Camera, Projection};
pub use canvas::Canvas;
pub use collider::Collider;
pub use light::{Light, LightKind};
pub use mesh_filter::MeshFilter;
pub use mesh_renderer::MeshRenderer;
pub use placement::{OrientationConstraint, Placement};
pub use rigid_body::RigidBody;
