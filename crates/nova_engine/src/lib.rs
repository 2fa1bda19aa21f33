//! # Nova Engine
//!
//! A scene-graph engine core: hierarchical entities carrying ordered
//! components, driven through a per-tick lifecycle by an external frame
//! loop.
//!
//! ## Features
//!
//! - **Entity hierarchy**: thread-safe parent/child edits with
//!   snapshot-based traversal
//! - **Ordered components**: fixed category order, Behaviour enable/disable
//!   semantics, runtime-typed queries
//! - **Scripts**: user per-tick logic, collision callbacks, and a
//!   single-flight task sequencer per script
//! - **Scenes**: tick-driven lifecycle with one-tick start deferral and an
//!   explicit shared-instance registry
//! - **Search**: predicate-based find/find-all over the hierarchy
//! - **Collaborator boundaries**: renderer, physics, audio, and input stay
//!   behind narrow traits
//!
//! ## Quick Start
//!
//! ```rust
//! use nova_engine::prelude::*;
//!
//! let registry = SceneRegistry::new();
//! let scene = Scene::new(&SceneSettings::default());
//! registry.install(scene.clone());
//!
//! let player = Entity::new("Player");
//! scene.add_entity(&player);
//!
//! scene.tick(0.0);     // baseline
//! scene.tick(0.016);   // start deferral
//! scene.tick(0.032);   // player starts and updates
//! assert!(player.is_started());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod audio;
pub mod core;
pub mod foundation;
pub mod input;
pub mod physics;
pub mod render;
pub mod scene;
pub mod spatial;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        audio::{AudioBuffer, AudioSink},
        core::config::{ConfigError, EngineSettings, SceneSettings},
        foundation::{
            math::{Mat4, Quat, Transform, Vec2, Vec3},
            time::Timer,
        },
        input::{InputSource, KeyCode, MouseButton, NullInput},
        physics::{aggregate_body, ColliderShape, CollisionEvent},
        render::{Material, Mesh, RenderBackend},
        scene::{
            components::{
                AudioSource, Camera, Collider, Light, LightKind, MeshRenderer, Placement,
                Projection, RigidBody,
            },
            Behaviour, Component, ComponentKind, ComponentRef, Context, Entity, EntityId,
            EntityRef, LayerMask, LayerRegistry, Phase, Scene, SceneRegistry, Script, ScriptCtx,
            ScriptRef, SearchFilter, Sequencer, Tag, Task,
        },
        spatial::{Aabb, NodeHandle, SpatialNode, TransformNode},
    };
}
