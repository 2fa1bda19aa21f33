//! Scene hierarchy core
//!
//! Hierarchical entities carrying ordered components, driven through a
//! per-tick lifecycle (awake → start → pre-update → update → fixed-update)
//! with hierarchical activation, thread-safe hierarchy edits, and
//! predicate-based search.

pub mod component;
pub mod components;
pub mod dispatch;
pub mod entity;
pub mod layers;
pub mod scene;
pub mod script;
pub mod search;
pub mod sequencer;

#[cfg(test)]
mod tests;

pub use component::{Behaviour, Component, ComponentKind, ComponentRef, Context, Phase};
pub use entity::{Entity, EntityId, EntityRef, Tag};
pub use layers::{LayerMask, LayerRegistry};
pub use scene::{Scene, SceneId, SceneRegistry, Services};
pub use script::{Script, ScriptCtx, ScriptHost, ScriptRef};
pub use search::{find, find_all, NameMatch, SearchFilter};
pub use sequencer::{ExecutionMode, Sequencer, Task};
