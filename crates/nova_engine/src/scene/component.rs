//! Component trait and runtime-typed component access
//!
//! Components are attached to exactly one entity and visited in a fixed
//! category order. The entity drives every lifecycle hook; components never
//! call each other directly.

use std::any::Any;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, Weak};

use bitflags::bitflags;

use crate::scene::entity::{Entity, EntityRef};

bitflags! {
    /// Per-tick phases a component declares it implements
    ///
    /// The entity checks the mask before invoking a hook so empty default
    /// overrides are never called during the cascade.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Phase: u8 {
        /// `pre_update` runs before the frame's update pass
        const PRE_UPDATE = 1 << 0;
        /// `update` runs once per tick
        const UPDATE = 1 << 1;
        /// `fixed_update` runs at the driver's fixed cadence
        const FIXED_UPDATE = 1 << 2;
        /// `post_update` runs in the internal pass after update
        const POST_UPDATE = 1 << 3;
    }
}

/// Component categories
///
/// The variant tag defines the ordering key used to keep every entity's
/// component list sorted; insertion order breaks ties within a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Spatial placement; exactly one per entity, created at construction
    Placement,
    /// Camera viewing the scene from this entity
    Camera,
    /// Light source
    Light,
    /// Geometry filter carrying the renderable mesh
    MeshFilter,
    /// Renderer consuming the geometry payload and materials
    Renderer,
    /// UI canvas root
    Canvas,
    /// Rigid-body descriptor for the physics collaborator
    RigidBody,
    /// Collision shape descriptor
    Collider,
    /// Vehicle/constraint descriptor
    Vehicle,
    /// Generic script logic
    Script,
}

impl ComponentKind {
    /// Fixed ordering key within an entity's component list
    pub fn order_key(self) -> u8 {
        match self {
            Self::Placement => 0,
            Self::Camera | Self::Light | Self::MeshFilter => 1,
            Self::Renderer | Self::Canvas => 2,
            Self::RigidBody => 3,
            Self::Collider => 4,
            Self::Vehicle => 5,
            Self::Script => 6,
        }
    }

    /// Whether this kind can only be created through the entity's internal
    /// initialization path
    ///
    /// Passing a reserved kind to the public add-component entry point is a
    /// contract violation and aborts.
    pub fn is_reserved(self) -> bool {
        matches!(
            self,
            Self::Placement | Self::Renderer | Self::MeshFilter | Self::Canvas
        )
    }
}

/// Call context handed to every component lifecycle hook
pub struct Context<'a> {
    /// Entity the component is attached to
    pub entity: &'a EntityRef,

    /// Scaled delta seconds for per-tick hooks; zero for awake/start and
    /// enable/disable notifications
    pub delta: f32,
}

impl<'a> Context<'a> {
    pub(crate) fn new(entity: &'a EntityRef, delta: f32) -> Self {
        Self { entity, delta }
    }
}

/// Enabled-flag state for Behaviour-kind components
///
/// Components embed this and expose it through [`Component::behaviour`];
/// the entity flips it when its own activity toggles, and typed handles
/// flip it on request. Transitions notify `on_enable`/`on_disable` exactly
/// once; re-setting the same value is a no-op.
#[derive(Debug, Clone)]
pub struct Behaviour {
    pub(crate) enabled: bool,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self::new()
    }
}

impl Behaviour {
    /// Enabled state, the default
    pub fn new() -> Self {
        Self { enabled: true }
    }

    /// Disabled state
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    /// Whether the component currently receives per-tick hooks
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Unit of behavior attached to exactly one entity
///
/// All hooks are empty by default; concrete components override the ones
/// they implement and declare the per-tick ones in [`Component::phases`].
pub trait Component: Any + Send {
    /// Category of this component, fixing its position in the entity's list
    fn kind(&self) -> ComponentKind;

    /// Per-tick phases this component implements
    fn phases(&self) -> Phase {
        Phase::empty()
    }

    /// Called exactly once when the component is attached
    fn awake(&mut self, _ctx: &Context<'_>) {}

    /// Called once before the first tick the component takes part in
    fn start(&mut self, _ctx: &Context<'_>) {}

    /// Early per-tick hook
    fn pre_update(&mut self, _ctx: &Context<'_>) {}

    /// Main per-tick hook
    fn update(&mut self, _ctx: &Context<'_>) {}

    /// Fixed-cadence hook; `ctx.delta` carries the fixed timestep
    fn fixed_update(&mut self, _ctx: &Context<'_>) {}

    /// Internal pass after update; transform/bounds flushing lives here
    fn post_update(&mut self, _ctx: &Context<'_>) {}

    /// Notification that the enabled flag flipped to true
    fn on_enable(&mut self, _ctx: &Context<'_>) {}

    /// Notification that the enabled flag flipped to false
    fn on_disable(&mut self, _ctx: &Context<'_>) {}

    /// Teardown before the component is detached or its entity destroyed
    fn on_destroy(&mut self) {}

    /// Enabled-flag state, if this is a Behaviour-kind component
    fn behaviour(&self) -> Option<&Behaviour> {
        None
    }

    /// Mutable enabled-flag state, if this is a Behaviour-kind component
    fn behaviour_mut(&mut self) -> Option<&mut Behaviour> {
        None
    }

    /// Clone support for `Entity::instantiate`
    ///
    /// Components returning `None` are dropped from clones.
    fn duplicate(&self) -> Option<Box<dyn Component>> {
        None
    }

    /// Runtime-typed access
    fn as_any(&self) -> &dyn Any;

    /// Runtime-typed mutable access
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Shared erased component cell
pub(crate) type ComponentCell = Arc<Mutex<Box<dyn Component>>>;

/// Typed handle to a component living on some entity
///
/// Access is closure-scoped so the internal lock is never held across user
/// code boundaries longer than one call.
pub struct ComponentRef<T> {
    owner: Weak<Entity>,
    cell: ComponentCell,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for ComponentRef<T> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            cell: Arc::clone(&self.cell),
            _marker: PhantomData,
        }
    }
}

impl<T: Component> ComponentRef<T> {
    pub(crate) fn new(owner: Weak<Entity>, cell: ComponentCell) -> Self {
        Self {
            owner,
            cell,
            _marker: PhantomData,
        }
    }

    /// Entity this component is attached to, if still alive
    pub fn owner(&self) -> Option<EntityRef> {
        self.owner.upgrade()
    }

    /// Read access to the component
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.cell.lock().unwrap();
        f(guard
            .as_any()
            .downcast_ref::<T>()
            .expect("component handle type mismatch"))
    }

    /// Write access to the component
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.cell.lock().unwrap();
        f(guard
            .as_any_mut()
            .downcast_mut::<T>()
            .expect("component handle type mismatch"))
    }

    /// Whether the component is enabled (non-Behaviour components always are)
    pub fn is_enabled(&self) -> bool {
        let guard = self.cell.lock().unwrap();
        guard.behaviour().map_or(true, Behaviour::is_enabled)
    }

    /// Flip the enabled flag with transition notification
    ///
    /// No-op for non-Behaviour components and for re-setting the current
    /// value.
    pub fn set_enabled(&self, enabled: bool) {
        let owner = self.owner.upgrade();
        let mut guard = self.cell.lock().unwrap();
        let Some(state) = guard.behaviour_mut() else {
            return;
        };
        if state.enabled == enabled {
            return;
        }
        state.enabled = enabled;
        if let Some(owner) = owner.as_ref() {
            let ctx = Context::new(owner, 0.0);
            if enabled {
                guard.on_enable(&ctx);
            } else {
                guard.on_disable(&ctx);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_order_matches_spec() {
        let order = [
            ComponentKind::Placement,
            ComponentKind::Camera,
            ComponentKind::Renderer,
            ComponentKind::RigidBody,
            ComponentKind::Collider,
            ComponentKind::Vehicle,
            ComponentKind::Script,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].order_key() < pair[1].order_key());
        }
        assert_eq!(
            ComponentKind::Camera.order_key(),
            ComponentKind::Light.order_key()
        );
    }

    #[test]
    fn test_reserved_kinds() {
        assert!(ComponentKind::Placement.is_reserved());
        assert!(ComponentKind::Renderer.is_reserved());
        assert!(ComponentKind::MeshFilter.is_reserved());
        assert!(ComponentKind::Canvas.is_reserved());
        assert!(!ComponentKind::Script.is_reserved());
        assert!(!ComponentKind::Collider.is_reserved());
    }

    #[test]
    fn test_behaviour_defaults_enabled() {
        assert!(Behaviour::new().is_enabled());
        assert!(!Behaviour::disabled().is_enabled());
    }
}
