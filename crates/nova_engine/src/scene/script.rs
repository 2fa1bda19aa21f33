//! User script components
//!
//! User logic implements [`Script`]; the entity stores it wrapped in a
//! [`ScriptHost`], the concrete Behaviour-kind component that owns the
//! enabled flag and the task sequencer. The physics collaborator reaches
//! scripts through the host's collision notification entry point.

use std::any::Any;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use crate::physics::CollisionEvent;
use crate::scene::component::{
    Behaviour, Component, ComponentCell, ComponentKind, ComponentRef, Context, Phase,
};
use crate::scene::entity::{Entity, EntityRef};
use crate::scene::sequencer::Sequencer;

/// Call context handed to every script hook
pub struct ScriptCtx<'a> {
    /// Entity the script is attached to
    pub entity: &'a EntityRef,

    /// Scaled delta seconds for per-tick hooks; zero elsewhere
    pub delta: f32,

    /// The script's own task sequencer
    pub sequencer: &'a mut Sequencer,
}

impl ScriptCtx<'_> {
    /// Find a component of type `C` on the nearest ancestor carrying one
    ///
    /// Scripts written against a structural guarantee (for example a wheel
    /// under a vehicle body) use this instead of hand-rolled parent walks.
    ///
    /// # Panics
    ///
    /// Missing the required ancestor is a contract violation and aborts.
    pub fn require_ancestor_component<C: Component>(&self) -> ComponentRef<C> {
        let mut current = self.entity.parent();
        while let Some(ancestor) = current {
            if let Some(found) = ancestor.get_component::<C>() {
                return found;
            }
            current = ancestor.parent();
        }
        panic!(
            "script on entity {} requires an ancestor with {}",
            self.entity.id(),
            std::any::type_name::<C>()
        );
    }
}

/// User-defined per-tick logic with collision callbacks and a sequencer
///
/// All hooks are empty by default. Scripts declare the per-tick phases they
/// implement through [`Script::phases`]; the default is `UPDATE`.
pub trait Script: Any + Send {
    /// Per-tick phases this script implements
    fn phases(&self) -> Phase {
        Phase::UPDATE
    }

    /// Called exactly once when the host component is attached
    fn awake(&mut self, _ctx: &mut ScriptCtx<'_>) {}

    /// Called once before the first tick the script takes part in
    fn start(&mut self, _ctx: &mut ScriptCtx<'_>) {}

    /// Early per-tick hook
    fn pre_update(&mut self, _ctx: &mut ScriptCtx<'_>) {}

    /// Main per-tick hook
    fn update(&mut self, _ctx: &mut ScriptCtx<'_>) {}

    /// Fixed-cadence hook; `ctx.delta` carries the fixed timestep
    fn fixed_update(&mut self, _ctx: &mut ScriptCtx<'_>) {}

    /// Notification that the host was enabled
    fn on_enable(&mut self, _ctx: &mut ScriptCtx<'_>) {}

    /// Notification that the host was disabled
    fn on_disable(&mut self, _ctx: &mut ScriptCtx<'_>) {}

    /// Teardown before the host is detached or its entity destroyed
    fn on_destroy(&mut self) {}

    /// Physics callback: contact with `other` began
    fn on_collision_enter(&mut self, _ctx: &mut ScriptCtx<'_>, _other: &EntityRef) {}

    /// Physics callback: contact with `other` ended
    fn on_collision_exit(&mut self, _ctx: &mut ScriptCtx<'_>, _other: &EntityRef) {}

    /// Physics callback: `other` entered a trigger volume
    fn on_trigger_enter(&mut self, _ctx: &mut ScriptCtx<'_>, _other: &EntityRef) {}

    /// Physics callback: `other` left a trigger volume
    fn on_trigger_exit(&mut self, _ctx: &mut ScriptCtx<'_>, _other: &EntityRef) {}

    /// Clone support for `Entity::instantiate`
    ///
    /// Returns a fresh default-constructed instance; state is never copied,
    /// only type identity. Scripts returning `None` are dropped from clones.
    fn instantiate(&self) -> Option<Box<dyn Script>> {
        None
    }

    /// Runtime-typed access
    fn as_any(&self) -> &dyn Any;

    /// Runtime-typed mutable access
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Component hosting one user script
///
/// Owns the Behaviour enabled flag and the script's sequencer. The
/// sequencer is polled on the update visit, before the script's own
/// `update` hook, so entries enqueued during a hook are first checked on
/// the following tick.
pub struct ScriptHost {
    behaviour: Behaviour,
    sequencer: Sequencer,
    script: Box<dyn Script>,
}

impl ScriptHost {
    /// Wrap a script for attachment
    pub fn new(script: impl Script) -> Self {
        Self::from_boxed(Box::new(script))
    }

    pub(crate) fn from_boxed(script: Box<dyn Script>) -> Self {
        Self {
            behaviour: Behaviour::new(),
            sequencer: Sequencer::new(),
            script,
        }
    }

    pub(crate) fn script_is<S: Script>(&self) -> bool {
        self.script.as_any().is::<S>()
    }

    pub(crate) fn script_ref<S: Script>(&self) -> &S {
        self.script
            .as_any()
            .downcast_ref::<S>()
            .expect("script handle type mismatch")
    }

    pub(crate) fn script_parts_mut<S: Script>(&mut self) -> (&mut S, &mut Sequencer) {
        (
            self.script
                .as_any_mut()
                .downcast_mut::<S>()
                .expect("script handle type mismatch"),
            &mut self.sequencer,
        )
    }

    /// Deliver a physics callback to the script
    ///
    /// Skipped while the host is disabled.
    pub(crate) fn notify_collision(
        &mut self,
        entity: &EntityRef,
        event: CollisionEvent,
        other: &EntityRef,
    ) {
        if !self.behaviour.enabled {
            return;
        }
        let mut ctx = ScriptCtx {
            entity,
            delta: 0.0,
            sequencer: &mut self.sequencer,
        };
        match event {
            CollisionEvent::CollisionEnter => self.script.on_collision_enter(&mut ctx, other),
            CollisionEvent::CollisionExit => self.script.on_collision_exit(&mut ctx, other),
            CollisionEvent::TriggerEnter => self.script.on_trigger_enter(&mut ctx, other),
            CollisionEvent::TriggerExit => self.script.on_trigger_exit(&mut ctx, other),
        }
    }
}

impl Component for ScriptHost {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Script
    }

    fn phases(&self) -> Phase {
        // The update visit always happens: it drives the sequencer even
        // when the script itself implements no per-tick logic.
        self.script.phases() | Phase::UPDATE
    }

    fn awake(&mut self, ctx: &Context<'_>) {
        let mut script_ctx = ScriptCtx {
            entity: ctx.entity,
            delta: ctx.delta,
            sequencer: &mut self.sequencer,
        };
        self.script.awake(&mut script_ctx);
    }

    fn start(&mut self, ctx: &Context<'_>) {
        let mut script_ctx = ScriptCtx {
            entity: ctx.entity,
            delta: ctx.delta,
            sequencer: &mut self.sequencer,
        };
        self.script.start(&mut script_ctx);
    }

    fn pre_update(&mut self, ctx: &Context<'_>) {
        if self.script.phases().contains(Phase::PRE_UPDATE) {
            let mut script_ctx = ScriptCtx {
                entity: ctx.entity,
                delta: ctx.delta,
                sequencer: &mut self.sequencer,
            };
            self.script.pre_update(&mut script_ctx);
        }
    }

    fn update(&mut self, ctx: &Context<'_>) {
        self.sequencer.poll(ctx.delta);
        if self.script.phases().contains(Phase::UPDATE) {
            let mut script_ctx = ScriptCtx {
                entity: ctx.entity,
                delta: ctx.delta,
                sequencer: &mut self.sequencer,
            };
            self.script.update(&mut script_ctx);
        }
    }

    fn fixed_update(&mut self, ctx: &Context<'_>) {
        if self.script.phases().contains(Phase::FIXED_UPDATE) {
            let mut script_ctx = ScriptCtx {
                entity: ctx.entity,
                delta: ctx.delta,
                sequencer: &mut self.sequencer,
            };
            self.script.fixed_update(&mut script_ctx);
        }
    }

    fn on_enable(&mut self, ctx: &Context<'_>) {
        let mut script_ctx = ScriptCtx {
            entity: ctx.entity,
            delta: 0.0,
            sequencer: &mut self.sequencer,
        };
        self.script.on_enable(&mut script_ctx);
    }

    fn on_disable(&mut self, ctx: &Context<'_>) {
        let mut script_ctx = ScriptCtx {
            entity: ctx.entity,
            delta: 0.0,
            sequencer: &mut self.sequencer,
        };
        self.script.on_disable(&mut script_ctx);
    }

    fn on_destroy(&mut self) {
        self.sequencer.clear();
        self.script.on_destroy();
    }

    fn behaviour(&self) -> Option<&Behaviour> {
        Some(&self.behaviour)
    }

    fn behaviour_mut(&mut self) -> Option<&mut Behaviour> {
        Some(&mut self.behaviour)
    }

    fn duplicate(&self) -> Option<Box<dyn Component>> {
        self.script
            .instantiate()
            .map(|fresh| Box::new(Self::from_boxed(fresh)) as Box<dyn Component>)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Typed handle to a script hosted on some entity
pub struct ScriptRef<S> {
    owner: Weak<Entity>,
    cell: ComponentCell,
    _marker: PhantomData<fn() -> S>,
}

impl<S> Clone for ScriptRef<S> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            cell: Arc::clone(&self.cell),
            _marker: PhantomData,
        }
    }
}

impl<S: Script> ScriptRef<S> {
    pub(crate) fn new(owner: Weak<Entity>, cell: ComponentCell) -> Self {
        Self {
            owner,
            cell,
            _marker: PhantomData,
        }
    }

    /// Entity this script is attached to, if still alive
    pub fn owner(&self) -> Option<EntityRef> {
        self.owner.upgrade()
    }

    /// Read access to the script
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let guard = self.cell.lock().unwrap();
        let host = guard
            .as_any()
            .downcast_ref::<ScriptHost>()
            .expect("script handle does not point at a script host");
        f(host.script_ref::<S>())
    }

    /// Write access to the script
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut guard = self.cell.lock().unwrap();
        let host = guard
            .as_any_mut()
            .downcast_mut::<ScriptHost>()
            .expect("script handle does not point at a script host");
        let (script, _) = host.script_parts_mut::<S>();
        f(script)
    }

    /// Whether the host Behaviour is enabled
    pub fn is_enabled(&self) -> bool {
        let guard = self.cell.lock().unwrap();
        guard.behaviour().map_or(true, Behaviour::is_enabled)
    }

    /// Flip the host's enabled flag with transition notification
    pub fn set_enabled(&self, enabled: bool) {
        ComponentRef::<ScriptHost>::new(self.owner.clone(), Arc::clone(&self.cell))
            .set_enabled(enabled);
    }
}
