//! Integration tests for the scene core
//!
//! Component- and entity-level mechanics are tested next to their modules;
//! these cover whole-scene behavior: tick timing, cascades across real
//! scripts, hierarchy edits under concurrency, and collaborator fan-out.

mod concurrency;

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::scene::component::Phase;
use crate::scene::script::{Script, ScriptCtx};

/// Script recording which hooks ran, shared across clones of the handle
#[derive(Default)]
pub(crate) struct Recorder {
    pub(crate) events: Arc<Mutex<Vec<String>>>,
    pub(crate) updates: Arc<AtomicUsize>,
}

impl Recorder {
    pub(crate) fn new(events: &Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            events: Arc::clone(events),
            updates: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn record(&self, event: &str) {
        self.events.lock().unwrap().push(event.to_owned());
    }
}

impl Script for Recorder {
    fn phases(&self) -> Phase {
        Phase::PRE_UPDATE | Phase::UPDATE | Phase::FIXED_UPDATE
    }

    fn awake(&mut self, _ctx: &mut ScriptCtx<'_>) {
        self.record("awake");
    }

    fn start(&mut self, _ctx: &mut ScriptCtx<'_>) {
        self.record("start");
    }

    fn pre_update(&mut self, _ctx: &mut ScriptCtx<'_>) {
        self.record("pre_update");
    }

    fn update(&mut self, _ctx: &mut ScriptCtx<'_>) {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.record("update");
    }

    fn fixed_update(&mut self, _ctx: &mut ScriptCtx<'_>) {
        self.record("fixed_update");
    }

    fn on_enable(&mut self, _ctx: &mut ScriptCtx<'_>) {
        self.record("on_enable");
    }

    fn on_disable(&mut self, _ctx: &mut ScriptCtx<'_>) {
        self.record("on_disable");
    }

    fn on_collision_enter(&mut self, _ctx: &mut ScriptCtx<'_>, other: &crate::scene::EntityRef) {
        self.record(&format!(
            "collision_enter:{}",
            other.name().unwrap_or_default()
        ));
    }

    fn on_trigger_exit(&mut self, _ctx: &mut ScriptCtx<'_>, other: &crate::scene::EntityRef) {
        self.record(&format!("trigger_exit:{}", other.name().unwrap_or_default()));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
