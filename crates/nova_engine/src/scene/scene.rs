//! Scene: owns the root entity and advances the per-tick clock
//!
//! An external driver calls [`Scene::tick`] once per frame with an absolute
//! timestamp; the scene computes the delta, applies the driver-controlled
//! time scale, and cascades the lifecycle into the root entity. The
//! pre-update and fixed-update passes are separate driver entry points so
//! they can run at their own cadence.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::audio::AudioSink;
use crate::core::config::SceneSettings;
use crate::input::{InputSource, NullInput};
use crate::scene::components::MeshRenderer;
use crate::scene::entity::{Entity, EntityRef};
use crate::scene::search::{self, SearchFilter};

static NEXT_SCENE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable scene identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneId(u64);

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scene#{}", self.0)
    }
}

/// Collaborator services scripts reach through their scene
///
/// The input poller and audio sink are injected by the driver; defaults
/// are inert so headless scenes never branch on a missing collaborator.
pub struct Services {
    input: RwLock<Arc<dyn InputSource>>,
    audio: RwLock<Option<Arc<dyn AudioSink>>>,
}

impl Services {
    fn new() -> Self {
        Self {
            input: RwLock::new(Arc::new(NullInput)),
            audio: RwLock::new(None),
        }
    }

    /// Current input poller
    pub fn input(&self) -> Arc<dyn InputSource> {
        Arc::clone(&self.input.read().unwrap())
    }

    /// Inject the input poller
    pub fn set_input(&self, input: Arc<dyn InputSource>) {
        *self.input.write().unwrap() = input;
    }

    /// Current audio sink, if any
    pub fn audio(&self) -> Option<Arc<dyn AudioSink>> {
        self.audio.read().unwrap().clone()
    }

    /// Inject the audio sink
    pub fn set_audio(&self, audio: Arc<dyn AudioSink>) {
        *self.audio.write().unwrap() = Some(audio);
    }
}

/// Root of one entity hierarchy, driven by an external tick
pub struct Scene {
    id: SceneId,
    root: EntityRef,
    cast_shadows: AtomicBool,
    time_scale: Mutex<f32>,
    last_time: Mutex<Option<f64>>,
    last_delta: Mutex<f32>,
    ticks: AtomicU64,
    services: Services,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.id)
            .field("ticks", &self.tick_count())
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Create an independent scene instance
    pub fn new(settings: &SceneSettings) -> Arc<Scene> {
        let scene = Arc::new_cyclic(|weak| {
            let root = Entity::new("Root");
            root.propagate_scene(weak.clone());
            Scene {
                id: SceneId(NEXT_SCENE_ID.fetch_add(1, Ordering::SeqCst)),
                root,
                cast_shadows: AtomicBool::new(settings.cast_shadows),
                time_scale: Mutex::new(settings.time_scale),
                last_time: Mutex::new(None),
                last_delta: Mutex::new(0.0),
                ticks: AtomicU64::new(0),
                services: Services::new(),
            }
        });
        scene.root.awake();
        log::debug!("created {}", scene.id);
        scene
    }

    /// Stable unique id
    pub fn id(&self) -> SceneId {
        self.id
    }

    /// The root entity this scene owns
    pub fn root(&self) -> &EntityRef {
        &self.root
    }

    /// Collaborator services
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Whether attached renderers default to casting shadows
    pub fn cast_shadows(&self) -> bool {
        self.cast_shadows.load(Ordering::SeqCst)
    }

    /// Set the shadow-casting policy for subsequently added entities
    pub fn set_cast_shadows(&self, cast: bool) {
        self.cast_shadows.store(cast, Ordering::SeqCst);
    }

    /// Driver-controlled time scale applied to tick deltas
    pub fn time_scale(&self) -> f32 {
        *self.time_scale.lock().unwrap()
    }

    /// Set the time scale
    pub fn set_time_scale(&self, scale: f32) {
        *self.time_scale.lock().unwrap() = scale;
    }

    /// Number of completed update ticks
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// Advance the scene by one frame
    ///
    /// `time` is an absolute timestamp in seconds. The very first call only
    /// records the baseline and invokes `start` on the root; subsequent
    /// calls compute the scaled delta, bump the tick counter, and cascade
    /// `update` followed by the internal post-update pass.
    pub fn tick(self: &Arc<Self>, time: f64) {
        let previous = {
            let mut last = self.last_time.lock().unwrap();
            last.replace(time)
        };
        let Some(previous) = previous else {
            self.root.start();
            return;
        };
        let unscaled = (time - previous).max(0.0) as f32;
        let scaled = unscaled * self.time_scale();
        *self.last_delta.lock().unwrap() = scaled;
        self.ticks.fetch_add(1, Ordering::SeqCst);
        self.root.update(scaled);
        self.root.post_update(scaled);
    }

    /// Run the pre-update pass; gated on having completed one update tick
    pub fn pre_tick(self: &Arc<Self>) {
        if self.tick_count() == 0 {
            return;
        }
        let delta = *self.last_delta.lock().unwrap();
        self.root.pre_update(delta);
    }

    /// Run the fixed-update pass; gated on having completed one update tick
    ///
    /// The fixed timestep is supplied by the driver and passed through
    /// unscaled.
    pub fn fixed_tick(self: &Arc<Self>, fixed_delta: f32) {
        if self.tick_count() == 0 {
            return;
        }
        self.root.fixed_update(fixed_delta);
    }

    /// Attach an entity under the root and apply the scene's visual policy
    pub fn add_entity(self: &Arc<Self>, entity: &EntityRef) {
        self.root.add_child(entity);
        self.apply_shadow_policy(entity);
    }

    fn apply_shadow_policy(&self, entity: &EntityRef) {
        let cast = self.cast_shadows();
        for renderer in entity.get_components::<MeshRenderer>() {
            renderer.with_mut(|r| r.cast_shadows = cast);
        }
        for child in entity.children() {
            self.apply_shadow_policy(&child);
        }
    }

    /// First entity below the root matching the filter
    pub fn find(&self, filter: &SearchFilter) -> Option<EntityRef> {
        search::find(&self.root, filter)
    }

    /// Every entity below the root matching the filter, in traversal order
    pub fn find_all(&self, filter: &SearchFilter) -> Vec<EntityRef> {
        search::find_all(&self.root, filter)
    }
}

/// Explicit shared-scene slot
///
/// At most one scene is the process-wide shared instance; the registry is
/// an ordinary value the application owns, so tests can run several
/// registries without cross-test leakage.
#[derive(Default)]
pub struct SceneRegistry {
    shared: RwLock<Option<Arc<Scene>>>,
}

impl SceneRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scene as the shared instance
    ///
    /// Replaces (does not destroy) any prior shared scene, which is
    /// returned to the caller.
    pub fn install(&self, scene: Arc<Scene>) -> Option<Arc<Scene>> {
        self.shared.write().unwrap().replace(scene)
    }

    /// The current shared scene, if any
    pub fn shared(&self) -> Option<Arc<Scene>> {
        self.shared.read().unwrap().clone()
    }

    /// Clear the slot if `scene` is the shared instance
    ///
    /// Used when a formerly shared scene is re-allocated as an independent
    /// instance. Returns whether the slot was cleared.
    pub fn release(&self, scene: &Arc<Scene>) -> bool {
        let mut slot = self.shared.write().unwrap();
        match slot.as_ref() {
            Some(current) if Arc::ptr_eq(current, scene) => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    /// Reset the registry
    pub fn clear(&self) {
        *self.shared.write().unwrap() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SceneSettings {
        SceneSettings::default()
    }

    #[test]
    fn test_first_tick_records_baseline_only() {
        let scene = Scene::new(&settings());
        scene.tick(10.0);
        assert_eq!(scene.tick_count(), 0);

        scene.tick(10.016);
        assert_eq!(scene.tick_count(), 1);
    }

    #[test]
    fn test_pre_and_fixed_ticks_gate_on_first_update() {
        let scene = Scene::new(&settings());
        scene.pre_tick();
        scene.fixed_tick(1.0 / 60.0);
        assert_eq!(scene.tick_count(), 0);

        scene.tick(0.0);
        scene.tick(0.016);
        scene.pre_tick();
        scene.fixed_tick(1.0 / 60.0);
        assert_eq!(scene.tick_count(), 1);
    }

    #[test]
    fn test_registry_install_replaces_without_destroying() {
        let registry = SceneRegistry::new();
        let first = Scene::new(&settings());
        let second = Scene::new(&settings());

        assert!(registry.install(Arc::clone(&first)).is_none());
        let replaced = registry.install(Arc::clone(&second)).unwrap();
        assert!(Arc::ptr_eq(&replaced, &first));
        assert!(!first.root().is_destroyed());
        assert!(Arc::ptr_eq(&registry.shared().unwrap(), &second));
    }

    #[test]
    fn test_registry_release_clears_only_the_shared_instance() {
        let registry = SceneRegistry::new();
        let shared = Scene::new(&settings());
        let other = Scene::new(&settings());
        registry.install(Arc::clone(&shared));

        assert!(!registry.release(&other));
        assert!(registry.shared().is_some());
        assert!(registry.release(&shared));
        assert!(registry.shared().is_none());
    }

    #[test]
    fn test_entities_see_their_scene() {
        let scene = Scene::new(&settings());
        let entity = Entity::new("thing");
        scene.add_entity(&entity);

        assert!(Arc::ptr_eq(&entity.scene().unwrap(), &scene));
        scene.root().remove_child(&entity);
        assert!(entity.scene().is_none());
    }
}
