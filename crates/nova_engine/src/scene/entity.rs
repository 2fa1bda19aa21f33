//! Entity: hierarchy membership, component ownership, lifecycle cascading
//!
//! An entity owns its components and children; parent and scene are weak
//! back-references so ownership flows strictly downward. The child list is
//! the only structure mutated from multiple call sites (script logic during
//! a cascade, external code), so it sits behind a read/write lock and every
//! traversal snapshots it before iterating; structural edits made during a
//! cascade are observed on the next cascade, never mid-flight.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use crate::scene::component::{
    Component, ComponentCell, ComponentKind, ComponentRef, Context, Phase,
};
use crate::scene::components::Placement;
use crate::scene::layers::LayerMask;
use crate::scene::scene::Scene;
use crate::foundation::math::Transform;
use crate::scene::script::{Script, ScriptHost, ScriptRef};
use crate::spatial::{Aabb, NodeHandle, TransformNode};

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Stable entity identifier, assigned at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(u64);

impl EntityId {
    /// Raw id value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Entity tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// No tag assigned
    Untagged,
    /// Reserved tag marking the primary camera
    MainCamera,
    /// Application-defined tag
    Custom(String),
}

impl Tag {
    /// Custom tag from a string
    pub fn custom(tag: impl Into<String>) -> Self {
        Self::Custom(tag.into())
    }
}

/// Shared handle to an entity
pub type EntityRef = Arc<Entity>;

#[derive(Default)]
struct SlotFlags {
    awoken: AtomicBool,
    started: AtomicBool,
}

/// One entry of an entity's ordered component list
///
/// Snapshots clone the slot; the lifecycle flags and the component itself
/// stay shared so guard state survives the copy.
#[derive(Clone)]
pub(crate) struct ComponentSlot {
    pub(crate) kind: ComponentKind,
    order: u8,
    flags: Arc<SlotFlags>,
    pub(crate) cell: ComponentCell,
}

/// Node in the scene hierarchy owning components and children
pub struct Entity {
    id: EntityId,
    self_weak: Weak<Entity>,
    name: RwLock<Option<String>>,
    tag: RwLock<Tag>,
    layer: AtomicU32,
    active_self: AtomicBool,
    awoken: AtomicBool,
    started: AtomicBool,
    waiting: AtomicBool,
    waiting_stamp: AtomicU64,
    destroyed: AtomicBool,
    skip_updates: AtomicBool,
    parent: RwLock<Weak<Entity>>,
    children: RwLock<Vec<EntityRef>>,
    components: Mutex<Vec<ComponentSlot>>,
    scene: RwLock<Weak<Scene>>,
    node: NodeHandle,
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

impl Entity {
    /// Create a named entity backed by a fresh in-memory node
    pub fn new(name: impl Into<String>) -> EntityRef {
        Self::build(Some(name.into()), TransformNode::new())
    }

    /// Create an unnamed entity backed by a fresh in-memory node
    pub fn anonymous() -> EntityRef {
        Self::build(None, TransformNode::new())
    }

    /// Create a renderable entity through the internal initialization path
    ///
    /// Reserved kinds (mesh filter, renderer) only exist on entities built
    /// this way; resource loaders and primitive factories sit on top of it.
    pub fn with_geometry(
        name: impl Into<String>,
        mesh: crate::render::Mesh,
        materials: Vec<crate::render::Material>,
    ) -> EntityRef {
        let entity = Self::new(name);
        entity.insert_slot(Box::new(crate::scene::components::MeshFilter::new(mesh)));
        entity.insert_slot(Box::new(crate::scene::components::MeshRenderer::new(
            materials,
        )));
        entity
    }

    /// Create a UI canvas root through the internal initialization path
    pub fn with_canvas(name: impl Into<String>, width: f32, height: f32) -> EntityRef {
        let entity = Self::new(name);
        entity.insert_slot(Box::new(crate::scene::components::Canvas::new(
            width, height,
        )));
        entity
    }

    /// Wrap an externally supplied spatial node tree
    ///
    /// Every child node is recursively wrapped into a child entity. The
    /// node hierarchy is adopted as-is; no mirroring edits are made.
    pub fn wrap(node: NodeHandle) -> EntityRef {
        let entity = Self::build(None, Arc::clone(&node));
        for child_node in node.children() {
            let child = Self::wrap(child_node);
            entity.adopt(&child);
        }
        entity
    }

    fn build(name: Option<String>, node: NodeHandle) -> EntityRef {
        let entity = Arc::new_cyclic(|weak| Entity {
            id: EntityId(NEXT_ENTITY_ID.fetch_add(1, Ordering::SeqCst)),
            self_weak: weak.clone(),
            name: RwLock::new(name),
            tag: RwLock::new(Tag::Untagged),
            layer: AtomicU32::new(LayerMask::DEFAULT.0),
            active_self: AtomicBool::new(true),
            awoken: AtomicBool::new(false),
            started: AtomicBool::new(false),
            waiting: AtomicBool::new(false),
            waiting_stamp: AtomicU64::new(u64::MAX),
            destroyed: AtomicBool::new(false),
            skip_updates: AtomicBool::new(true),
            parent: RwLock::new(Weak::new()),
            children: RwLock::new(Vec::new()),
            components: Mutex::new(Vec::new()),
            scene: RwLock::new(Weak::new()),
            node: Arc::clone(&node),
        });
        // Internal initialization path: the one placement every entity
        // carries, created before anything can observe the component list.
        entity.insert_slot(Box::new(Placement::new(node)));
        entity
    }

    // ── identity and attributes ─────────────────────────────────────────

    /// Stable unique id
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Display name, if any
    pub fn name(&self) -> Option<String> {
        self.name.read().unwrap().clone()
    }

    /// Set the display name
    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.write().unwrap() = Some(name.into());
    }

    /// Current tag
    pub fn tag(&self) -> Tag {
        self.tag.read().unwrap().clone()
    }

    /// Set the tag
    pub fn set_tag(&self, tag: Tag) {
        *self.tag.write().unwrap() = tag;
    }

    /// Layer bitmask
    pub fn layer(&self) -> LayerMask {
        LayerMask(self.layer.load(Ordering::SeqCst))
    }

    /// Set the layer bitmask
    pub fn set_layer(&self, layer: LayerMask) {
        self.layer.store(layer.0, Ordering::SeqCst);
    }

    /// The spatial node this entity wraps
    pub fn node(&self) -> &NodeHandle {
        &self.node
    }

    /// The placement component created at construction
    pub fn placement(&self) -> ComponentRef<Placement> {
        self.get_component::<Placement>()
            .expect("entity placement is created at construction and never removed")
    }

    /// Whether `destroy` has run
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Whether `awake` has completed
    pub fn is_awake(&self) -> bool {
        self.awoken.load(Ordering::SeqCst)
    }

    /// Whether `start` has completed
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// World-space bounding volume of this entity's subtree, if any
    /// geometry bounds are known; consumed by the renderer for culling
    pub fn bounding_box(&self) -> Option<Aabb> {
        let mut result = self.node.world_bounds();
        for child in self.children() {
            if let Some(bounds) = child.bounding_box() {
                result = Some(match result {
                    Some(current) => current.union(&bounds),
                    None => bounds,
                });
            }
        }
        result
    }

    // ── activation ──────────────────────────────────────────────────────

    /// The entity's own active flag
    pub fn active_self(&self) -> bool {
        self.active_self.load(Ordering::SeqCst)
    }

    /// Whether this entity and every ancestor are active
    ///
    /// Always computed transitively, never cached.
    pub fn active_in_hierarchy(&self) -> bool {
        if !self.active_self() {
            return false;
        }
        match self.parent() {
            Some(parent) => parent.active_in_hierarchy(),
            None => true,
        }
    }

    /// Set the active flag
    ///
    /// Toggling also enables/disables every Behaviour-kind component on
    /// this entity, with transition notification. Children are not
    /// recursed into; their effective activity is computed through
    /// [`Entity::active_in_hierarchy`].
    ///
    /// Must not be called from inside one of this entity's own component
    /// hooks (the component lock is held there); defer such toggles to a
    /// background task.
    pub fn set_active(self: &Arc<Self>, active: bool) {
        if self.active_self.swap(active, Ordering::SeqCst) == active {
            return;
        }
        for slot in self.component_slots() {
            let mut guard = slot.cell.lock().unwrap();
            let Some(state) = guard.behaviour_mut() else {
                continue;
            };
            if state.enabled == active {
                continue;
            }
            state.enabled = active;
            let ctx = Context::new(self, 0.0);
            if active {
                guard.on_enable(&ctx);
            } else {
                guard.on_disable(&ctx);
            }
        }
    }

    // ── hierarchy ───────────────────────────────────────────────────────

    /// Parent entity, if attached
    pub fn parent(&self) -> Option<EntityRef> {
        self.parent.read().unwrap().upgrade()
    }

    /// Owning scene, if attached to one
    pub fn scene(&self) -> Option<Arc<Scene>> {
        self.scene.read().unwrap().upgrade()
    }

    /// Snapshot of the current children
    pub fn children(&self) -> Vec<EntityRef> {
        self.children.read().unwrap().clone()
    }

    /// Number of children
    pub fn child_count(&self) -> usize {
        self.children.read().unwrap().len()
    }

    /// Reparent `child` under this entity
    ///
    /// No-op if `child` is already a child (by identity). Detaches from any
    /// previous parent, mirrors the edit onto the spatial nodes, propagates
    /// the owning scene to the subtree, and awakens the subtree when this
    /// entity is already awake.
    ///
    /// # Panics
    ///
    /// Parenting an entity to itself is a contract violation and aborts.
    pub fn add_child(self: &Arc<Self>, child: &EntityRef) {
        assert!(
            !Arc::ptr_eq(self, child),
            "entity {} cannot be its own parent",
            self.id
        );
        // The child's parent slot is the serialization point for relinking:
        // holding it across both list edits keeps "exactly one parent holds
        // the child" true under concurrent reparenting. Lock order is
        // always child.parent before any children list.
        let previous = {
            let mut slot = child.parent.write().unwrap();
            if let Some(current) = slot.upgrade() {
                if Arc::ptr_eq(&current, self) {
                    return;
                }
            }
            let previous = slot.upgrade();
            if let Some(previous) = &previous {
                previous
                    .children
                    .write()
                    .unwrap()
                    .retain(|c| !Arc::ptr_eq(c, child));
                previous.node.detach_child(&child.node);
            }
            {
                let mut children = self.children.write().unwrap();
                if !children.iter().any(|c| Arc::ptr_eq(c, child)) {
                    children.push(Arc::clone(child));
                }
            }
            self.node.attach_child(Arc::clone(&child.node));
            *slot = self.self_weak.clone();
            previous
        };
        child.propagate_scene(self.scene.read().unwrap().clone());
        if self.is_awake() {
            child.awake();
        }
        if let Some(previous) = previous {
            previous.refresh_skip();
        }
        self.refresh_skip();
    }

    /// Detach `child` if present (by identity); no-op otherwise
    ///
    /// The child is not destroyed; it simply leaves the hierarchy and its
    /// scene back-reference is cleared.
    pub fn remove_child(self: &Arc<Self>, child: &EntityRef) {
        {
            let mut slot = child.parent.write().unwrap();
            match slot.upgrade() {
                Some(current) if Arc::ptr_eq(&current, self) => {
                    self.children
                        .write()
                        .unwrap()
                        .retain(|c| !Arc::ptr_eq(c, child));
                    self.node.detach_child(&child.node);
                    *slot = Weak::new();
                }
                _ => return,
            }
        }
        child.propagate_scene(Weak::new());
        self.refresh_skip();
    }

    /// Link a wrapped child without touching the node hierarchy
    fn adopt(self: &Arc<Self>, child: &EntityRef) {
        *child.parent.write().unwrap() = self.self_weak.clone();
        self.children.write().unwrap().push(Arc::clone(child));
        self.refresh_skip();
    }

    pub(crate) fn propagate_scene(&self, scene: Weak<Scene>) {
        *self.scene.write().unwrap() = scene.clone();
        for child in self.children() {
            child.propagate_scene(scene.clone());
        }
    }

    // ── components ──────────────────────────────────────────────────────

    /// Attach a freshly constructed component
    ///
    /// The component is inserted at its category position, awakened
    /// immediately, and started immediately when this entity has already
    /// completed `start` and is active.
    ///
    /// # Panics
    ///
    /// Reserved kinds (placement, renderer, geometry filter, canvas) are
    /// only created through the entity's internal initialization path;
    /// passing one here is a contract violation and aborts.
    pub fn add_component<C: Component>(self: &Arc<Self>, component: C) -> ComponentRef<C> {
        let kind = component.kind();
        assert!(
            !kind.is_reserved(),
            "component kind {kind:?} is reserved for the entity's internal initialization path"
        );
        let cell = self.insert_slot(Box::new(component));
        ComponentRef::new(self.self_weak.clone(), cell)
    }

    /// Attach a user script, wrapped in its host component
    pub fn add_script<S: Script>(self: &Arc<Self>, script: S) -> ScriptRef<S> {
        let cell = self.insert_slot(Box::new(ScriptHost::new(script)));
        ScriptRef::new(self.self_weak.clone(), cell)
    }

    /// Insert through the internal initialization path (reserved kinds
    /// allowed); used at construction and by `instantiate`.
    pub(crate) fn insert_slot(self: &Arc<Self>, component: Box<dyn Component>) -> ComponentCell {
        let kind = component.kind();
        let order = kind.order_key();
        let cell: ComponentCell = Arc::new(Mutex::new(component));
        let slot = ComponentSlot {
            kind,
            order,
            flags: Arc::new(SlotFlags::default()),
            cell: Arc::clone(&cell),
        };
        {
            let mut list = self.components.lock().unwrap();
            let index = list
                .iter()
                .rposition(|s| s.order <= order)
                .map_or(0, |i| i + 1);
            list.insert(index, slot.clone());
        }
        // Attachment triggers awake exactly once; a late join also starts.
        self.awake_slot(&slot);
        if self.is_started() && self.active_in_hierarchy() {
            self.start_slot(&slot);
        }
        self.refresh_skip();
        cell
    }

    /// Remove the first component of type `C`; no-op (false) if absent
    ///
    /// The placement cannot be removed; attempts are logged and ignored.
    pub fn remove_component<C: Component>(&self) -> bool {
        // Matching locks component cells, so it runs on a snapshot; the
        // list lock is only taken for the identity-based removal itself.
        let target = self
            .component_slots()
            .into_iter()
            .find(|slot| slot.cell.lock().unwrap().as_any().is::<C>());
        let Some(target) = target else {
            return false;
        };
        if target.kind == ComponentKind::Placement {
            log::warn!("placement on entity {} cannot be removed", self.id);
            return false;
        }
        self.remove_slot(&target)
    }

    /// Remove the first script of type `S`; no-op (false) if absent
    pub fn remove_script<S: Script>(&self) -> bool {
        let target = self.component_slots().into_iter().find(|slot| {
            slot.kind == ComponentKind::Script
                && slot
                    .cell
                    .lock()
                    .unwrap()
                    .as_any()
                    .downcast_ref::<ScriptHost>()
                    .is_some_and(|host| host.script_is::<S>())
        });
        match target {
            Some(target) => self.remove_slot(&target),
            None => false,
        }
    }

    fn remove_slot(&self, target: &ComponentSlot) -> bool {
        let removed = {
            let mut list = self.components.lock().unwrap();
            let index = list.iter().position(|s| Arc::ptr_eq(&s.cell, &target.cell));
            index.map(|i| list.remove(i))
        };
        match removed {
            Some(slot) => {
                slot.cell.lock().unwrap().on_destroy();
                self.refresh_skip();
                true
            }
            None => false,
        }
    }

    /// First component of type `C` on this entity
    pub fn get_component<C: Component>(&self) -> Option<ComponentRef<C>> {
        self.component_slots().into_iter().find_map(|slot| {
            let matches = slot.cell.lock().unwrap().as_any().is::<C>();
            matches.then(|| ComponentRef::new(self.self_weak.clone(), slot.cell))
        })
    }

    /// Every component of type `C` on this entity, in list order
    pub fn get_components<C: Component>(&self) -> Vec<ComponentRef<C>> {
        self.component_slots()
            .into_iter()
            .filter(|slot| slot.cell.lock().unwrap().as_any().is::<C>())
            .map(|slot| ComponentRef::new(self.self_weak.clone(), slot.cell))
            .collect()
    }

    /// First hosted script of type `S` on this entity
    pub fn get_script<S: Script>(&self) -> Option<ScriptRef<S>> {
        self.component_slots().into_iter().find_map(|slot| {
            if slot.kind != ComponentKind::Script {
                return None;
            }
            let matches = slot
                .cell
                .lock()
                .unwrap()
                .as_any()
                .downcast_ref::<ScriptHost>()
                .is_some_and(|host| host.script_is::<S>());
            matches.then(|| ScriptRef::new(self.self_weak.clone(), slot.cell))
        })
    }

    /// First component of type `C` among descendants
    ///
    /// Immediate children are tested (in order) before any child is
    /// recursed into; this entity's own components are not considered.
    pub fn get_component_in_children<C: Component>(&self) -> Option<ComponentRef<C>> {
        let children = self.children();
        for child in &children {
            if let Some(found) = child.get_component::<C>() {
                return Some(found);
            }
        }
        for child in &children {
            if let Some(found) = child.get_component_in_children::<C>() {
                return Some(found);
            }
        }
        None
    }

    /// Every component of type `C` among descendants, in traversal order
    pub fn get_components_in_children<C: Component>(&self) -> Vec<ComponentRef<C>> {
        let mut found = Vec::new();
        let children = self.children();
        for child in &children {
            found.extend(child.get_components::<C>());
        }
        for child in &children {
            found.extend(child.get_components_in_children::<C>());
        }
        found
    }

    pub(crate) fn component_slots(&self) -> Vec<ComponentSlot> {
        self.components.lock().unwrap().clone()
    }

    // ── lifecycle cascade ───────────────────────────────────────────────

    /// Awaken this entity, its components, then its children
    ///
    /// Idempotent: the second and later calls are no-ops.
    pub fn awake(self: &Arc<Self>) {
        if self.is_destroyed() || self.awoken.swap(true, Ordering::SeqCst) {
            return;
        }
        for slot in self.component_slots() {
            self.awake_slot(&slot);
        }
        for child in self.children() {
            child.awake();
        }
    }

    /// Start this entity after the one-tick deferral
    ///
    /// The first invocation flags the whole subtree as waiting for the next
    /// tick and returns; any further invocation during the same tick keeps
    /// waiting, and the first one a tick later clears the subtree flag,
    /// starts components then children, and forces active-self to true.
    /// No-op unless awoken, not yet started, and active in the hierarchy.
    pub fn start(self: &Arc<Self>) {
        if self.is_destroyed() || !self.is_awake() || self.is_started() {
            return;
        }
        if !self.active_in_hierarchy() {
            return;
        }
        let now = self.current_tick();
        if !self.waiting.load(Ordering::SeqCst) {
            self.set_waiting(true, now.unwrap_or(u64::MAX));
            return;
        }
        if let Some(now) = now {
            // Still inside the tick that flagged us; the grace tick has not
            // elapsed yet.
            if self.waiting_stamp.load(Ordering::SeqCst) == now {
                return;
            }
        }
        self.set_waiting(false, u64::MAX);
        self.started.store(true, Ordering::SeqCst);
        for slot in self.component_slots() {
            self.start_slot(&slot);
        }
        for child in self.children() {
            child.start();
        }
        self.active_self.store(true, Ordering::SeqCst);
    }

    fn current_tick(&self) -> Option<u64> {
        self.scene().map(|scene| scene.tick_count())
    }

    /// Early per-tick pass; requires awoken, started, and active
    pub fn pre_update(self: &Arc<Self>, delta: f32) {
        if !self.can_run_phase() {
            return;
        }
        self.run_phase(Phase::PRE_UPDATE, delta);
        for child in self.children() {
            if !child.skip_updates() {
                child.pre_update(delta);
            }
        }
    }

    /// Main per-tick pass
    ///
    /// Calls `start` first when not yet started and proceeds only once it
    /// completed; a not-yet-started child is still visited so it can
    /// receive its own `start`.
    pub fn update(self: &Arc<Self>, delta: f32) {
        if self.is_destroyed() || !self.is_awake() || !self.active_self() {
            return;
        }
        if !self.is_started() {
            self.start();
            if !self.is_started() {
                return;
            }
        }
        self.run_phase(Phase::UPDATE, delta);
        for child in self.children() {
            if child.skip_updates() && child.is_started() {
                continue;
            }
            child.update(delta);
        }
    }

    /// Fixed-cadence pass; requires awoken, started, and active
    pub fn fixed_update(self: &Arc<Self>, fixed_delta: f32) {
        if !self.can_run_phase() {
            return;
        }
        self.run_phase(Phase::FIXED_UPDATE, fixed_delta);
        for child in self.children() {
            if !child.skip_updates() {
                child.fixed_update(fixed_delta);
            }
        }
    }

    /// Internal pass after update; transform/bounds flushing
    pub(crate) fn post_update(self: &Arc<Self>, delta: f32) {
        if !self.can_run_phase() {
            return;
        }
        self.run_phase(Phase::POST_UPDATE, delta);
        for child in self.children() {
            if !child.skip_updates() {
                child.post_update(delta);
            }
        }
    }

    fn can_run_phase(&self) -> bool {
        !self.is_destroyed() && self.is_awake() && self.is_started() && self.active_self()
    }

    fn run_phase(self: &Arc<Self>, phase: Phase, delta: f32) {
        let ctx = Context::new(self, delta);
        for slot in self.component_slots() {
            let mut guard = slot.cell.lock().unwrap();
            if !guard.phases().contains(phase) {
                continue;
            }
            if !guard.behaviour().map_or(true, |b| b.is_enabled()) {
                continue;
            }
            if phase == Phase::PRE_UPDATE {
                guard.pre_update(&ctx);
            } else if phase == Phase::UPDATE {
                guard.update(&ctx);
            } else if phase == Phase::FIXED_UPDATE {
                guard.fixed_update(&ctx);
            } else {
                guard.post_update(&ctx);
            }
        }
    }

    fn awake_slot(self: &Arc<Self>, slot: &ComponentSlot) {
        if !slot.flags.awoken.swap(true, Ordering::SeqCst) {
            let ctx = Context::new(self, 0.0);
            slot.cell.lock().unwrap().awake(&ctx);
        }
    }

    fn start_slot(self: &Arc<Self>, slot: &ComponentSlot) {
        if !slot.flags.started.swap(true, Ordering::SeqCst) {
            let ctx = Context::new(self, 0.0);
            slot.cell.lock().unwrap().start(&ctx);
        }
    }

    /// Flag the whole subtree as waiting (or not) for its start tick
    ///
    /// Setting the flag on a parent sets it on every descendant; the
    /// coupling is intentional so a freshly added subtree defers as a unit.
    /// The stamp records the tick that flagged the subtree.
    fn set_waiting(&self, value: bool, stamp: u64) {
        self.waiting.store(value, Ordering::SeqCst);
        self.waiting_stamp.store(stamp, Ordering::SeqCst);
        for child in self.children() {
            child.set_waiting(value, stamp);
        }
    }

    // ── skip-subtree optimization ───────────────────────────────────────

    /// Whether the per-tick cascade skips this branch entirely
    ///
    /// True only while this entity carries no script-kind component and
    /// every child also skips.
    pub fn skip_updates(&self) -> bool {
        self.skip_updates.load(Ordering::SeqCst)
    }

    pub(crate) fn refresh_skip(&self) {
        let needs_scripts = self
            .components
            .lock()
            .unwrap()
            .iter()
            .any(|slot| slot.kind == ComponentKind::Script);
        let needs_children = self.children().iter().any(|child| !child.skip_updates());
        let skip = !needs_scripts && !needs_children;
        if self.skip_updates.swap(skip, Ordering::SeqCst) != skip {
            if let Some(parent) = self.parent() {
                parent.refresh_skip();
            }
        }
    }

    // ── cloning and teardown ────────────────────────────────────────────

    /// Deep-clone this entity and its subtree
    ///
    /// The clone carries the placement transform, tag, layer, and activity
    /// of the original plus every component that declares itself cloneable;
    /// the rest are dropped. The clone is detached; attach it wherever it
    /// should live.
    pub fn instantiate(self: &Arc<Self>) -> EntityRef {
        let name = self.name().map(|n| format!("{n} (Clone)"));
        let node = TransformNode::with_transform(Transform {
            position: self.node.local_position(),
            rotation: self.node.local_rotation(),
            scale: self.node.local_scale(),
        });
        let clone = Self::build(name, node);
        clone.set_tag(self.tag());
        clone.set_layer(self.layer());
        clone.active_self.store(self.active_self(), Ordering::SeqCst);
        for slot in self.component_slots() {
            if slot.kind == ComponentKind::Placement {
                continue;
            }
            let duplicate = slot.cell.lock().unwrap().duplicate();
            if let Some(component) = duplicate {
                clone.insert_slot(component);
            }
        }
        for child in self.children() {
            clone.add_child(&child.instantiate());
        }
        clone
    }

    /// Destroy this entity: tear down components, detach from the parent,
    /// and recursively tear down children
    pub fn destroy(self: &Arc<Self>) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        let slots = std::mem::take(&mut *self.components.lock().unwrap());
        for slot in slots {
            slot.cell.lock().unwrap().on_destroy();
        }
        if let Some(parent) = self.parent() {
            parent.remove_child(self);
        }
        let children = std::mem::take(&mut *self.children.write().unwrap());
        for child in children {
            child.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::component::Behaviour;
    use std::sync::atomic::AtomicUsize;

    struct KindProbe {
        kind: ComponentKind,
    }

    impl KindProbe {
        fn new(kind: ComponentKind) -> Self {
            Self { kind }
        }
    }

    impl Component for KindProbe {
        fn kind(&self) -> ComponentKind {
            self.kind
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    #[derive(Default)]
    struct AwakeProbe {
        awakes: Arc<AtomicUsize>,
        starts: Arc<AtomicUsize>,
    }

    impl Component for AwakeProbe {
        fn kind(&self) -> ComponentKind {
            ComponentKind::Collider
        }

        fn awake(&mut self, _ctx: &Context<'_>) {
            self.awakes.fetch_add(1, Ordering::SeqCst);
        }

        fn start(&mut self, _ctx: &Context<'_>) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    #[derive(Default)]
    struct ToggleProbe {
        behaviour: Behaviour,
        transitions: Arc<std::sync::Mutex<Vec<bool>>>,
    }

    impl Component for ToggleProbe {
        fn kind(&self) -> ComponentKind {
            ComponentKind::Camera
        }

        fn on_enable(&mut self, _ctx: &Context<'_>) {
            self.transitions.lock().unwrap().push(true);
        }

        fn on_disable(&mut self, _ctx: &Context<'_>) {
            self.transitions.lock().unwrap().push(false);
        }

        fn behaviour(&self) -> Option<&Behaviour> {
            Some(&self.behaviour)
        }

        fn behaviour_mut(&mut self) -> Option<&mut Behaviour> {
            Some(&mut self.behaviour)
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    #[test]
    fn test_repeated_add_child_keeps_one_entry() {
        let parent = Entity::new("parent");
        let child = Entity::new("child");

        parent.add_child(&child);
        parent.add_child(&child);
        parent.add_child(&child);

        assert_eq!(parent.child_count(), 1);
        assert!(Arc::ptr_eq(&child.parent().unwrap(), &parent));
    }

    #[test]
    fn test_reparent_moves_child() {
        let first = Entity::new("first");
        let second = Entity::new("second");
        let child = Entity::new("child");

        first.add_child(&child);
        second.add_child(&child);

        assert_eq!(first.child_count(), 0);
        assert_eq!(second.child_count(), 1);
        assert!(Arc::ptr_eq(&child.parent().unwrap(), &second));
    }

    #[test]
    fn test_remove_absent_child_is_noop() {
        let parent = Entity::new("parent");
        let stranger = Entity::new("stranger");

        parent.remove_child(&stranger);
        assert_eq!(parent.child_count(), 0);
    }

    #[test]
    #[should_panic(expected = "cannot be its own parent")]
    fn test_self_parenting_aborts() {
        let entity = Entity::new("loop");
        entity.add_child(&Arc::clone(&entity));
    }

    #[test]
    fn test_component_order_follows_categories() {
        let entity = Entity::new("ordered");
        entity.add_component(KindProbe::new(ComponentKind::Script));
        entity.add_component(KindProbe::new(ComponentKind::Collider));
        entity.add_component(KindProbe::new(ComponentKind::Camera));
        entity.add_component(KindProbe::new(ComponentKind::RigidBody));

        let kinds: Vec<ComponentKind> = entity
            .component_slots()
            .iter()
            .map(|slot| slot.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                ComponentKind::Placement,
                ComponentKind::Camera,
                ComponentKind::RigidBody,
                ComponentKind::Collider,
                ComponentKind::Script,
            ]
        );
    }

    #[test]
    fn test_insertion_order_breaks_ties() {
        let entity = Entity::new("ties");
        let first = entity.add_component(AwakeProbe::default());
        entity.add_component(KindProbe::new(ComponentKind::Collider));

        let all = entity.get_components::<AwakeProbe>();
        assert_eq!(all.len(), 1);
        // Both colliders share a category; the probe added first stays first.
        let slots = entity.component_slots();
        assert!(slots[1].cell.lock().unwrap().as_any().is::<AwakeProbe>());
        drop(first);
        assert_eq!(slots[2].kind, ComponentKind::Collider);
    }

    #[test]
    #[should_panic(expected = "reserved")]
    fn test_reserved_kind_rejected_publicly() {
        let entity = Entity::new("reserved");
        entity.add_component(KindProbe::new(ComponentKind::Renderer));
    }

    #[test]
    fn test_awake_is_idempotent() {
        let entity = Entity::new("awake");
        let awakes = Arc::new(AtomicUsize::new(0));
        entity.add_component(AwakeProbe {
            awakes: Arc::clone(&awakes),
            ..Default::default()
        });

        entity.awake();
        entity.awake();
        assert_eq!(awakes.load(Ordering::SeqCst), 1);
        assert!(entity.is_awake());
    }

    #[test]
    fn test_component_awakes_on_attach() {
        let entity = Entity::new("attach");
        let awakes = Arc::new(AtomicUsize::new(0));
        entity.add_component(AwakeProbe {
            awakes: Arc::clone(&awakes),
            ..Default::default()
        });
        assert_eq!(awakes.load(Ordering::SeqCst), 1);

        entity.awake();
        assert_eq!(awakes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_late_component_starts_immediately_on_started_entity() {
        let entity = Entity::new("late");
        entity.awake();
        entity.start(); // defers
        entity.start(); // starts
        assert!(entity.is_started());

        let starts = Arc::new(AtomicUsize::new(0));
        entity.add_component(AwakeProbe {
            starts: Arc::clone(&starts),
            ..Default::default()
        });
        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_activation_is_transitive() {
        let root = Entity::new("root");
        let mid = Entity::new("mid");
        let leaf = Entity::new("leaf");
        root.add_child(&mid);
        mid.add_child(&leaf);

        assert!(leaf.active_in_hierarchy());
        mid.set_active(false);
        assert!(leaf.active_self());
        assert!(!leaf.active_in_hierarchy());
        mid.set_active(true);
        assert!(leaf.active_in_hierarchy());
    }

    #[test]
    fn test_set_active_toggles_behaviours_once() {
        let entity = Entity::new("toggle");
        let transitions = Arc::new(std::sync::Mutex::new(Vec::new()));
        entity.add_component(ToggleProbe {
            transitions: Arc::clone(&transitions),
            ..Default::default()
        });

        entity.set_active(false);
        entity.set_active(false); // re-set: no duplicate notification
        entity.set_active(true);

        assert_eq!(*transitions.lock().unwrap(), vec![false, true]);
    }

    #[test]
    fn test_skip_flag_clears_up_the_ancestor_chain() {
        let root = Entity::new("root");
        let mid = Entity::new("mid");
        let leaf = Entity::new("leaf");
        root.add_child(&mid);
        mid.add_child(&leaf);
        assert!(root.skip_updates());

        leaf.add_component(KindProbe::new(ComponentKind::Script));
        assert!(!leaf.skip_updates());
        assert!(!mid.skip_updates());
        assert!(!root.skip_updates());

        leaf.remove_component::<KindProbe>();
        assert!(root.skip_updates());
    }

    #[test]
    fn test_remove_component_absent_is_noop() {
        let entity = Entity::new("empty");
        assert!(!entity.remove_component::<AwakeProbe>());
    }

    #[test]
    fn test_placement_cannot_be_removed() {
        let entity = Entity::new("kept");
        assert!(!entity.remove_component::<Placement>());
        assert!(entity.get_component::<Placement>().is_some());
    }

    #[test]
    fn test_get_component_in_children_tests_level_first() {
        let root = Entity::new("root");
        let a = Entity::new("a");
        let b = Entity::new("b");
        let a1 = Entity::new("a1");
        root.add_child(&a);
        root.add_child(&b);
        a.add_child(&a1);

        a1.add_component(KindProbe::new(ComponentKind::Collider));
        b.add_component(KindProbe::new(ComponentKind::Collider));

        // b sits on the first level, so it wins over a's deeper child.
        let found = root.get_component_in_children::<KindProbe>().unwrap();
        assert!(Arc::ptr_eq(&found.owner().unwrap(), &b));

        let all = root.get_components_in_children::<KindProbe>();
        assert_eq!(all.len(), 2);
        assert!(Arc::ptr_eq(&all[0].owner().unwrap(), &b));
        assert!(Arc::ptr_eq(&all[1].owner().unwrap(), &a1));
    }

    #[test]
    fn test_instantiate_copies_identity_and_cloneables() {
        let original = Entity::new("prefab");
        original.set_tag(Tag::custom("enemy"));
        original.set_layer(LayerMask::UI);
        original.add_component(AwakeProbe::default()); // not cloneable
        let child = Entity::new("part");
        original.add_child(&child);

        let clone = original.instantiate();
        assert_eq!(clone.name().as_deref(), Some("prefab (Clone)"));
        assert_eq!(clone.tag(), Tag::custom("enemy"));
        assert_eq!(clone.layer(), LayerMask::UI);
        assert_eq!(clone.child_count(), 1);
        assert!(clone.get_component::<AwakeProbe>().is_none());
        assert!(clone.parent().is_none());
        assert_eq!(
            clone.children()[0].name().as_deref(),
            Some("part (Clone)")
        );
    }

    #[test]
    fn test_destroy_detaches_and_tears_down() {
        let parent = Entity::new("parent");
        let child = Entity::new("child");
        let grandchild = Entity::new("grandchild");
        parent.add_child(&child);
        child.add_child(&grandchild);

        child.destroy();
        assert_eq!(parent.child_count(), 0);
        assert!(child.is_destroyed());
        assert!(grandchild.is_destroyed());
    }
}
