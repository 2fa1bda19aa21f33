//! Predicate-based hierarchy search
//!
//! Stateless traversal utilities over the entity tree. Matching runs
//! level-before-depth: all direct children of a node are tested before any
//! of them is recursed into, and the search root itself never matches.

use std::sync::Arc;

use crate::scene::components::{Camera, Light};
use crate::scene::entity::{EntityRef, Tag};
use crate::scene::layers::LayerMask;

/// Name matching mode
#[derive(Debug, Clone, Default)]
pub enum NameMatch {
    /// Any name, including none
    #[default]
    Any,
    /// Exact name equality
    Exact(String),
    /// Name starts with the given prefix
    Prefix(String),
    /// Name contains the given fragment
    Contains(String),
}

impl NameMatch {
    fn matches(&self, name: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => name == Some(expected.as_str()),
            Self::Prefix(prefix) => name.is_some_and(|n| n.starts_with(prefix.as_str())),
            Self::Contains(fragment) => name.is_some_and(|n| n.contains(fragment.as_str())),
        }
    }
}

/// Predicate over an entity's observable attributes
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    name: NameMatch,
    tag: Option<Tag>,
    layers: Option<LayerMask>,
    requires_camera: bool,
    requires_light: bool,
}

impl SearchFilter {
    /// Filter matching every entity
    pub fn any() -> Self {
        Self::default()
    }

    /// Filter on exact name equality
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: NameMatch::Exact(name.into()),
            ..Self::default()
        }
    }

    /// Filter on a name prefix
    pub fn name_prefix(prefix: impl Into<String>) -> Self {
        Self {
            name: NameMatch::Prefix(prefix.into()),
            ..Self::default()
        }
    }

    /// Filter on a name fragment
    pub fn name_contains(fragment: impl Into<String>) -> Self {
        Self {
            name: NameMatch::Contains(fragment.into()),
            ..Self::default()
        }
    }

    /// Builder pattern: require tag equality
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Builder pattern: require membership in any of the given layers
    pub fn on_layers(mut self, layers: LayerMask) -> Self {
        self.layers = Some(layers);
        self
    }

    /// Builder pattern: require a camera component
    pub fn with_camera(mut self) -> Self {
        self.requires_camera = true;
        self
    }

    /// Builder pattern: require a light component
    pub fn with_light(mut self) -> Self {
        self.requires_light = true;
        self
    }

    /// Evaluate the predicate against one entity
    pub fn matches(&self, entity: &EntityRef) -> bool {
        let name = entity.name();
        if !self.name.matches(name.as_deref()) {
            return false;
        }
        if let Some(tag) = &self.tag {
            if entity.tag() != *tag {
                return false;
            }
        }
        if let Some(layers) = self.layers {
            if !entity.layer().intersects(layers) {
                return false;
            }
        }
        if self.requires_camera && entity.get_component::<Camera>().is_none() {
            return false;
        }
        if self.requires_light && entity.get_component::<Light>().is_none() {
            return false;
        }
        true
    }
}

/// First entity below `root` matching the filter, or `None`
///
/// Traversal order: all direct children in list order, then each child's
/// subtree in the same manner. The root itself is never returned.
pub fn find(root: &EntityRef, filter: &SearchFilter) -> Option<EntityRef> {
    let children = root.children();
    for child in &children {
        if filter.matches(child) {
            return Some(Arc::clone(child));
        }
    }
    for child in &children {
        if let Some(found) = find(child, filter) {
            return Some(found);
        }
    }
    None
}

/// Every entity below `root` matching the filter, in traversal order
pub fn find_all(root: &EntityRef, filter: &SearchFilter) -> Vec<EntityRef> {
    let mut found = Vec::new();
    collect(root, filter, &mut found);
    found
}

fn collect(root: &EntityRef, filter: &SearchFilter, found: &mut Vec<EntityRef>) {
    let children = root.children();
    for child in &children {
        if filter.matches(child) {
            found.push(Arc::clone(child));
        }
    }
    for child in &children {
        collect(child, filter, found);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::entity::Entity;

    fn sample_tree() -> (EntityRef, EntityRef, EntityRef, EntityRef, EntityRef) {
        let root = Entity::new("root");
        let a = Entity::new("a");
        let b = Entity::new("b");
        let a1 = Entity::new("a1");
        let a2 = Entity::new("a2");
        root.add_child(&a);
        root.add_child(&b);
        a.add_child(&a1);
        a.add_child(&a2);
        (root, a, b, a1, a2)
    }

    #[test]
    fn test_find_all_visits_level_before_depth() {
        let (root, a, b, a1, a2) = sample_tree();

        let found = find_all(&root, &SearchFilter::any());
        let ids: Vec<_> = found.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![a.id(), b.id(), a1.id(), a2.id()]);
    }

    #[test]
    fn test_search_never_returns_the_root() {
        let (root, ..) = sample_tree();

        assert!(find(&root, &SearchFilter::named("root")).is_none());
        assert!(find_all(&root, &SearchFilter::any())
            .iter()
            .all(|e| e.id() != root.id()));
    }

    #[test]
    fn test_name_modes() {
        let (root, a, _b, a1, _a2) = sample_tree();

        let exact = find(&root, &SearchFilter::named("a1")).unwrap();
        assert_eq!(exact.id(), a1.id());

        let prefixed = find_all(&root, &SearchFilter::name_prefix("a"));
        assert_eq!(prefixed.len(), 3);
        assert_eq!(prefixed[0].id(), a.id());

        assert!(find(&root, &SearchFilter::name_contains("2")).is_some());
        assert!(find(&root, &SearchFilter::named("missing")).is_none());
    }

    #[test]
    fn test_tag_and_layer_predicates() {
        let (root, _a, b, a1, _a2) = sample_tree();
        b.set_tag(Tag::custom("enemy"));
        a1.set_layer(LayerMask::UI);

        let tagged = find(&root, &SearchFilter::any().with_tag(Tag::custom("enemy"))).unwrap();
        assert_eq!(tagged.id(), b.id());

        let layered = find_all(&root, &SearchFilter::any().on_layers(LayerMask::UI));
        assert_eq!(layered.len(), 1);
        assert_eq!(layered[0].id(), a1.id());
    }

    #[test]
    fn test_unnamed_entities_do_not_match_name_filters() {
        let root = Entity::new("root");
        let anon = Entity::anonymous();
        root.add_child(&anon);

        assert!(find(&root, &SearchFilter::name_prefix("")).is_none());
        assert!(find(&root, &SearchFilter::any()).is_some());
    }
}
