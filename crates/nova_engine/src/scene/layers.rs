//! Entity layer masks and the named-layer registry
//!
//! Layers filter collision detection, culling, and hierarchy search.
//! A small set of bits is predefined; the rest are claimed by name through
//! [`LayerRegistry`].

use std::collections::HashMap;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::sync::RwLock;

/// Bitmask over the 32 available layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// No layers
    pub const NONE: LayerMask = LayerMask(0);

    /// All layers
    pub const ALL: LayerMask = LayerMask(0xFFFF_FFFF);

    /// Default layer every entity starts on
    pub const DEFAULT: LayerMask = LayerMask(1 << 0);

    /// UI layer
    pub const UI: LayerMask = LayerMask(1 << 1);

    /// Mask with a single bit set
    ///
    /// `index` must be below 32.
    pub fn bit(index: u8) -> LayerMask {
        assert!(index < 32, "layer bit index out of range: {index}");
        LayerMask(1 << index)
    }

    /// Whether any layer is shared between the two masks
    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether no layer is set
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitOr for LayerMask {
    type Output = LayerMask;

    fn bitor(self, rhs: LayerMask) -> LayerMask {
        LayerMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for LayerMask {
    fn bitor_assign(&mut self, rhs: LayerMask) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for LayerMask {
    type Output = LayerMask;

    fn bitand(self, rhs: LayerMask) -> LayerMask {
        LayerMask(self.0 & rhs.0)
    }
}

struct RegistryState {
    names: HashMap<String, u8>,
    next_bit: u8,
}

/// Extensible registry of named layer bits
///
/// Owned by the application (no hidden global) so tests can run multiple
/// registries without leakage. Unknown names fall back to the default
/// layer.
pub struct LayerRegistry {
    state: RwLock<RegistryState>,
}

impl Default for LayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerRegistry {
    /// Create a registry with the built-in layers claimed
    pub fn new() -> Self {
        let mut names = HashMap::new();
        names.insert(String::from("Default"), 0);
        names.insert(String::from("UI"), 1);
        Self {
            state: RwLock::new(RegistryState { names, next_bit: 2 }),
        }
    }

    /// Claim a named layer bit, returning the existing one if already known
    ///
    /// Once all 32 bits are claimed further registrations log an error and
    /// fall back to the default layer.
    pub fn register(&self, name: &str) -> LayerMask {
        let mut state = self.state.write().unwrap();
        if let Some(&bit) = state.names.get(name) {
            return LayerMask::bit(bit);
        }
        if state.next_bit >= 32 {
            log::error!("layer registry exhausted; \"{name}\" falls back to Default");
            return LayerMask::DEFAULT;
        }
        let bit = state.next_bit;
        state.next_bit += 1;
        state.names.insert(name.to_owned(), bit);
        LayerMask::bit(bit)
    }

    /// Look up a named layer without claiming it
    ///
    /// Unknown names fall back to the default layer.
    pub fn mask_for(&self, name: &str) -> LayerMask {
        let state = self.state.read().unwrap();
        match state.names.get(name) {
            Some(&bit) => LayerMask::bit(bit),
            None => {
                log::warn!("unknown layer \"{name}\"; falling back to Default");
                LayerMask::DEFAULT
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_stable() {
        let registry = LayerRegistry::new();
        let a = registry.register("Gameplay");
        let b = registry.register("Gameplay");
        assert_eq!(a, b);
        assert_ne!(a, LayerMask::DEFAULT);
    }

    #[test]
    fn test_unknown_name_falls_back_to_default() {
        let registry = LayerRegistry::new();
        assert_eq!(registry.mask_for("NoSuchLayer"), LayerMask::DEFAULT);
    }

    #[test]
    fn test_builtins_present() {
        let registry = LayerRegistry::new();
        assert_eq!(registry.mask_for("Default"), LayerMask::DEFAULT);
        assert_eq!(registry.mask_for("UI"), LayerMask::UI);
    }

    #[test]
    fn test_mask_operations() {
        let mask = LayerMask::DEFAULT | LayerMask::UI;
        assert!(mask.intersects(LayerMask::UI));
        assert!(!(mask & LayerMask::bit(5)).intersects(LayerMask::ALL));
    }
}
