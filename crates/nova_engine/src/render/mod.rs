//! Renderer collaborator boundary
//!
//! The core does not render. It carries geometry and material descriptors on
//! entities and hands them to whatever [`RenderBackend`] the driver plugs in.
//! Backend internals (pipelines, submission, culling strategy) live outside
//! this crate.

use crate::scene::EntityRef;
use crate::spatial::Aabb;

/// Geometry descriptor consumed by the renderer collaborator
///
/// The core never touches vertex data; it only needs identity and bounds
/// for payload attachment and culling queries.
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Human-readable mesh name (asset identity)
    pub name: String,

    /// Local-space bounding box of the geometry
    pub local_bounds: Aabb,

    /// Number of vertices in the backing buffer
    pub vertex_count: u32,

    /// Number of indices in the backing buffer
    pub index_count: u32,
}

impl Mesh {
    /// Create a mesh descriptor
    pub fn new(name: impl Into<String>, local_bounds: Aabb) -> Self {
        Self {
            name: name.into(),
            local_bounds,
            vertex_count: 0,
            index_count: 0,
        }
    }

    /// Builder pattern: set buffer sizes
    pub fn with_counts(mut self, vertex_count: u32, index_count: u32) -> Self {
        self.vertex_count = vertex_count;
        self.index_count = index_count;
        self
    }
}

/// Surface material descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material name
    pub name: String,

    /// Base color (RGBA, linear)
    pub base_color: [f32; 4],

    /// Metallic factor in `[0, 1]`
    pub metallic: f32,

    /// Roughness factor in `[0, 1]`
    pub roughness: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::from("default"),
            base_color: [1.0, 1.0, 1.0, 1.0],
            metallic: 0.0,
            roughness: 0.5,
        }
    }
}

impl Material {
    /// Create a named material with default parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder pattern: set the base color
    pub fn with_color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.base_color = [r, g, b, 1.0];
        self
    }

    /// Builder pattern: set the metallic factor
    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic;
        self
    }

    /// Builder pattern: set the roughness factor
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }
}

/// One draw request handed to the backend
pub struct DrawItem<'a> {
    /// Entity the geometry belongs to (transform, layer, activity)
    pub entity: &'a EntityRef,

    /// Geometry to draw
    pub mesh: &'a Mesh,

    /// Materials, one per submesh slot
    pub materials: &'a [Material],

    /// Whether this geometry casts shadows
    pub cast_shadows: bool,

    /// World-space bounds for culling, if known
    pub world_bounds: Option<Aabb>,
}

/// Contract implemented by a concrete rendering backend
pub trait RenderBackend: Send + Sync {
    /// Submit one visible item for this frame
    fn submit(&self, item: &DrawItem<'_>);
}
