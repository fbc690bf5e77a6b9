//! Shared types used throughout the library.

mod transform;

pub use transform::Transform;

use glam::Vec4;

/// Opaque handle to a node in the host scene graph.
///
/// The exporter never inspects the handle; it only uses it as a stable
/// identity key and passes it back to the scene source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// A mesh asset referenced by name.
///
/// Multiple nodes may reference the same mesh (instancing); the mesh file
/// is written to disk at most once per export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshRef {
    pub name: String,
}

impl MeshRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A collider capability payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColliderRef {
    pub name: String,
}

impl ColliderRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Renderer capability payload: the lightmap binding of a renderable node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererInfo {
    /// Index of the baked lightmap this node samples, -1 for none.
    pub lightmap_slot: i32,
    /// Lightmap UV transform as (scale.x, scale.y, offset.x, offset.y).
    pub lightmap_scale_offset: Vec4,
}

impl RendererInfo {
    /// Sentinel slot meaning "no lightmap assigned".
    pub const NO_LIGHTMAP: i32 = -1;

    /// A renderer with no lightmap binding.
    pub fn unlit() -> Self {
        Self {
            lightmap_slot: Self::NO_LIGHTMAP,
            lightmap_scale_offset: Vec4::new(1.0, 1.0, 0.0, 0.0),
        }
    }

    /// A renderer bound to a lightmap slot with the given UV transform.
    pub fn lightmapped(slot: i32, scale_offset: Vec4) -> Self {
        Self {
            lightmap_slot: slot,
            lightmap_scale_offset: scale_offset,
        }
    }

    /// Whether the node has a valid lightmap slot.
    pub fn has_lightmap(&self) -> bool {
        self.lightmap_slot >= 0
    }
}

/// The typed capability set of a scene node.
///
/// Replaces component type tests against the host editor's object model:
/// the scene source resolves every capability to its payload up front.
#[derive(Debug, Clone, Default)]
pub struct NodeCapabilities {
    /// Renderable capability (lightmap binding).
    pub renderer: Option<RendererInfo>,
    /// Mesh capability (the node's geometry source).
    pub mesh: Option<MeshRef>,
    /// Collider capability.
    pub collider: Option<ColliderRef>,
}

/// Geometry for a mesh asset, as supplied by the host.
#[derive(Debug, Clone, Default)]
pub struct MeshGeometry {
    /// Vertex positions in object space.
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals.
    pub normals: Vec<[f32; 3]>,
    /// Primary texture coordinates.
    pub uvs: Vec<[f32; 2]>,
    /// Lightmap texture coordinates (second UV channel).
    pub lightmap_uvs: Vec<[f32; 2]>,
    /// Triangle indices.
    pub indices: Vec<u32>,
}

impl MeshGeometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }
}
