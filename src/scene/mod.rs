//! Scene graph query interface.
//!
//! The exporter is host-agnostic: everything it needs from the editor's
//! loaded scene comes through [`SceneSource`].

pub mod memory;

pub use memory::MemoryScene;

use std::path::Path;

use crate::types::{MeshGeometry, MeshRef, NodeCapabilities, NodeId, Transform};

/// Read access to a loaded scene graph.
pub trait SceneSource {
    /// Root nodes of the scene, in scene order.
    fn roots(&self) -> Vec<NodeId>;

    /// Children of a node, in scene order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// World-space transform of a node.
    fn transform(&self, node: NodeId) -> Transform;

    /// The typed capability set attached to a node.
    fn capabilities(&self, node: NodeId) -> NodeCapabilities;

    /// Geometry for a mesh asset, if the host can supply it.
    ///
    /// Returning `None` silently skips mesh export for that asset.
    fn mesh_geometry(&self, mesh: &MeshRef) -> Option<MeshGeometry>;

    /// Path of the scene file, used to locate baked lightmap sources.
    fn scene_path(&self) -> Option<&Path>;

    /// Name of the scene.
    fn scene_name(&self) -> &str;
}
