//! In-memory scene graph.
//!
//! `MemoryScene` backs the CLI and the test suite: a serde-loadable node
//! tree implementing [`SceneSource`] without a host editor. Transforms in a
//! scene description are world-space; whatever produces the JSON composes
//! parent hierarchies beforehand.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use glam::{Quat, Vec3, Vec4};
use serde::Deserialize;

use crate::error::Result;
use crate::scene::SceneSource;
use crate::types::{
    ColliderRef, MeshGeometry, MeshRef, NodeCapabilities, NodeId, RendererInfo, Transform,
};

/// Serde model for one node in a JSON scene description.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeDesc {
    /// Display name, not used by the pipeline.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: [f32; 3],
    /// Quaternion as (x, y, z, w).
    #[serde(default = "default_rotation")]
    pub rotation: [f32; 4],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
    /// Name of the mesh asset this node renders.
    #[serde(default)]
    pub mesh: Option<String>,
    /// Lightmap slot index, -1 for none.
    #[serde(default = "default_slot")]
    pub lightmap_slot: i32,
    /// Lightmap UV transform as (scale.x, scale.y, offset.x, offset.y).
    #[serde(default = "default_scale_offset")]
    pub lightmap_scale_offset: [f32; 4],
    /// Name of the collider attached to this node.
    #[serde(default)]
    pub collider: Option<String>,
    #[serde(default)]
    pub children: Vec<NodeDesc>,
}

/// Serde model for a mesh asset in a JSON scene description.
#[derive(Debug, Clone, Deserialize)]
pub struct MeshDesc {
    pub positions: Vec<[f32; 3]>,
    #[serde(default)]
    pub normals: Vec<[f32; 3]>,
    #[serde(default)]
    pub uvs: Vec<[f32; 2]>,
    #[serde(default)]
    pub lightmap_uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

/// Serde model for a whole scene description.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneDesc {
    pub name: String,
    /// Scene file path, used to locate baked lightmap sources.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub meshes: HashMap<String, MeshDesc>,
    pub nodes: Vec<NodeDesc>,
}

fn default_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_slot() -> i32 {
    RendererInfo::NO_LIGHTMAP
}

fn default_scale_offset() -> [f32; 4] {
    [1.0, 1.0, 0.0, 0.0]
}

#[derive(Debug, Clone)]
struct StoredNode {
    transform: Transform,
    capabilities: NodeCapabilities,
    children: Vec<NodeId>,
}

/// An in-memory scene graph.
#[derive(Debug, Clone)]
pub struct MemoryScene {
    name: String,
    path: Option<PathBuf>,
    nodes: Vec<StoredNode>,
    roots: Vec<NodeId>,
    meshes: HashMap<String, MeshGeometry>,
}

impl MemoryScene {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            nodes: Vec::new(),
            roots: Vec::new(),
            meshes: HashMap::new(),
        }
    }

    /// Set the scene file path used to locate baked lightmap sources.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Register a mesh asset.
    pub fn add_mesh(&mut self, name: impl Into<String>, geometry: MeshGeometry) {
        self.meshes.insert(name.into(), geometry);
    }

    /// Add a node. `parent = None` adds a root.
    pub fn add_node(
        &mut self,
        parent: Option<NodeId>,
        transform: Transform,
        capabilities: NodeCapabilities,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u64);
        self.nodes.push(StoredNode {
            transform,
            capabilities,
            children: Vec::new(),
        });
        match parent {
            Some(parent) => self.nodes[parent.0 as usize].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Load a scene from a JSON description.
    pub fn from_json(data: &str) -> Result<Self> {
        let desc: SceneDesc = serde_json::from_str(data)?;
        Ok(Self::from_desc(desc))
    }

    /// Load a scene description from a file.
    ///
    /// If the description carries no explicit scene path, the file's own
    /// path is used.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read_to_string(&path)?;
        let mut scene = Self::from_json(&data)?;
        if scene.path.is_none() {
            scene.path = Some(path.as_ref().to_path_buf());
        }
        Ok(scene)
    }

    fn from_desc(desc: SceneDesc) -> Self {
        let mut scene = MemoryScene::new(desc.name);
        scene.path = desc.path;
        for (name, mesh) in desc.meshes {
            scene.add_mesh(
                name,
                MeshGeometry {
                    positions: mesh.positions,
                    normals: mesh.normals,
                    uvs: mesh.uvs,
                    lightmap_uvs: mesh.lightmap_uvs,
                    indices: mesh.indices,
                },
            );
        }
        for node in desc.nodes {
            Self::insert_desc(&mut scene, None, node);
        }
        scene
    }

    fn insert_desc(scene: &mut MemoryScene, parent: Option<NodeId>, desc: NodeDesc) {
        let transform = Transform::new(
            Vec3::from(desc.position),
            Quat::from_xyzw(
                desc.rotation[0],
                desc.rotation[1],
                desc.rotation[2],
                desc.rotation[3],
            ),
            Vec3::from(desc.scale),
        );
        // A node with a mesh in the description is renderable; hosts with a
        // separate renderer capability use `add_node` directly.
        let capabilities = NodeCapabilities {
            renderer: desc.mesh.as_ref().map(|_| RendererInfo {
                lightmap_slot: desc.lightmap_slot,
                lightmap_scale_offset: Vec4::from(desc.lightmap_scale_offset),
            }),
            mesh: desc.mesh.map(MeshRef::new),
            collider: desc.collider.map(ColliderRef::new),
        };
        let id = scene.add_node(parent, transform, capabilities);
        for child in desc.children {
            Self::insert_desc(scene, Some(id), child);
        }
    }

    fn node(&self, node: NodeId) -> Option<&StoredNode> {
        self.nodes.get(node.0 as usize)
    }
}

impl SceneSource for MemoryScene {
    fn roots(&self) -> Vec<NodeId> {
        self.roots.clone()
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn transform(&self, node: NodeId) -> Transform {
        self.node(node).map(|n| n.transform).unwrap_or_default()
    }

    fn capabilities(&self, node: NodeId) -> NodeCapabilities {
        self.node(node)
            .map(|n| n.capabilities.clone())
            .unwrap_or_default()
    }

    fn mesh_geometry(&self, mesh: &MeshRef) -> Option<MeshGeometry> {
        self.meshes.get(&mesh.name).cloned()
    }

    fn scene_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn scene_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE_JSON: &str = r#"{
        "name": "Lobby",
        "meshes": {
            "Floor": {
                "positions": [[0,0,0],[1,0,0],[0,0,1]],
                "indices": [0,1,2]
            }
        },
        "nodes": [
            {
                "name": "Root",
                "children": [
                    {
                        "name": "Floor",
                        "mesh": "Floor",
                        "lightmap_slot": 0,
                        "position": [1, 2, 3]
                    },
                    { "name": "Blocker", "collider": "Box" }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let scene = MemoryScene::from_json(SCENE_JSON).unwrap();
        assert_eq!(scene.scene_name(), "Lobby");

        let roots = scene.roots();
        assert_eq!(roots.len(), 1);

        let children = scene.children(roots[0]);
        assert_eq!(children.len(), 2);

        let floor = scene.capabilities(children[0]);
        assert_eq!(floor.mesh.as_ref().map(|m| m.name.as_str()), Some("Floor"));
        assert_eq!(floor.renderer.map(|r| r.lightmap_slot), Some(0));
        assert!(floor.collider.is_none());

        let blocker = scene.capabilities(children[1]);
        assert!(blocker.mesh.is_none());
        assert!(blocker.renderer.is_none());
        assert_eq!(blocker.collider.map(|c| c.name), Some("Box".to_string()));
    }

    #[test]
    fn test_transform_roundtrip() {
        let scene = MemoryScene::from_json(SCENE_JSON).unwrap();
        let roots = scene.roots();
        let floor = scene.children(roots[0])[0];
        assert_eq!(
            scene.transform(floor).position,
            glam::Vec3::new(1.0, 2.0, 3.0)
        );
    }

    #[test]
    fn test_mesh_lookup() {
        let scene = MemoryScene::from_json(SCENE_JSON).unwrap();
        let found = scene.mesh_geometry(&MeshRef::new("Floor"));
        assert_eq!(found.map(|g| g.triangle_count()), Some(1));
        assert!(scene.mesh_geometry(&MeshRef::new("Missing")).is_none());
    }

    #[test]
    fn test_unknown_node_defaults() {
        let scene = MemoryScene::new("Empty");
        let ghost = NodeId(42);
        assert!(scene.children(ghost).is_empty());
        assert_eq!(scene.transform(ghost), Transform::IDENTITY);
        assert!(scene.capabilities(ghost).mesh.is_none());
    }
}
