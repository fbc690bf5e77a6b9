//! Scene traversal and export record collection.
//!
//! A single depth-first pass classifies every node by its capabilities and
//! builds the flat record set the rest of the pipeline consumes.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;

use crate::scene::SceneSource;
use crate::types::{ColliderRef, MeshRef, NodeId};

/// One record per scene node that carries a renderable mesh or a collider.
#[derive(Debug, Clone)]
pub struct ExportedObject {
    pub node: NodeId,
    pub mesh: Option<MeshRef>,
    pub collider: Option<ColliderRef>,
}

/// Bake record tying a mesh instance to its baked lightmap image.
#[derive(Debug, Clone)]
pub struct ExportedMesh {
    pub mesh: MeshRef,
    /// Baked image name without extension, e.g. `Lightmap3`.
    pub image_name: String,
    pub node: NodeId,
}

/// Everything one traversal pass collects.
///
/// Built fresh per export run and consumed immediately by the bake, mesh
/// export and document stages; never persisted.
#[derive(Debug, Default)]
pub struct ExportedData {
    /// Exported objects in traversal order.
    pub objects: Vec<ExportedObject>,
    /// Bake records, appended by the lightmap baker.
    pub lightmap_meshes: Vec<ExportedMesh>,
    /// Lightmap slot -> nodes awaiting a bake pass.
    pub lightmapped: BTreeMap<i32, Vec<NodeId>>,
    /// Unique meshes queued for export, in first-seen order.
    pub pending_meshes: Vec<MeshRef>,

    object_index: HashMap<NodeId, usize>,
    seen_meshes: HashSet<String>,
}

impl ExportedData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the object record for a node, creating it on first touch.
    fn object_mut(&mut self, node: NodeId) -> &mut ExportedObject {
        let objects = &mut self.objects;
        let index = *self.object_index.entry(node).or_insert_with(|| {
            objects.push(ExportedObject {
                node,
                mesh: None,
                collider: None,
            });
            objects.len() - 1
        });
        &mut objects[index]
    }

    /// Queue a mesh for export the first time its name is seen.
    fn note_mesh(&mut self, mesh: &MeshRef) {
        if self.seen_meshes.insert(mesh.name.clone()) {
            self.pending_meshes.push(mesh.clone());
        }
    }
}

/// Depth-first scene classifier.
pub struct SceneWalker<'a, S: SceneSource> {
    scene: &'a S,
}

impl<'a, S: SceneSource> SceneWalker<'a, S> {
    pub fn new(scene: &'a S) -> Self {
        Self { scene }
    }

    /// Walk the given roots and collect export records.
    ///
    /// Pre-order: a node's own capabilities are processed before its
    /// children are visited.
    pub fn walk(&self, roots: &[NodeId]) -> ExportedData {
        let mut data = ExportedData::new();
        for &root in roots {
            self.visit(root, &mut data);
        }
        data
    }

    fn visit(&self, node: NodeId, data: &mut ExportedData) {
        let caps = self.scene.capabilities(node);

        // Renderable only when both the renderer and the mesh capability
        // are present; either one alone contributes nothing.
        match (caps.renderer, caps.mesh) {
            (Some(renderer), Some(mesh)) => {
                data.note_mesh(&mesh);
                data.object_mut(node).mesh = Some(mesh);

                if renderer.has_lightmap() {
                    data.lightmapped
                        .entry(renderer.lightmap_slot)
                        .or_default()
                        .push(node);
                }
            }
            (None, None) => {}
            _ => debug!("node {:?} has a partial render capability, skipped", node),
        }

        if let Some(collider) = caps.collider {
            data.object_mut(node).collider = Some(collider);
        }

        for child in self.scene.children(node) {
            self.visit(child, data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MemoryScene;
    use crate::types::{NodeCapabilities, RendererInfo, Transform};

    fn render_caps(mesh: &str, slot: i32) -> NodeCapabilities {
        NodeCapabilities {
            renderer: Some(if slot < 0 {
                RendererInfo::unlit()
            } else {
                RendererInfo::lightmapped(slot, glam::Vec4::new(1.0, 1.0, 0.0, 0.0))
            }),
            mesh: Some(MeshRef::new(mesh)),
            collider: None,
        }
    }

    #[test]
    fn test_mesh_dedup_across_instances() {
        let mut scene = MemoryScene::new("Test");
        scene.add_node(None, Transform::IDENTITY, render_caps("Crate", -1));
        scene.add_node(None, Transform::IDENTITY, render_caps("Crate", -1));
        scene.add_node(None, Transform::IDENTITY, render_caps("Barrel", -1));

        let data = SceneWalker::new(&scene).walk(&scene.roots());
        assert_eq!(data.objects.len(), 3);
        let names: Vec<_> = data.pending_meshes.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Crate", "Barrel"]);
    }

    #[test]
    fn test_collider_and_mesh_share_one_record() {
        let mut scene = MemoryScene::new("Test");
        let mut caps = render_caps("Wall", 0);
        caps.collider = Some(ColliderRef::new("WallCollider"));
        scene.add_node(None, Transform::IDENTITY, caps);

        let data = SceneWalker::new(&scene).walk(&scene.roots());
        assert_eq!(data.objects.len(), 1);
        assert!(data.objects[0].mesh.is_some());
        assert!(data.objects[0].collider.is_some());
    }

    #[test]
    fn test_bare_groups_still_descend() {
        let mut scene = MemoryScene::new("Test");
        let group = scene.add_node(None, Transform::IDENTITY, NodeCapabilities::default());
        let inner = scene.add_node(Some(group), Transform::IDENTITY, NodeCapabilities::default());
        scene.add_node(Some(inner), Transform::IDENTITY, render_caps("Leaf", -1));

        let data = SceneWalker::new(&scene).walk(&scene.roots());
        assert_eq!(data.objects.len(), 1);
        assert_eq!(data.objects[0].mesh.as_ref().map(|m| m.name.as_str()), Some("Leaf"));
    }

    #[test]
    fn test_mesh_without_renderer_is_skipped() {
        let mut scene = MemoryScene::new("Test");
        let caps = NodeCapabilities {
            renderer: None,
            mesh: Some(MeshRef::new("Orphan")),
            collider: None,
        };
        scene.add_node(None, Transform::IDENTITY, caps);

        let data = SceneWalker::new(&scene).walk(&scene.roots());
        assert!(data.objects.is_empty());
        assert!(data.pending_meshes.is_empty());
    }

    #[test]
    fn test_lightmap_slots_group_nodes() {
        let mut scene = MemoryScene::new("Test");
        let a = scene.add_node(None, Transform::IDENTITY, render_caps("A", 0));
        let b = scene.add_node(None, Transform::IDENTITY, render_caps("B", 1));
        let c = scene.add_node(None, Transform::IDENTITY, render_caps("C", 0));
        scene.add_node(None, Transform::IDENTITY, render_caps("D", -1));

        let data = SceneWalker::new(&scene).walk(&scene.roots());
        assert_eq!(data.lightmapped.len(), 2);
        assert_eq!(data.lightmapped[&0], vec![a, c]);
        assert_eq!(data.lightmapped[&1], vec![b]);
    }

    #[test]
    fn test_repeated_visit_does_not_duplicate() {
        let mut scene = MemoryScene::new("Test");
        let node = scene.add_node(None, Transform::IDENTITY, render_caps("Once", -1));

        // A root listed twice must still yield a single record.
        let data = SceneWalker::new(&scene).walk(&[node, node]);
        assert_eq!(data.objects.len(), 1);
        assert_eq!(data.pending_meshes.len(), 1);
    }
}
