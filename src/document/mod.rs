//! FireBoxRoom document assembly.
//!
//! Produces the `index.html` the viewer loads: an assets block with image
//! and mesh declarations, then one placement record per exported object.
//! Tag and attribute names are the viewer's wire format and must not
//! change.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use glam::Vec3;

use crate::scene::SceneSource;
use crate::types::NodeId;
use crate::walker::ExportedData;

/// Settings the document depends on.
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    /// Scene name written into the document title.
    pub title: String,
    /// Global multiplier applied to positions and scales.
    pub uniform_scale: f32,
    /// Extension carried by mesh asset `src` attributes.
    pub mesh_extension: &'static str,
}

/// Build the placement document.
///
/// `image_names` maps baked nodes to their image identifiers (extension
/// stripped), as returned by the baker. Objects without a mesh have no
/// stable identifier and produce no placement record.
pub fn build_document<S: SceneSource>(
    scene: &S,
    exported: &ExportedData,
    image_names: &HashMap<NodeId, String>,
    config: &DocumentConfig,
) -> String {
    let mut index = String::new();
    write!(
        index,
        "<html>\n\t<head>\n\t\t<title>{}</title>\n\t</head>\n\t<body>\n\t\t<FireBoxRoom>\n\t\t\t<Assets>",
        config.title
    )
    .unwrap();

    // Asset declarations come from the lightmap-bound meshes, deduplicated
    // in first-seen order.
    let mut seen = HashSet::new();
    for expo in &exported.lightmap_meshes {
        if seen.insert(expo.image_name.as_str()) {
            write!(
                index,
                "\n\t\t\t\t<AssetImage id=\"{0}\" src=\"{0}.png\" />",
                expo.image_name
            )
            .unwrap();
        }
    }

    let mut seen = HashSet::new();
    for expo in &exported.lightmap_meshes {
        if seen.insert(expo.mesh.name.as_str()) {
            write!(
                index,
                "\n\t\t\t\t<AssetObject id=\"{0}\" src=\"{0}.{1}\" />",
                expo.mesh.name, config.mesh_extension
            )
            .unwrap();
        }
    }
    index.push_str("\n\t\t\t</Assets>\n\t\t\t<Room>");

    for obj in &exported.objects {
        let Some(mesh) = &obj.mesh else {
            continue;
        };

        let transform = scene.transform(obj.node);
        let position = transform.position * config.uniform_scale;
        let (xdir, ydir, zdir) = transform.direction_vectors();
        let scale = transform.scale * config.uniform_scale;

        write!(
            index,
            "\n\t\t\t\t<Object collision_id=\"{0}\" id=\"{0}\"",
            mesh.name
        )
        .unwrap();
        if let Some(image) = image_names.get(&obj.node) {
            write!(index, " image_id=\"{}\"", image).unwrap();
        }
        index.push_str(" lighting=\"true\" pos=\"");
        write_vec3(&mut index, position);
        // Mirrored geometry flips its winding; cull the other side.
        if scale.x < 0.0 || scale.y < 0.0 || scale.z < 0.0 {
            index.push_str("\" cull_face=\"front");
        }

        index.push_str("\" scale=\"");
        write_vec3(&mut index, scale);

        index.push_str("\" xdir=\"");
        write_vec3(&mut index, xdir);

        index.push_str("\" ydir=\"");
        write_vec3(&mut index, ydir);

        index.push_str("\" zdir=\"");
        write_vec3(&mut index, zdir);

        index.push_str("\" />");
    }

    index.push_str("\n\t\t\t</Room>\n\t\t</FireBoxRoom>\n\t</body>\n</html>");
    index
}

/// Write three space-separated components.
///
/// Rust float `Display` always uses a period decimal separator, so the
/// document parses identically regardless of host locale.
fn write_vec3(out: &mut String, v: Vec3) {
    write!(out, "{} {} {}", v.x, v.y, v.z).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MemoryScene;
    use crate::types::{MeshRef, NodeCapabilities, RendererInfo, Transform};
    use crate::walker::{ExportedMesh, SceneWalker};
    use glam::{Quat, Vec4};

    fn config() -> DocumentConfig {
        DocumentConfig {
            title: "Test".to_string(),
            uniform_scale: 1.0,
            mesh_extension: "glb",
        }
    }

    fn render_caps(mesh: &str, slot: i32) -> NodeCapabilities {
        NodeCapabilities {
            renderer: Some(RendererInfo {
                lightmap_slot: slot,
                lightmap_scale_offset: Vec4::new(1.0, 1.0, 0.0, 0.0),
            }),
            mesh: Some(MeshRef::new(mesh)),
            collider: None,
        }
    }

    #[test]
    fn test_one_lightmapped_one_plain() {
        let mut scene = MemoryScene::new("Test");
        let lit = scene.add_node(None, Transform::IDENTITY, render_caps("Lit", 0));
        scene.add_node(None, Transform::IDENTITY, render_caps("Plain", -1));

        let mut data = SceneWalker::new(&scene).walk(&scene.roots());
        data.lightmap_meshes.push(ExportedMesh {
            mesh: MeshRef::new("Lit"),
            image_name: "Lightmap0".to_string(),
            node: lit,
        });
        let image_names = HashMap::from([(lit, "Lightmap0".to_string())]);

        let document = build_document(&scene, &data, &image_names, &config());

        assert_eq!(document.matches("<AssetImage").count(), 1);
        assert_eq!(document.matches("<AssetObject").count(), 1);
        assert_eq!(document.matches("<Object ").count(), 2);
        assert_eq!(document.matches("image_id=\"Lightmap0\"").count(), 1);
        assert!(document.contains("<AssetImage id=\"Lightmap0\" src=\"Lightmap0.png\" />"));
        assert!(document.contains("<AssetObject id=\"Lit\" src=\"Lit.glb\" />"));
    }

    #[test]
    fn test_locale_invariant_floats() {
        let mut scene = MemoryScene::new("Test");
        scene.add_node(
            None,
            Transform::new(
                Vec3::new(1234.5, -0.001, 0.0),
                Quat::IDENTITY,
                Vec3::ONE,
            ),
            render_caps("Box", -1),
        );

        let data = SceneWalker::new(&scene).walk(&scene.roots());
        let document = build_document(&scene, &data, &HashMap::new(), &config());

        assert!(document.contains("pos=\"1234.5 -0.001 0\""));
        assert!(!document.contains(','));
    }

    #[test]
    fn test_cull_face_on_negative_scale() {
        let mut scene = MemoryScene::new("Test");
        scene.add_node(
            None,
            Transform::new(Vec3::ZERO, Quat::IDENTITY, Vec3::new(1.0, -1.0, 1.0)),
            render_caps("Mirror", -1),
        );
        scene.add_node(None, Transform::IDENTITY, render_caps("Straight", -1));

        let data = SceneWalker::new(&scene).walk(&scene.roots());
        let document = build_document(&scene, &data, &HashMap::new(), &config());

        assert_eq!(document.matches("cull_face=\"front\"").count(), 1);
    }

    #[test]
    fn test_uniform_scale_applies() {
        let mut scene = MemoryScene::new("Test");
        scene.add_node(
            None,
            Transform::new(Vec3::new(2.0, 0.0, 0.0), Quat::IDENTITY, Vec3::ONE),
            render_caps("Box", -1),
        );

        let data = SceneWalker::new(&scene).walk(&scene.roots());
        let mut cfg = config();
        cfg.uniform_scale = 0.5;
        let document = build_document(&scene, &data, &HashMap::new(), &cfg);

        assert!(document.contains("pos=\"1 0 0\""));
        assert!(document.contains("scale=\"0.5 0.5 0.5\""));
    }

    #[test]
    fn test_collider_only_objects_have_no_record() {
        let mut scene = MemoryScene::new("Test");
        let caps = NodeCapabilities {
            renderer: None,
            mesh: None,
            collider: Some(crate::types::ColliderRef::new("Blocker")),
        };
        scene.add_node(None, Transform::IDENTITY, caps);

        let data = SceneWalker::new(&scene).walk(&scene.roots());
        assert_eq!(data.objects.len(), 1);

        let document = build_document(&scene, &data, &HashMap::new(), &config());
        assert_eq!(document.matches("<Object ").count(), 0);
    }

    #[test]
    fn test_duplicate_asset_names_declared_once() {
        let mut scene = MemoryScene::new("Test");
        let a = scene.add_node(None, Transform::IDENTITY, render_caps("Shared", 0));
        let b = scene.add_node(None, Transform::IDENTITY, render_caps("Shared", 0));

        let mut data = SceneWalker::new(&scene).walk(&scene.roots());
        for (node, image) in [(a, "Lightmap0"), (b, "Lightmap1")] {
            data.lightmap_meshes.push(ExportedMesh {
                mesh: MeshRef::new("Shared"),
                image_name: image.to_string(),
                node,
            });
        }

        let document = build_document(&scene, &data, &HashMap::new(), &config());
        assert_eq!(document.matches("<AssetImage").count(), 2);
        assert_eq!(document.matches("<AssetObject").count(), 1);
    }
}
