//! Lightmap baking.
//!
//! For each lightmap slot the walker collected, renders every assigned
//! mesh instance into an offscreen target through its lightmap UV
//! transform, reads the pixels back and writes `Lightmap<N>.png` files to
//! the export directory.

pub mod raster;
mod render;

pub use raster::SoftwareRasterizer;
pub use render::{LightmapEncoding, LightmapRenderer};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec4;
use log::{debug, info, warn};

use crate::error::Result;
use crate::scene::SceneSource;
use crate::texture::{self, FilterMode, ImageFormat};
use crate::types::NodeId;
use crate::walker::{ExportedData, ExportedMesh};

/// Color offscreen targets are cleared to before each draw, so texels no
/// chart touches are identifiable in the output.
pub const CLEAR_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

/// Smallest offscreen target the baker allocates.
pub const MIN_TARGET_RESOLUTION: u32 = 16;

/// Compute the offscreen target resolution for a node's lightmap chart.
///
/// `scale_offset` is (scale.x, scale.y, offset.x, offset.y): the chart
/// covers `(1 - offset) * scale` of the source page in each axis. The raw
/// size is rounded up to the next power of two (the viewer filters poorly
/// on NPOT textures) and clamped to `[16, max_resolution]`.
///
/// `max_resolution` must be at least [`MIN_TARGET_RESOLUTION`].
pub fn target_resolution(scale_offset: Vec4, max_resolution: u32) -> u32 {
    let width = (1.0 - scale_offset.z) * scale_offset.x;
    let height = (1.0 - scale_offset.w) * scale_offset.y;
    let size = width.max(height);

    let raw = (max_resolution as f32 * size) as u32;
    raw.next_power_of_two()
        .clamp(MIN_TARGET_RESOLUTION, max_resolution)
}

/// Lightmap baker configuration.
#[derive(Debug, Clone)]
pub struct BakeConfig {
    /// Largest offscreen target edge, in pixels.
    pub max_resolution: u32,
    /// Filter used when a readback is larger than its target resolution.
    pub filter: FilterMode,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            max_resolution: 1024,
            filter: FilterMode::default(),
        }
    }
}

/// Bakes the lightmap slots collected by the walker.
pub struct LightmapBaker {
    config: BakeConfig,
}

impl LightmapBaker {
    pub fn new(config: BakeConfig) -> Self {
        Self { config }
    }

    /// Run the bake.
    ///
    /// Appends one [`ExportedMesh`] per baked node to `data` and returns
    /// the node -> image-name mapping for the document builder. A run with
    /// no collected slots does nothing and loads no material.
    pub fn bake<S, R>(
        &self,
        scene: &S,
        renderer: &mut R,
        data: &mut ExportedData,
        output_dir: &Path,
    ) -> Result<HashMap<NodeId, String>>
    where
        S: SceneSource,
        R: LightmapRenderer,
    {
        let mut image_names = HashMap::new();
        if data.lightmapped.is_empty() {
            return Ok(image_names);
        }

        renderer.load_material()?;

        let sources_dir = lightmap_sources_dir(scene);
        let slots: Vec<(i32, Vec<NodeId>)> = data
            .lightmapped
            .iter()
            .map(|(slot, nodes)| (*slot, nodes.clone()))
            .collect();

        // Image names count up across all slots so they never collide.
        let mut baked = 0usize;

        for (slot, nodes) in &slots {
            let source = sources_dir.join(format!("Lightmap-{}_comp_light.exr", slot));
            if !source.exists() {
                warn!(
                    "lightmap source {} not found, slot {} bakes unlit",
                    source.display(),
                    slot
                );
            }
            renderer.bind_lightmap(&source);

            for &node in nodes {
                let caps = scene.capabilities(node);
                // Both were present when the walker collected the node.
                let (Some(renderer_info), Some(mesh)) = (caps.renderer, caps.mesh) else {
                    continue;
                };
                let Some(geometry) = scene.mesh_geometry(&mesh) else {
                    warn!("no geometry for mesh {}, bake skipped", mesh.name);
                    continue;
                };

                let resolution =
                    target_resolution(renderer_info.lightmap_scale_offset, self.config.max_resolution);
                let world = scene.transform(node).matrix();

                let mut pixels = renderer.render(
                    &geometry,
                    world,
                    renderer_info.lightmap_scale_offset,
                    resolution,
                    CLEAR_COLOR,
                )?;

                if let LightmapEncoding::Rgbm(decode) = renderer.encoding() {
                    pixels = texture::decode_rgbm_buffer(&pixels, decode);
                }
                if pixels.width > resolution {
                    pixels = texture::resample(&pixels, resolution, true, self.config.filter);
                }

                let image_name = format!("Lightmap{}", baked);
                let encoded =
                    texture::encode(&texture::zero_alpha(&pixels), ImageFormat::Png, None)?;
                fs::write(output_dir.join(format!("{}.png", image_name)), encoded)?;
                debug!(
                    "baked {}x{} lightmap {} for node {:?}",
                    resolution, resolution, image_name, node
                );

                data.lightmap_meshes.push(ExportedMesh {
                    mesh,
                    image_name: image_name.clone(),
                    node,
                });
                image_names.insert(node, image_name);
                baked += 1;
            }
        }

        renderer.release_material();
        info!("baked {} lightmaps across {} slots", baked, slots.len());
        Ok(image_names)
    }
}

/// Directory holding the scene's baked lightmap pages, resolved from the
/// scene file path and scene name.
fn lightmap_sources_dir<S: SceneSource>(scene: &S) -> PathBuf {
    let dir = scene
        .scene_path()
        .and_then(|p| p.parent())
        .map(Path::to_path_buf)
        .unwrap_or_default();
    dir.join(scene.scene_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_resolution_pinned_cases() {
        // Chart covering half the page at 1024: raw 512 is already a power
        // of two and inside the clamp range.
        let half = Vec4::new(0.5, 0.5, 0.0, 0.0);
        assert_eq!(target_resolution(half, 1024), 512);

        // Raw 50 at max 64 rounds up to 64 and stays there.
        let ratio = Vec4::new(50.0 / 64.0, 50.0 / 64.0, 0.0, 0.0);
        assert_eq!(target_resolution(ratio, 64), 64);
    }

    #[test]
    fn test_target_resolution_floor() {
        // A degenerate chart still gets the minimum target.
        let empty = Vec4::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(target_resolution(empty, 1024), MIN_TARGET_RESOLUTION);

        let negative = Vec4::new(1.0, 1.0, 2.0, 2.0);
        assert_eq!(target_resolution(negative, 1024), MIN_TARGET_RESOLUTION);
    }

    #[test]
    fn test_target_resolution_properties() {
        let max = 1024;
        let mut previous = 0;
        for step in 0..=20 {
            let size = step as f32 / 20.0;
            let resolution = target_resolution(Vec4::new(size, size, 0.0, 0.0), max);

            assert!(resolution.is_power_of_two());
            assert!((MIN_TARGET_RESOLUTION..=max).contains(&resolution));
            // Monotonically non-decreasing in the size ratio.
            assert!(resolution >= previous);
            previous = resolution;
        }
    }

    #[test]
    fn test_offset_shrinks_chart() {
        // Offsets eat into the covered area: (1 - 0.5) * 1.0 = 0.5.
        let offset = Vec4::new(1.0, 1.0, 0.5, 0.5);
        assert_eq!(target_resolution(offset, 1024), 512);
    }
}
