//! The export pipeline orchestrator.
//!
//! One call runs the whole one-shot pipeline: walk the scene, bake
//! lightmaps, export unique meshes, write the placement document. There is
//! no cancellation and no rollback; files from a failed run may remain.

use std::fs;
use std::path::PathBuf;

use log::{info, warn};

use crate::document::{self, DocumentConfig};
use crate::error::Result;
use crate::export::{self, MeshFormat};
use crate::lightmap::{BakeConfig, LightmapBaker, LightmapRenderer};
use crate::scene::SceneSource;
use crate::texture::FilterMode;
use crate::walker::SceneWalker;

/// Smallest accepted maximum lightmap resolution.
const MIN_MAX_LIGHTMAP_RESOLUTION: u32 = 32;

/// Exporter configuration.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// Directory the run writes into (created if missing).
    pub export_dir: PathBuf,
    /// Interchange format for mesh assets.
    pub mesh_format: MeshFormat,
    /// Upper bound for baked lightmap resolution; values below 32 clamp up.
    pub max_lightmap_resolution: u32,
    /// Global multiplier applied to exported positions and scales.
    pub uniform_scale: f32,
    /// Filter used when lightmap readbacks are resampled down.
    pub lightmap_filter: FilterMode,
}

impl ExporterConfig {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
            mesh_format: MeshFormat::default(),
            max_lightmap_resolution: 1024,
            uniform_scale: 1.0,
            lightmap_filter: FilterMode::default(),
        }
    }

    pub fn with_mesh_format(mut self, format: MeshFormat) -> Self {
        self.mesh_format = format;
        self
    }

    pub fn with_max_lightmap_resolution(mut self, resolution: u32) -> Self {
        self.max_lightmap_resolution = resolution;
        self
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.uniform_scale = scale;
        self
    }

    pub fn with_lightmap_filter(mut self, filter: FilterMode) -> Self {
        self.lightmap_filter = filter;
        self
    }
}

/// Counts reported back to the caller after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Objects tracked for the placement document.
    pub objects: usize,
    /// Mesh files written to disk.
    pub meshes_written: usize,
    /// Lightmap images baked.
    pub lightmaps_baked: usize,
}

/// One-shot scene exporter.
pub struct Exporter {
    config: ExporterConfig,
}

impl Exporter {
    pub fn new(config: ExporterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExporterConfig {
        &self.config
    }

    /// Run the full pipeline against a scene and a render backend.
    pub fn export<S, R>(&self, scene: &S, renderer: &mut R) -> Result<ExportSummary>
    where
        S: SceneSource,
        R: LightmapRenderer,
    {
        fs::create_dir_all(&self.config.export_dir)?;

        let roots = scene.roots();
        let mut data = SceneWalker::new(scene).walk(&roots);
        info!(
            "walked {} roots: {} objects, {} unique meshes, {} lightmap slots",
            roots.len(),
            data.objects.len(),
            data.pending_meshes.len(),
            data.lightmapped.len()
        );

        let baker = LightmapBaker::new(BakeConfig {
            max_resolution: self
                .config
                .max_lightmap_resolution
                .max(MIN_MAX_LIGHTMAP_RESOLUTION),
            filter: self.config.lightmap_filter,
        });
        let image_names = baker.bake(scene, renderer, &mut data, &self.config.export_dir)?;

        let mut meshes_written = 0;
        for mesh in &data.pending_meshes {
            let Some(geometry) = scene.mesh_geometry(mesh) else {
                warn!("no geometry for mesh {}, export skipped", mesh.name);
                continue;
            };
            let dest = self.config.export_dir.join(format!(
                "{}.{}",
                mesh.name,
                self.config.mesh_format.extension()
            ));
            export::export_mesh(&geometry, &dest, self.config.mesh_format)?;
            if self.config.mesh_format == MeshFormat::Interchange {
                meshes_written += 1;
            }
        }

        let document = document::build_document(
            scene,
            &data,
            &image_names,
            &DocumentConfig {
                title: scene.scene_name().to_string(),
                uniform_scale: self.config.uniform_scale,
                mesh_extension: self.config.mesh_format.extension(),
            },
        );
        fs::write(self.config.export_dir.join("index.html"), &document)?;

        Ok(ExportSummary {
            objects: data.objects.len(),
            meshes_written,
            lightmaps_baked: data.lightmap_meshes.len(),
        })
    }
}
