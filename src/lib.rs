//! # Janus Export
//!
//! A Rust library for exporting 3D scenes to the JanusVR viewer.
//!
//! ## Overview
//!
//! This library walks a loaded scene graph, bakes per-object lightmap
//! textures through a render-to-texture interface, exports each unique
//! mesh to binary glTF, and writes a FireBoxRoom `index.html` placement
//! document into an export directory.
//!
//! ## Quick Start
//!
//! ```ignore
//! use janus_export::{Exporter, ExporterConfig, MemoryScene, SoftwareRasterizer};
//!
//! // Load a scene description
//! let scene = MemoryScene::from_json_file("scene.json")?;
//!
//! // Configure the run
//! let exporter = Exporter::new(ExporterConfig::new("/tmp/janus"));
//!
//! // Export with the built-in software rasterizer
//! let summary = exporter.export(&scene, &mut SoftwareRasterizer::new())?;
//! println!("{} objects, {} lightmaps", summary.objects, summary.lightmaps_baked);
//! ```
//!
//! ## Host Integration
//!
//! Editors integrate by implementing two traits: [`SceneSource`] for scene
//! graph queries and [`LightmapRenderer`] for offscreen lightmap
//! extraction. Everything else — traversal, deduplication, target sizing,
//! encoding, document formatting — is handled here.

pub mod document;
pub mod error;
pub mod export;
pub mod exporter;
pub mod lightmap;
pub mod scene;
pub mod texture;
pub mod types;
pub mod walker;

// Re-export main types for convenience
pub use error::{ExportError, Result};
pub use export::{export_glb, export_mesh, MeshFormat};
pub use exporter::{ExportSummary, Exporter, ExporterConfig};
pub use lightmap::{
    target_resolution, BakeConfig, LightmapBaker, LightmapEncoding, LightmapRenderer,
    SoftwareRasterizer,
};
pub use scene::{MemoryScene, SceneSource};
pub use texture::{FilterMode, ImageFormat, PixelBuffer};
pub use types::{
    ColliderRef, MeshGeometry, MeshRef, NodeCapabilities, NodeId, RendererInfo, Transform,
};
pub use walker::{ExportedData, ExportedMesh, ExportedObject, SceneWalker};
