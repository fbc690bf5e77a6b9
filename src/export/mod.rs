//! Mesh export formats.

pub mod gltf;

pub use gltf::export_glb;

use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::error::Result;
use crate::types::MeshGeometry;

/// Mesh interchange formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeshFormat {
    /// Binary glTF 2.0.
    #[default]
    Interchange,
    /// Plain text geometry. Recognized but not implemented: selecting it
    /// makes mesh export a no-op.
    PlainGeometry,
}

impl MeshFormat {
    /// File extension used for exported meshes and asset references.
    pub fn extension(&self) -> &'static str {
        match self {
            MeshFormat::Interchange => "glb",
            MeshFormat::PlainGeometry => "obj",
        }
    }
}

/// Export a mesh to `dest` in the requested format.
///
/// `PlainGeometry` writes nothing and returns Ok.
pub fn export_mesh(geometry: &MeshGeometry, dest: &Path, format: MeshFormat) -> Result<()> {
    match format {
        MeshFormat::Interchange => {
            let glb = export_glb(geometry)?;
            fs::write(dest, glb)?;
            debug!("wrote {} ({} vertices)", dest.display(), geometry.vertex_count());
            Ok(())
        }
        MeshFormat::PlainGeometry => {
            info!("plain geometry export not implemented, skipped {}", dest.display());
            Ok(())
        }
    }
}
