//! Janus Export CLI
//!
//! Export a JSON scene description to a JanusVR room.

use clap::{Parser, ValueEnum};
use janus_export::{
    Exporter, ExporterConfig, FilterMode, MemoryScene, MeshFormat, SoftwareRasterizer,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "janus-export")]
#[command(author, version, about = "Export scenes to JanusVR FireBoxRoom documents", long_about = None)]
struct Cli {
    /// Input JSON scene description
    #[arg(short, long)]
    scene: PathBuf,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// Mesh export format
    #[arg(short, long, value_enum, default_value = "interchange")]
    format: FormatArg,

    /// Maximum lightmap resolution (values below 32 clamp up)
    #[arg(long, default_value = "1024")]
    max_lightmap_resolution: u32,

    /// Uniform scale applied to positions and scales
    #[arg(long, default_value = "1.0")]
    scale: f32,

    /// Resampling filter for oversized lightmap readbacks
    #[arg(long, value_enum, default_value = "average")]
    filter: FilterArg,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// Binary glTF interchange
    Interchange,
    /// Plain geometry (recognized but not implemented)
    PlainGeometry,
}

impl From<FormatArg> for MeshFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Interchange => MeshFormat::Interchange,
            FormatArg::PlainGeometry => MeshFormat::PlainGeometry,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FilterArg {
    /// Point sampling
    Nearest,
    /// Two-row box average
    Average,
}

impl From<FilterArg> for FilterMode {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Nearest => FilterMode::Nearest,
            FilterArg::Average => FilterMode::Average,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let scene = MemoryScene::from_json_file(&cli.scene)?;

    let config = ExporterConfig::new(&cli.output)
        .with_mesh_format(cli.format.into())
        .with_max_lightmap_resolution(cli.max_lightmap_resolution)
        .with_uniform_scale(cli.scale)
        .with_lightmap_filter(cli.filter.into());

    let summary = Exporter::new(config).export(&scene, &mut SoftwareRasterizer::new())?;

    println!(
        "Exported {} objects, {} meshes, {} lightmaps to {}",
        summary.objects,
        summary.meshes_written,
        summary.lightmaps_baked,
        cli.output.display()
    );
    Ok(())
}
