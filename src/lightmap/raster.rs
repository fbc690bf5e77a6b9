//! CPU lightmap extraction.
//!
//! Stand-in for the host editor's render-to-texture path: rasterizes each
//! triangle of a mesh's lightmap unwrap into the offscreen buffer while
//! sampling the bound source page, which is what the extraction shader
//! does on the GPU.

use std::path::Path;

use glam::{Mat4, Vec2, Vec4};
use log::{debug, warn};

use crate::error::Result;
use crate::lightmap::render::{LightmapEncoding, LightmapRenderer};
use crate::texture::PixelBuffer;
use crate::types::MeshGeometry;

/// Software implementation of [`LightmapRenderer`].
///
/// The offscreen target spans the mesh's own unwrap (lightmap UVs 0..1);
/// each covered texel samples the source page at
/// `uv * scale_offset.xy + scale_offset.zw`.
#[derive(Debug, Default)]
pub struct SoftwareRasterizer {
    source: Option<PixelBuffer>,
}

impl SoftwareRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an already-decoded source page. `bind_lightmap` goes through
    /// this after loading from disk; hosts with in-memory pages can call it
    /// directly.
    pub fn bind_source(&mut self, source: PixelBuffer) {
        self.source = Some(source);
    }

    /// Nearest-texel sample of the bound page. V grows upward in UV space,
    /// rows grow downward in the buffer.
    fn sample(&self, uv: Vec2) -> Option<[f32; 4]> {
        let source = self.source.as_ref()?;
        let x = (uv.x.clamp(0.0, 1.0) * (source.width - 1) as f32) as u32;
        let y = ((1.0 - uv.y.clamp(0.0, 1.0)) * (source.height - 1) as f32) as u32;
        Some(source.pixel(x, y))
    }

    fn rasterize(&self, target: &mut PixelBuffer, chart: [Vec2; 3], page: [Vec2; 3]) {
        let resolution = target.width;
        let extent = (resolution - 1) as f32;
        // Chart UVs to pixel coordinates; row 0 is the top of the image.
        let p = chart.map(|uv| Vec2::new(uv.x * extent, (1.0 - uv.y) * extent));

        let area = edge(p[0], p[1], p[2]);
        if area.abs() < f32::EPSILON {
            return;
        }

        let min_x = p.iter().map(|v| v.x).fold(f32::MAX, f32::min).floor().max(0.0) as u32;
        let min_y = p.iter().map(|v| v.y).fold(f32::MAX, f32::min).floor().max(0.0) as u32;
        let max_x = (p.iter().map(|v| v.x).fold(f32::MIN, f32::max).ceil() as u32)
            .min(resolution - 1);
        let max_y = (p.iter().map(|v| v.y).fold(f32::MIN, f32::max).ceil() as u32)
            .min(resolution - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                // Dividing by the signed area makes the weights positive
                // for either winding.
                let w0 = edge(p[1], p[2], center) / area;
                let w1 = edge(p[2], p[0], center) / area;
                let w2 = edge(p[0], p[1], center) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let uv = page[0] * w0 + page[1] * w1 + page[2] * w2;
                if let Some(color) = self.sample(uv) {
                    target.set_pixel(x, y, color);
                }
            }
        }
    }
}

fn edge(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

impl LightmapRenderer for SoftwareRasterizer {
    fn load_material(&mut self) -> Result<()> {
        Ok(())
    }

    fn bind_lightmap(&mut self, path: &Path) {
        self.source = match image::open(path) {
            Ok(img) => {
                let rgba = img.to_rgba32f();
                let (width, height) = rgba.dimensions();
                let pixels = rgba.pixels().map(|p| p.0).collect();
                Some(PixelBuffer {
                    width,
                    height,
                    pixels,
                })
            }
            Err(err) => {
                warn!("cannot open lightmap source {}: {}", path.display(), err);
                None
            }
        };
    }

    fn render(
        &mut self,
        geometry: &MeshGeometry,
        _world: Mat4,
        scale_offset: Vec4,
        resolution: u32,
        clear: [f32; 4],
    ) -> Result<PixelBuffer> {
        let mut target = PixelBuffer::filled(resolution, resolution, clear);

        if geometry.lightmap_uvs.len() < geometry.positions.len() {
            debug!("mesh has no lightmap UVs, target left cleared");
            return Ok(target);
        }

        for tri in geometry.indices.chunks_exact(3) {
            let chart = [tri[0], tri[1], tri[2]]
                .map(|i| Vec2::from(geometry.lightmap_uvs[i as usize]));
            // Where the chart sits inside the shared lightmap page.
            let page = chart.map(|uv| {
                Vec2::new(
                    uv.x * scale_offset.x + scale_offset.z,
                    uv.y * scale_offset.y + scale_offset.w,
                )
            });
            self.rasterize(&mut target, chart, page);
        }

        Ok(target)
    }

    fn encoding(&self) -> LightmapEncoding {
        LightmapEncoding::Linear
    }

    fn release_material(&mut self) {
        self.source = None;
    }
}
