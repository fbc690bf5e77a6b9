//! Render-to-texture interface consumed by the baker.

use std::path::Path;

use glam::{Mat4, Vec2, Vec4};

use crate::error::Result;
use crate::texture::PixelBuffer;
use crate::types::MeshGeometry;

/// Pixel encoding of the readbacks a renderer produces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightmapEncoding {
    /// Components are linear light already.
    Linear,
    /// RGBM with the given decode constants (multiplier, exponent).
    Rgbm(Vec2),
}

/// A render backend that draws a mesh's lightmap chart into an offscreen
/// target and hands the pixels back.
///
/// One bake run calls [`load_material`](Self::load_material) once, then per
/// slot [`bind_lightmap`](Self::bind_lightmap), then per node
/// [`render`](Self::render), and finally
/// [`release_material`](Self::release_material). Implementations own their
/// offscreen resources and must not cache them across renders.
pub trait LightmapRenderer {
    /// Load the lightmap extraction material. Called once per run, and only
    /// when at least one lightmap slot was collected.
    fn load_material(&mut self) -> Result<()>;

    /// Bind a slot's source lightmap texture.
    ///
    /// A missing file is not an error: the implementation binds nothing and
    /// subsequent renders produce unlit output.
    fn bind_lightmap(&mut self, path: &Path);

    /// How the pixels returned by [`render`](Self::render) are encoded.
    fn encoding(&self) -> LightmapEncoding {
        LightmapEncoding::Linear
    }

    /// Draw `geometry` with the `world` transform into a fresh offscreen
    /// target of `resolution` x `resolution`, cleared to `clear` first,
    /// applying the node's lightmap UV `scale_offset`, then read the pixels
    /// back.
    ///
    /// The returned buffer may be larger than `resolution`; the baker
    /// resamples it down.
    fn render(
        &mut self,
        geometry: &MeshGeometry,
        world: Mat4,
        scale_offset: Vec4,
        resolution: u32,
        clear: [f32; 4],
    ) -> Result<PixelBuffer>;

    /// Release the extraction material. Called after the last slot.
    fn release_material(&mut self);
}
