//! Pixel-level texture operations.
//!
//! Pure functions over [`PixelBuffer`]: RGBM lightmap decoding,
//! resampling, alpha normalization and byte-stream encoding. Nothing here
//! touches the filesystem; callers own the bytes.

use glam::Vec2;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::error::{ExportError, Result};

/// Output image encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    /// JPEG; quality is passed separately to [`encode`].
    Jpeg,
}

/// Resampling filters for [`resample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Point sampling.
    Nearest,
    /// Two-row box average (see [`resample`] for the exact window).
    #[default]
    Average,
}

/// An owned RGBA float pixel rectangle. Row 0 is the top row.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA pixels, `width * height` entries, components 0-1.
    pub pixels: Vec<[f32; 4]>,
}

impl PixelBuffer {
    /// Create a buffer filled with a single color.
    pub fn filled(width: u32, height: u32, color: [f32; 4]) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; (width * height) as usize],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: [f32; 4]) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Convert to tightly packed RGBA8 bytes, clamping each component.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for pixel in &self.pixels {
            for component in pixel {
                bytes.push((component.clamp(0.0, 1.0) * 255.0).round() as u8);
            }
        }
        bytes
    }

    /// Convert to tightly packed RGB8 bytes, dropping alpha.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for pixel in &self.pixels {
            for component in &pixel[..3] {
                bytes.push((component.clamp(0.0, 1.0) * 255.0).round() as u8);
            }
        }
        bytes
    }
}

/// Decode a single RGBM channel: `decode.x * alpha^decode.y * channel`.
pub fn decode_rgbm(alpha: f32, channel: f32, decode: Vec2) -> f32 {
    decode.x * alpha.powf(decode.y) * channel
}

/// Decode an RGBM pixel into linear RGB with alpha fixed to 1.
pub fn decode_rgbm_pixel(pixel: [f32; 4], decode: Vec2) -> [f32; 4] {
    let alpha = pixel[3];
    [
        decode_rgbm(alpha, pixel[0], decode),
        decode_rgbm(alpha, pixel[1], decode),
        decode_rgbm(alpha, pixel[2], decode),
        1.0,
    ]
}

/// Decode a whole RGBM buffer.
pub fn decode_rgbm_buffer(source: &PixelBuffer, decode: Vec2) -> PixelBuffer {
    PixelBuffer {
        width: source.width,
        height: source.height,
        pixels: source
            .pixels
            .iter()
            .map(|p| decode_rgbm_pixel(*p, decode))
            .collect(),
    }
}

/// Resample a square buffer down to `resolution` x `resolution`.
///
/// `Nearest` point-samples on an integer stride of
/// `scale = source.width / resolution`. `Average` sums a window of two rows
/// by `scale` columns and divides by `2 * scale`; this is the exporter's
/// historical filter, kept bit-compatible rather than widened to a full
/// `scale` x `scale` box.
///
/// With `zero_alpha`, output alpha is forced to 1 for every pixel.
pub fn resample(
    source: &PixelBuffer,
    resolution: u32,
    zero_alpha: bool,
    mode: FilterMode,
) -> PixelBuffer {
    let scale = (source.width / resolution).max(1);
    let mut target = vec![[0.0f32; 4]; (resolution * resolution) as usize];

    match mode {
        FilterMode::Average => {
            let divisor = (scale * 2) as f32;
            for y in 0..resolution {
                for x in 0..resolution {
                    let xx = x * scale;
                    let yy = y * scale;
                    let y1 = (yy + 1).min(source.height - 1);

                    let mut sum = [0.0f32; 4];
                    for j in 0..scale {
                        let col = source.pixel(xx + j, yy);
                        for c in 0..4 {
                            sum[c] += col[c];
                        }
                    }
                    for j in 0..scale {
                        let col = source.pixel(xx + j, y1);
                        for c in 0..4 {
                            sum[c] += col[c];
                        }
                    }

                    let mut sampled = [
                        sum[0] / divisor,
                        sum[1] / divisor,
                        sum[2] / divisor,
                        sum[3] / divisor,
                    ];
                    if zero_alpha {
                        sampled[3] = 1.0;
                    }
                    target[(x + y * resolution) as usize] = sampled;
                }
            }
        }
        FilterMode::Nearest => {
            for y in 0..resolution {
                for x in 0..resolution {
                    let mut col = source.pixel(x * scale, y * scale);
                    if zero_alpha {
                        col[3] = 1.0;
                    }
                    target[(x + y * resolution) as usize] = col;
                }
            }
        }
    }

    PixelBuffer {
        width: resolution,
        height: resolution,
        pixels: target,
    }
}

/// Force the alpha channel to 1 across an entire buffer.
///
/// Pre-export normalization for outputs that must read as opaque.
pub fn zero_alpha(source: &PixelBuffer) -> PixelBuffer {
    PixelBuffer {
        width: source.width,
        height: source.height,
        pixels: source
            .pixels
            .iter()
            .map(|p| [p[0], p[1], p[2], 1.0])
            .collect(),
    }
}

/// Encode a buffer to the requested format. Quality applies to JPEG only
/// and defaults to 90.
pub fn encode(source: &PixelBuffer, format: ImageFormat, quality: Option<u8>) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let cursor = std::io::Cursor::new(&mut bytes);

    match format {
        ImageFormat::Png => {
            PngEncoder::new(cursor)
                .write_image(
                    &source.to_rgba8(),
                    source.width,
                    source.height,
                    ExtendedColorType::Rgba8,
                )
                .map_err(|e| ExportError::TextureEncode(format!("Failed to encode PNG: {}", e)))?;
        }
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel.
            JpegEncoder::new_with_quality(cursor, quality.unwrap_or(90))
                .write_image(
                    &source.to_rgb8(),
                    source.width,
                    source.height,
                    ExtendedColorType::Rgb8,
                )
                .map_err(|e| ExportError::TextureEncode(format!("Failed to encode JPEG: {}", e)))?;
        }
    }

    Ok(bytes)
}
