//! Height-to-color rasterization

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::heightmap::HeightMap;
use crate::params::{Color, ColorGradient, DrawMode, GenerationParams};

/// Sampling hint for whoever uploads the buffer as a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    /// Keep gradient bands crisp
    Point,
    Bilinear,
}

/// Row-major pixels: `pixels[x + width * z]`, the same order as `HeightMap`
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
    filter: TextureFilter,
}

impl PixelBuffer {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn filter(&self) -> TextureFilter {
        self.filter
    }

    #[inline]
    pub fn get(&self, x: usize, z: usize) -> Color {
        self.pixels[x + self.width * z]
    }

    /// 8-bit RGBA bytes in pixel order
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_rgba8()).collect()
    }

    /// Convert to an `image` buffer; image row `z` is height map row `z`
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width as u32, self.height as u32, |x, z| {
            Rgba(self.get(x as usize, z as usize).to_rgba8())
        })
    }
}

/// Paints height maps as greyscale or gradient rasters
pub struct RasterColorizer;

impl RasterColorizer {
    /// Black at 0, white at 1
    pub fn paint_greyscale(height_map: &HeightMap) -> PixelBuffer {
        Self::paint_with(height_map, TextureFilter::Bilinear, |h| {
            Color::lerp(Color::BLACK, Color::WHITE, h)
        })
    }

    pub fn paint_gradient(height_map: &HeightMap, gradient: &ColorGradient) -> PixelBuffer {
        Self::paint_with(height_map, TextureFilter::Point, |h| gradient.evaluate(h))
    }

    /// Raster for the draw mode: greyscale for Texture, gradient for Color,
    /// gradient for Mesh only when the mesh is colored
    pub fn paint_for(height_map: &HeightMap, params: &GenerationParams) -> Option<PixelBuffer> {
        match params.draw_mode {
            DrawMode::Texture => Some(Self::paint_greyscale(height_map)),
            DrawMode::Color => Some(Self::paint_gradient(height_map, &params.gradient)),
            DrawMode::Mesh if params.mesh_is_colored => {
                Some(Self::paint_gradient(height_map, &params.gradient))
            }
            DrawMode::Mesh => None,
        }
    }

    fn paint_with<F>(height_map: &HeightMap, filter: TextureFilter, shade: F) -> PixelBuffer
    where
        F: Fn(f32) -> Color + Sync,
    {
        let pixels = height_map.values().par_iter().map(|&h| shade(h)).collect();

        PixelBuffer {
            width: height_map.width(),
            height: height_map.height(),
            pixels,
            filter,
        }
    }
}
