//! Generation parameters and their validate-and-clamp step

mod curve;
mod gradient;

pub use curve::{CurveKey, ElevationCurve};
pub use gradient::{Color, ColorGradient, GradientKey, GradientMode};

use serde::{Deserialize, Serialize};

use crate::constants::{defaults, grid, sampling};
use crate::error::GenerationError;

/// What the generated output is meant to be displayed as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    /// Flat mesh carrying the greyscale height texture
    Texture,
    /// Flat mesh carrying the gradient color texture
    Color,
    /// Elevated mesh
    #[default]
    Mesh,
}

/// How raw octave sums are mapped to [0,1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeMode {
    /// Min-max stretch over the generated map
    #[default]
    Local,
    /// Divide by the theoretical octave amplitude bound, so separately
    /// generated chunks share one height scale
    Global,
}

/// Terrain generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub width: i32,
    pub height: i32,
    pub noise_scale: f32,
    pub octave_count: i32,
    /// Per-octave amplitude decay
    pub persistence: f32,
    /// Per-octave frequency growth
    pub lacunarity: f32,
    pub seed: i32,
    pub sample_offset: [f32; 2],
    pub elevation_scale: f32,
    pub elevation_curve: ElevationCurve,
    /// Only used in chunked mode; stride = lod * 2
    pub level_of_detail: i32,
    pub draw_mode: DrawMode,
    pub mesh_is_colored: bool,
    /// Chunked-LOD mode: fixed 241x241 grid with decimation
    pub chunked: bool,
    /// Grid origin of this chunk in sample space
    pub chunk_origin: [i32; 2],
    pub normalize_mode: NormalizeMode,
    pub gradient: ColorGradient,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            width: defaults::WIDTH,
            height: defaults::HEIGHT,
            noise_scale: defaults::NOISE_SCALE,
            octave_count: defaults::OCTAVE_COUNT,
            persistence: defaults::PERSISTENCE,
            lacunarity: defaults::LACUNARITY,
            seed: defaults::SEED,
            sample_offset: [0.0, 0.0],
            elevation_scale: defaults::ELEVATION_SCALE,
            elevation_curve: ElevationCurve::linear(),
            level_of_detail: 0,
            draw_mode: DrawMode::Mesh,
            mesh_is_colored: false,
            chunked: false,
            chunk_origin: [0, 0],
            normalize_mode: NormalizeMode::Local,
            gradient: ColorGradient::default(),
        }
    }
}

impl GenerationParams {
    /// Check for values that cannot be repaired and clamp the rest.
    ///
    /// Fails on non-positive dimensions (unchunked mode), negative octave
    /// counts and non-finite floats. Clamps dimensions to
    /// [1, MAX_MAP_DIMENSION], forces CHUNK_SIZE in chunked mode, replaces
    /// non-positive noise scales with MIN_NOISE_SCALE and floors lacunarity
    /// and elevation scale at zero.
    pub fn validated(&self) -> Result<GenerationParams, GenerationError> {
        let mut params = self.clone();

        let floats = [
            ("noise_scale", params.noise_scale),
            ("persistence", params.persistence),
            ("lacunarity", params.lacunarity),
            ("elevation_scale", params.elevation_scale),
            ("sample_offset", params.sample_offset[0]),
            ("sample_offset", params.sample_offset[1]),
        ];
        for (field, value) in floats {
            if !value.is_finite() {
                return Err(GenerationError::invalid(field, format!("{} is not finite", value)));
            }
        }
        if !params.elevation_curve.is_finite() {
            return Err(GenerationError::invalid("elevation_curve", "curve key is not finite"));
        }
        if !params.gradient.is_finite() {
            return Err(GenerationError::invalid("gradient", "gradient key is not finite"));
        }

        if params.octave_count < 0 {
            return Err(GenerationError::invalid(
                "octave_count",
                format!("{} is negative", params.octave_count),
            ));
        }

        if params.chunked {
            params.width = grid::CHUNK_SIZE;
            params.height = grid::CHUNK_SIZE;
        } else {
            params.width = clamp_dimension("width", params.width)?;
            params.height = clamp_dimension("height", params.height)?;
        }
        params.level_of_detail = params.level_of_detail.clamp(0, grid::MAX_LEVEL_OF_DETAIL);

        if params.noise_scale <= 0.0 {
            log::debug!(
                "[GenerationParams] noise_scale {} clamped to {}",
                params.noise_scale,
                sampling::MIN_NOISE_SCALE
            );
            params.noise_scale = sampling::MIN_NOISE_SCALE;
        }
        params.lacunarity = params.lacunarity.max(0.0);
        params.elevation_scale = params.elevation_scale.max(0.0);

        params.elevation_curve.sort_keys();
        params.gradient.sort_keys();

        Ok(params)
    }

    /// Grid dimensions as (width, height). Only meaningful after `validated`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width.max(0) as usize, self.height.max(0) as usize)
    }

    /// Vertex decimation stride
    pub fn lod_stride(&self) -> usize {
        if self.chunked && self.level_of_detail > 0 {
            self.level_of_detail as usize * 2
        } else {
            1
        }
    }
}

fn clamp_dimension(field: &'static str, value: i32) -> Result<i32, GenerationError> {
    if value < grid::MIN_MAP_DIMENSION {
        return Err(GenerationError::invalid(field, format!("{} must be positive", value)));
    }
    if value > grid::MAX_MAP_DIMENSION {
        log::warn!(
            "[GenerationParams] {} {} clamped to {}",
            field,
            value,
            grid::MAX_MAP_DIMENSION
        );
    }
    Ok(value.min(grid::MAX_MAP_DIMENSION))
}
