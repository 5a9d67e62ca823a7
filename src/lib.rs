//! Procedural heightfield terrain: octave noise height maps, LOD-decimated
//! meshes and height-colored rasters, all derived from one generation pass.

pub mod config;
pub mod constants;
pub mod error;
pub mod generator;
pub mod heightmap;
pub mod mesh;
pub mod params;
pub mod raster;
pub mod sampler;

pub use error::{ConfigError, GenerationError};
pub use generator::{generate, GenerationStage, TerrainGenerator, TerrainOutput, TerrainSession};
pub use heightmap::{HeightMap, HeightmapGenerator};
pub use mesh::{MeshBuilder, MeshData, TerrainVertex};
pub use params::{
    Color, ColorGradient, CurveKey, DrawMode, ElevationCurve, GenerationParams, GradientKey,
    GradientMode, NormalizeMode,
};
pub use raster::{PixelBuffer, RasterColorizer, TextureFilter};
pub use sampler::{NoiseSampler, PerlinSampler};
