// Terrain Engine Constants - SINGLE SOURCE OF TRUTH
//
// Every limit, default and magic number used by the generator lives here.

/// Grid dimension limits
pub mod grid {
    /// Largest width/height accepted in unchunked mode.
    /// 255 keeps the vertex count of a full grid under a 16-bit index limit.
    pub const MAX_MAP_DIMENSION: i32 = 255;

    /// Smallest width/height accepted
    pub const MIN_MAP_DIMENSION: i32 = 1;

    /// Fixed chunk dimension in chunked-LOD mode.
    /// 240 is divisible by every LOD stride (2, 4, 6, 8, 10, 12).
    pub const CHUNK_SIZE: i32 = 241;

    /// Highest level of detail; stride = lod * 2
    pub const MAX_LEVEL_OF_DETAIL: i32 = 6;
}

/// Noise sampling constants
pub mod sampling {
    /// Replacement for non-positive noise scales
    pub const MIN_NOISE_SCALE: f32 = 0.0001;

    /// Octave offsets are drawn from [-OFFSET_RANGE, OFFSET_RANGE)
    pub const OFFSET_RANGE: i32 = 100_000;

    /// Permutation seed of the underlying Perlin table.
    /// Terrain variety comes from the octave offsets, not from this seed.
    pub const PERLIN_TABLE_SEED: u32 = 0;

    /// Sub-lattice shift applied to every sample so integer grid
    /// coordinates never land on gradient-noise zeros
    pub const LATTICE_SHIFT: f64 = 0.318_309_886;
}

/// Interactive defaults, matching a freshly created terrain object
pub mod defaults {
    pub const WIDTH: i32 = 100;
    pub const HEIGHT: i32 = 100;
    pub const NOISE_SCALE: f32 = 25.0;
    pub const OCTAVE_COUNT: i32 = 4;
    pub const PERSISTENCE: f32 = 0.5;
    pub const LACUNARITY: f32 = 2.0;
    pub const SEED: i32 = 0;
    pub const ELEVATION_SCALE: f32 = 20.0;
}
