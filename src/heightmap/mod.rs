//! Multi-octave height synthesis and normalization

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::constants::sampling::{MIN_NOISE_SCALE, OFFSET_RANGE};
use crate::error::GenerationError;
use crate::params::{GenerationParams, NormalizeMode};
use crate::sampler::NoiseSampler;

/// Normalized heights, row-major: `values[x + width * z]`
#[derive(Debug, Clone, PartialEq)]
pub struct HeightMap {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl HeightMap {
    /// Build from raw values; `values.len()` must equal `width * height`
    pub fn from_values(width: usize, height: usize, values: Vec<f32>) -> Option<Self> {
        if width == 0 || height == 0 || values.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            values,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn index(&self, x: usize, z: usize) -> usize {
        x + self.width * z
    }

    #[inline]
    pub fn get(&self, x: usize, z: usize) -> f32 {
        self.values[self.index(x, z)]
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.values.chunks_exact(self.width)
    }
}

/// Inclusive range of raw heights seen in one pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightRange {
    pub min: f32,
    pub max: f32,
}

impl HeightRange {
    pub const EMPTY: HeightRange = HeightRange {
        min: f32::MAX,
        max: f32::MIN,
    };

    pub fn include(self, value: f32) -> Self {
        Self {
            min: self.min.min(value),
            max: self.max.max(value),
        }
    }

    pub fn merge(self, other: HeightRange) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// A flat range cannot be stretched
    pub fn is_degenerate(&self) -> bool {
        !(self.max - self.min > f32::EPSILON)
    }
}

/// Derive one sample-space offset per octave from the seed
pub fn octave_offsets(seed: i32, octave_count: usize, sample_offset: [f32; 2]) -> Vec<[f32; 2]> {
    let mut rng = StdRng::seed_from_u64(seed as i64 as u64);

    (0..octave_count)
        .map(|_| {
            let x = rng.gen_range(-OFFSET_RANGE..OFFSET_RANGE) as f32 + sample_offset[0];
            let z = rng.gen_range(-OFFSET_RANGE..OFFSET_RANGE) as f32 + sample_offset[1];
            [x, z]
        })
        .collect()
}

/// Builds normalized height maps from a noise sampler
pub struct HeightmapGenerator<'a> {
    sampler: &'a dyn NoiseSampler,
}

impl<'a> HeightmapGenerator<'a> {
    pub fn new(sampler: &'a dyn NoiseSampler) -> Self {
        Self { sampler }
    }

    /// Sample and normalize a full map
    pub fn generate(&self, params: &GenerationParams) -> Result<HeightMap, GenerationError> {
        let (values, range) = self.sample_raw(params)?;
        Ok(self.normalize_raw(params, values, range))
    }

    /// Second pass over the output of `sample_raw`
    pub fn normalize_raw(
        &self,
        params: &GenerationParams,
        mut values: Vec<f32>,
        range: HeightRange,
    ) -> HeightMap {
        let width = params.width as usize;
        let height = params.height as usize;

        log::trace!(
            "[HeightmapGenerator] raw range {:.4}..{:.4} over {}x{}",
            range.min,
            range.max,
            width,
            height
        );

        normalize(&mut values, range, params);

        HeightMap {
            width,
            height,
            values,
        }
    }

    /// First pass: raw octave sums for every cell plus their range.
    ///
    /// Rows are sampled in parallel; each row reports its own range and
    /// the rows are reduced into the map range.
    pub fn sample_raw(
        &self,
        params: &GenerationParams,
    ) -> Result<(Vec<f32>, HeightRange), GenerationError> {
        if params.width <= 0 {
            return Err(GenerationError::invalid("width", format!("{} must be positive", params.width)));
        }
        if params.height <= 0 {
            return Err(GenerationError::invalid(
                "height",
                format!("{} must be positive", params.height),
            ));
        }
        if params.octave_count < 0 {
            return Err(GenerationError::invalid(
                "octave_count",
                format!("{} is negative", params.octave_count),
            ));
        }

        let width = params.width as usize;
        let height = params.height as usize;
        let offsets = octave_offsets(params.seed, params.octave_count as usize, params.sample_offset);
        let scale = if params.noise_scale <= 0.0 {
            MIN_NOISE_SCALE
        } else {
            params.noise_scale
        };

        let half_width = width as f32 / 2.0;
        let half_height = height as f32 / 2.0;
        let [origin_x, origin_z] = params.chunk_origin;

        let mut values = vec![0.0f32; width * height];
        let range = values
            .par_chunks_mut(width)
            .enumerate()
            .map(|(z, row)| {
                let local_z = (z as i64 + origin_z as i64) as f32 - half_height;
                let mut row_range = HeightRange::EMPTY;

                for (x, cell) in row.iter_mut().enumerate() {
                    let local_x = (x as i64 + origin_x as i64) as f32 - half_width;

                    let mut amplitude = 1.0f32;
                    let mut frequency = 1.0f32;
                    let mut raw = 0.0f32;

                    for offset in &offsets {
                        let sample_x = local_x / scale * frequency + offset[0];
                        let sample_z = local_z / scale * frequency + offset[1];

                        let noise = self.sampler.sample(sample_x, sample_z) * 2.0 - 1.0;
                        raw += noise * amplitude;

                        amplitude *= params.persistence;
                        frequency *= params.lacunarity;
                    }

                    *cell = raw;
                    row_range = row_range.include(raw);
                }

                row_range
            })
            .reduce(|| HeightRange::EMPTY, HeightRange::merge);

        // Octave weights or frequencies that overflow leave inf/NaN sums behind
        if values.par_iter().any(|v| !v.is_finite()) || !(range.max - range.min).is_finite() {
            return Err(overflow_error(params));
        }
        if params.normalize_mode == NormalizeMode::Global
            && !max_possible_height(offsets.len(), params.persistence).is_finite()
        {
            return Err(overflow_error(params));
        }

        Ok((values, range))
    }
}

/// Second pass: map raw heights to [0,1]
fn normalize(values: &mut [f32], range: HeightRange, params: &GenerationParams) {
    match params.normalize_mode {
        NormalizeMode::Local => {
            if range.is_degenerate() {
                log::debug!(
                    "[HeightmapGenerator] degenerate noise map (min {} max {}), filling with 0",
                    range.min,
                    range.max
                );
                values.par_iter_mut().for_each(|v| *v = 0.0);
                return;
            }

            let span = range.max - range.min;
            values
                .par_iter_mut()
                .for_each(|v| *v = ((*v - range.min) / span).clamp(0.0, 1.0));
        }
        NormalizeMode::Global => {
            let max_possible = max_possible_height(params.octave_count.max(0) as usize, params.persistence);
            if max_possible <= f32::EPSILON {
                values.par_iter_mut().for_each(|v| *v = 0.0);
                return;
            }

            values
                .par_iter_mut()
                .for_each(|v| *v = ((*v + max_possible) / (2.0 * max_possible)).clamp(0.0, 1.0));
        }
    }
}

fn overflow_error(params: &GenerationParams) -> GenerationError {
    // Raw sums span at most twice the amplitude bound
    let bound = max_possible_height(params.octave_count.max(0) as usize, params.persistence);
    if (bound * 2.0).is_finite() {
        GenerationError::invalid(
            "lacunarity",
            format!(
                "{} over {} octaves overflows the sample frequency",
                params.lacunarity, params.octave_count
            ),
        )
    } else {
        GenerationError::invalid(
            "persistence",
            format!(
                "{} over {} octaves overflows the octave amplitude",
                params.persistence, params.octave_count
            ),
        )
    }
}

/// Sum of octave amplitudes, the bound on |raw height|
fn max_possible_height(octave_count: usize, persistence: f32) -> f32 {
    let mut amplitude = 1.0f32;
    let mut total = 0.0f32;
    for _ in 0..octave_count {
        total += amplitude.abs();
        amplitude *= persistence;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::PerlinSampler;

    fn small_params() -> GenerationParams {
        GenerationParams {
            width: 10,
            height: 10,
            noise_scale: 5.0,
            octave_count: 1,
            persistence: 0.5,
            lacunarity: 2.0,
            seed: 42,
            ..Default::default()
        }
    }

    #[test]
    fn test_offsets_are_seeded() {
        let a = octave_offsets(42, 4, [0.0, 0.0]);
        let b = octave_offsets(42, 4, [0.0, 0.0]);
        let c = octave_offsets(43, 4, [0.0, 0.0]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 4);
    }

    #[test]
    fn test_offsets_include_sample_offset() {
        let base = octave_offsets(7, 3, [0.0, 0.0]);
        let shifted = octave_offsets(7, 3, [10.0, -5.0]);
        for (b, s) in base.iter().zip(&shifted) {
            assert_eq!(s[0], b[0] + 10.0);
            assert_eq!(s[1], b[1] - 5.0);
        }
    }

    #[test]
    fn test_offsets_in_range() {
        for offset in octave_offsets(-99, 32, [0.0, 0.0]) {
            assert!(offset[0] >= -100_000.0 && offset[0] < 100_000.0);
            assert!(offset[1] >= -100_000.0 && offset[1] < 100_000.0);
        }
    }

    #[test]
    fn test_reduced_range_matches_full_scan() {
        let sampler = PerlinSampler::new();
        let generator = HeightmapGenerator::new(&sampler);
        let params = GenerationParams {
            width: 64,
            height: 37,
            octave_count: 5,
            ..small_params()
        };

        let (values, range) = generator.sample_raw(&params).unwrap();
        let scan_min = values.iter().copied().fold(f32::MAX, f32::min);
        let scan_max = values.iter().copied().fold(f32::MIN, f32::max);
        assert_eq!(range.min, scan_min);
        assert_eq!(range.max, scan_max);
    }

    #[test]
    fn test_local_normalization_hits_bounds() {
        let sampler = PerlinSampler::new();
        let map = HeightmapGenerator::new(&sampler)
            .generate(&small_params())
            .unwrap();

        assert!(map.values().iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(map.values().iter().any(|&v| v == 0.0));
        assert!(map.values().iter().any(|&v| v == 1.0));
    }

    #[test]
    fn test_zero_octaves_is_constant() {
        let sampler = PerlinSampler::new();
        let params = GenerationParams {
            octave_count: 0,
            ..small_params()
        };
        let map = HeightmapGenerator::new(&sampler).generate(&params).unwrap();
        assert!(map.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_global_normalization_stays_in_range() {
        let sampler = PerlinSampler::new();
        let params = GenerationParams {
            width: 32,
            height: 32,
            octave_count: 6,
            normalize_mode: NormalizeMode::Global,
            ..small_params()
        };
        let map = HeightmapGenerator::new(&sampler).generate(&params).unwrap();
        assert!(map.values().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_adjacent_chunks_share_edge_samples() {
        let sampler = PerlinSampler::new();
        let generator = HeightmapGenerator::new(&sampler);
        let left = GenerationParams {
            width: 16,
            height: 16,
            octave_count: 3,
            ..small_params()
        };
        let right = GenerationParams {
            chunk_origin: [15, 0],
            ..left.clone()
        };

        let (left_raw, _) = generator.sample_raw(&left).unwrap();
        let (right_raw, _) = generator.sample_raw(&right).unwrap();
        for z in 0..16 {
            assert_eq!(left_raw[15 + 16 * z], right_raw[16 * z]);
        }
    }

    /// Finite inputs sample mid-low; anything else poisons the sum
    struct FiniteOnlySampler;

    impl NoiseSampler for FiniteOnlySampler {
        fn sample(&self, x: f32, z: f32) -> f32 {
            if x.is_finite() && z.is_finite() {
                0.25
            } else {
                f32::NAN
            }
        }
    }

    #[test]
    fn test_overflowing_amplitude_is_rejected() {
        let sampler = PerlinSampler::new();
        let params = GenerationParams {
            width: 8,
            height: 8,
            octave_count: 3,
            persistence: 1e20,
            lacunarity: 1.0,
            ..small_params()
        };

        match HeightmapGenerator::new(&sampler).generate(&params) {
            Err(GenerationError::InvalidParameters { field, .. }) => assert_eq!(field, "persistence"),
            other => panic!("expected persistence overflow, got {:?}", other),
        }
    }

    #[test]
    fn test_overflowing_frequency_is_rejected() {
        let sampler = FiniteOnlySampler;
        let params = GenerationParams {
            width: 8,
            height: 8,
            octave_count: 3,
            lacunarity: 1e20,
            ..small_params()
        };

        match HeightmapGenerator::new(&sampler).sample_raw(&params) {
            Err(GenerationError::InvalidParameters { field, .. }) => assert_eq!(field, "lacunarity"),
            other => panic!("expected lacunarity overflow, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_dimensions_fail_fast() {
        let sampler = PerlinSampler::new();
        let params = GenerationParams {
            width: 0,
            ..small_params()
        };
        assert!(HeightmapGenerator::new(&sampler).generate(&params).is_err());
    }

    #[test]
    fn test_max_possible_height() {
        assert_eq!(max_possible_height(0, 0.5), 0.0);
        assert_eq!(max_possible_height(3, 0.5), 1.75);
    }

    #[test]
    fn test_height_map_indexing() {
        let map = HeightMap::from_values(3, 2, vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5]).unwrap();
        assert_eq!(map.get(2, 0), 0.2);
        assert_eq!(map.get(0, 1), 0.3);
        assert_eq!(map.rows().count(), 2);
        assert!(HeightMap::from_values(3, 3, vec![0.0; 4]).is_none());
    }
}
