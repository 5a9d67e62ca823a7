//! Generation entry point and the publish-on-success session

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;

use crate::error::GenerationError;
use crate::heightmap::{HeightMap, HeightmapGenerator};
use crate::mesh::{MeshBuilder, MeshData};
use crate::params::GenerationParams;
use crate::raster::{PixelBuffer, RasterColorizer};
use crate::sampler::{NoiseSampler, PerlinSampler};

/// Progress of one generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    Idle,
    SamplingHeights,
    Normalizing,
    /// Mesh building and colorizing run side by side
    BuildingOutputs,
    Published,
}

/// One consistent result: mesh and raster come from the same height map
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainOutput {
    pub height_map: HeightMap,
    pub mesh: MeshData,
    pub texture: Option<PixelBuffer>,
}

/// Runs the full pipeline with a given noise source
pub struct TerrainGenerator {
    sampler: Box<dyn NoiseSampler>,
}

impl Default for TerrainGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TerrainGenerator {
    pub fn new() -> Self {
        Self::with_sampler(Box::new(PerlinSampler::new()))
    }

    pub fn with_sampler(sampler: Box<dyn NoiseSampler>) -> Self {
        Self { sampler }
    }

    /// Validate `params`, then produce height map, mesh and raster.
    /// Every buffer is owned by this call until it returns.
    pub fn generate(&self, params: &GenerationParams) -> Result<TerrainOutput, GenerationError> {
        let started = Instant::now();
        let params = params.validated()?;
        let heightmaps = HeightmapGenerator::new(self.sampler.as_ref());

        enter(GenerationStage::SamplingHeights);
        let (raw, range) = heightmaps.sample_raw(&params)?;

        enter(GenerationStage::Normalizing);
        let height_map = heightmaps.normalize_raw(&params, raw, range);

        enter(GenerationStage::BuildingOutputs);
        let (mesh, texture) = rayon::join(
            || MeshBuilder::build(&height_map, &params),
            || RasterColorizer::paint_for(&height_map, &params),
        );

        enter(GenerationStage::Published);
        log::debug!(
            "[TerrainGenerator] {}x{} seed {} -> {} vertices, {} triangles, texture: {} in {:?}",
            params.width,
            params.height,
            params.seed,
            mesh.vertex_count(),
            mesh.triangle_count(),
            texture.is_some(),
            started.elapsed()
        );

        Ok(TerrainOutput {
            height_map,
            mesh,
            texture,
        })
    }
}

fn enter(stage: GenerationStage) {
    log::trace!("[TerrainGenerator] stage {:?}", stage);
}

/// Generate with the default Perlin sampler
pub fn generate(params: &GenerationParams) -> Result<TerrainOutput, GenerationError> {
    TerrainGenerator::new().generate(params)
}

/// Holds the last successful output for redisplay.
///
/// Requests generate into their own buffers without holding the lock; only
/// the final swap is locked. A failed request leaves the published output
/// as it was, and a request that finishes after a newer one has already
/// published is dropped.
pub struct TerrainSession {
    generator: TerrainGenerator,
    next_request: AtomicU64,
    published: RwLock<Option<Published>>,
}

#[derive(Clone)]
struct Published {
    request: u64,
    params: GenerationParams,
    output: Arc<TerrainOutput>,
}

impl Default for TerrainSession {
    fn default() -> Self {
        Self::new(TerrainGenerator::new())
    }
}

impl TerrainSession {
    pub fn new(generator: TerrainGenerator) -> Self {
        Self {
            generator,
            next_request: AtomicU64::new(0),
            published: RwLock::new(None),
        }
    }

    /// Generate and publish.
    ///
    /// Returns this request's output. It only becomes `current()` if no
    /// newer request published while it was generating.
    pub fn regenerate(&self, params: &GenerationParams) -> Result<Arc<TerrainOutput>, GenerationError> {
        let request = self.begin_request();
        let output = match self.generator.generate(params) {
            Ok(output) => Arc::new(output),
            Err(e) => {
                log::warn!("[TerrainSession] generation failed, keeping previous output: {}", e);
                return Err(e);
            }
        };

        self.publish(request, params, Arc::clone(&output));
        Ok(output)
    }

    fn begin_request(&self) -> u64 {
        self.next_request.fetch_add(1, Ordering::Relaxed)
    }

    /// Swap in `output` unless a newer request got there first
    fn publish(&self, request: u64, params: &GenerationParams, output: Arc<TerrainOutput>) -> bool {
        let mut published = self.published.write();
        if let Some(newer) = published.as_ref().filter(|p| p.request > request) {
            log::debug!(
                "[TerrainSession] dropping request {}, request {} already published",
                request,
                newer.request
            );
            return false;
        }

        *published = Some(Published {
            request,
            params: params.clone(),
            output,
        });
        true
    }

    /// Regenerate only if `params` differ from the published ones
    pub fn regenerate_if_changed(
        &self,
        params: &GenerationParams,
    ) -> Result<Arc<TerrainOutput>, GenerationError> {
        if let Some(published) = self.published.read().as_ref() {
            if published.params == *params {
                return Ok(Arc::clone(&published.output));
            }
        }
        self.regenerate(params)
    }

    pub fn current(&self) -> Option<Arc<TerrainOutput>> {
        self.published.read().as_ref().map(|p| Arc::clone(&p.output))
    }

    pub fn current_params(&self) -> Option<GenerationParams> {
        self.published.read().as_ref().map(|p| p.params.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::DrawMode;

    /// Deterministic stand-in that varies along x only
    struct StripeSampler;

    impl NoiseSampler for StripeSampler {
        fn sample(&self, x: f32, _z: f32) -> f32 {
            (x.sin() + 1.0) * 0.5
        }
    }

    fn params() -> GenerationParams {
        GenerationParams {
            width: 12,
            height: 9,
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_produces_consistent_triple() {
        let output = generate(&GenerationParams {
            draw_mode: DrawMode::Color,
            ..params()
        })
        .unwrap();

        assert_eq!(output.height_map.width(), 12);
        assert_eq!(output.mesh.vertex_count(), 12 * 9);
        let texture = output.texture.unwrap();
        assert_eq!((texture.width(), texture.height()), (12, 9));
    }

    #[test]
    fn test_custom_sampler() {
        let generator = TerrainGenerator::with_sampler(Box::new(StripeSampler));
        let output = generator.generate(&params()).unwrap();

        // Stripe noise ignores z, so every row is identical
        let rows: Vec<&[f32]> = output.height_map.rows().collect();
        assert!(rows.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_invalid_request_fails() {
        let result = generate(&GenerationParams {
            width: 0,
            ..params()
        });
        assert!(matches!(result, Err(GenerationError::InvalidParameters { .. })));
    }

    #[test]
    fn test_session_keeps_output_on_failure() {
        let session = TerrainSession::default();
        assert!(session.current().is_none());

        let first = session.regenerate(&params()).unwrap();
        let bad = GenerationParams {
            octave_count: -3,
            ..params()
        };
        assert!(session.regenerate(&bad).is_err());

        let current = session.current().unwrap();
        assert!(Arc::ptr_eq(&first, &current));
        assert_eq!(session.current_params(), Some(params()));
    }

    #[test]
    fn test_session_drops_stale_results() {
        let session = TerrainSession::default();
        let older_params = params();
        let newer_params = GenerationParams {
            seed: 77,
            ..params()
        };

        // Both requests start before either finishes; the newer one wins the race
        let older = session.begin_request();
        let newer = session.begin_request();
        let older_output = Arc::new(generate(&older_params).unwrap());
        let newer_output = Arc::new(generate(&newer_params).unwrap());

        assert!(session.publish(newer, &newer_params, Arc::clone(&newer_output)));
        assert!(!session.publish(older, &older_params, older_output));

        assert!(Arc::ptr_eq(&session.current().unwrap(), &newer_output));
        assert_eq!(session.current_params(), Some(newer_params));

        // Later requests still publish normally
        let latest = session.regenerate(&params()).unwrap();
        assert!(Arc::ptr_eq(&session.current().unwrap(), &latest));
    }

    #[test]
    fn test_session_skips_unchanged_params() {
        let session = TerrainSession::default();
        let first = session.regenerate_if_changed(&params()).unwrap();
        let second = session.regenerate_if_changed(&params()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let third = session
            .regenerate_if_changed(&GenerationParams {
                seed: 9,
                ..params()
            })
            .unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }
}
