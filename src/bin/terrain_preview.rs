//! Generate one terrain from a config file and write its raster as PNG
//!
//! Usage: terrain_preview [params.toml|params.json] [output.png]

use anyhow::{Context, Result};
use terrain_engine::{config, generate, DrawMode, GenerationParams, RasterColorizer};

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,terrain_engine=debug"),
    )
    .init();

    let mut args = std::env::args().skip(1);
    let params = match args.next() {
        Some(path) => config::load_params(&path)
            .with_context(|| format!("Failed to load params from {}", path))?,
        None => {
            log::info!("[terrain_preview] No config given, using defaults");
            GenerationParams::default()
        }
    };
    let output_path = args.next().unwrap_or_else(|| "terrain.png".to_string());

    let output = generate(&params).context("Terrain generation failed")?;

    log::info!(
        "[terrain_preview] {}x{} map, {} vertices, {} triangles",
        output.height_map.width(),
        output.height_map.height(),
        output.mesh.vertex_count(),
        output.mesh.triangle_count()
    );

    // Mesh mode without colors has no raster; preview the heights instead
    let texture = match output.texture {
        Some(texture) => texture,
        None => {
            debug_assert_eq!(params.draw_mode, DrawMode::Mesh);
            RasterColorizer::paint_greyscale(&output.height_map)
        }
    };

    texture
        .to_rgba_image()
        .save(&output_path)
        .with_context(|| format!("Failed to write {}", output_path))?;

    log::info!("[terrain_preview] Wrote {}", output_path);
    Ok(())
}
