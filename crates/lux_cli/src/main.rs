//! Lux - photon mapping renderer
//!
//! Renders the built-in Cornell box to a PNG.

mod cli;
mod scene;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Args;
use log::LevelFilter;
use lux_renderer::sampling::resolve_seed;
use lux_renderer::{render, BackwardRenderer, PhotonMappingRenderer, RenderConfig, Renderer};

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(LevelFilter::from(args.log_level))
        .parse_default_env()
        .init();

    log::info!("Starting Lux");

    let mut config = match &args.config {
        Some(path) => RenderConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RenderConfig::default(),
    };
    args.apply(&mut config);
    config.validate().context("Invalid render settings")?;

    // Shared by the photon pass and the pixel loop
    config.seed = Some(resolve_seed(config.seed));

    let scene = scene::cornell_box();
    let camera = scene::cornell_camera(config.width, config.height, &config.lens);
    log::info!(
        "Scene: {} objects, {} lights",
        scene.object_count(),
        scene.lights().len()
    );

    let image = if args.backward_only {
        let renderer = BackwardRenderer::new(&scene, &config);
        render(&camera, &renderer, &config)
    } else {
        let mut renderer = PhotonMappingRenderer::new(&scene, &config);
        renderer.initialize();
        render(&camera, &renderer, &config)
    };

    image
        .save_png(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    Ok(())
}
