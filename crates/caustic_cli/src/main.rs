//! Caustic command line renderer.
//!
//! Loads a JSON scene, accumulates a number of progressive frames and writes
//! the result as an 8-bit image.

use std::path::PathBuf;

use anyhow::{Context, Result};
use caustic_core::{dielectric_presets, metal_presets, SceneDescription};
use caustic_renderer::ProgressiveRenderer;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Spectral SDF path tracer", long_about = None)]
struct Options {
    /// Scene description (JSON). The built-in default scene is used when omitted.
    scene: Option<PathBuf>,

    /// Number of progressive frames to accumulate.
    #[arg(short, long, default_value_t = 64)]
    frames: u32,

    /// Output image path. The format follows the extension.
    #[arg(short, long, default_value = "caustic.png")]
    output: PathBuf,

    /// Override the image width.
    #[arg(long)]
    width: Option<u32>,

    /// Override the image height.
    #[arg(long)]
    height: Option<u32>,

    /// Override the maximum bounce count.
    #[arg(long)]
    bounces: Option<u32>,

    /// Override the base random seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Print the material preset names and exit.
    #[arg(long)]
    list_presets: bool,
}

fn load_scene(options: &Options) -> Result<SceneDescription> {
    let mut desc = match &options.scene {
        Some(path) => SceneDescription::load(path)
            .with_context(|| format!("Failed to load scene {}", path.display()))?,
        None => {
            log::warn!("No scene given, rendering the default scene");
            SceneDescription::default()
        }
    };

    if let Some(width) = options.width {
        desc.render.width = width;
    }
    if let Some(height) = options.height {
        desc.render.height = height;
    }
    if let Some(bounces) = options.bounces {
        desc.render.max_bounces = bounces;
    }
    if let Some(seed) = options.seed {
        desc.render.seed = seed;
    }
    Ok(desc)
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let options = Options::parse();

    if options.list_presets {
        println!("Dielectrics:");
        for name in dielectric_presets() {
            println!("  {name}");
        }
        println!("Metals:");
        for name in metal_presets() {
            println!("  {name}");
        }
        return Ok(());
    }

    let desc = load_scene(&options)?;
    let mut renderer =
        ProgressiveRenderer::from_description(&desc).context("Invalid scene description")?;

    log::info!(
        "Rendering {}x{} for {} frames",
        desc.render.width,
        desc.render.height,
        options.frames
    );
    renderer.render_frames(options.frames);

    let image = renderer.image();
    let buffer = image::RgbaImage::from_raw(image.width, image.height, image.to_rgba())
        .context("Image buffer size does not match its dimensions")?;
    buffer
        .save(&options.output)
        .with_context(|| format!("Failed to write {}", options.output.display()))?;

    log::info!("Saved {}", options.output.display());
    Ok(())
}
