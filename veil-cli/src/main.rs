//! Veil CLI
//!
//! Renders a demo scene through nested transparency layers and writes it to
//! a PNG. Useful for eyeballing compositing at different pixel ratios.

mod scene;

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use veil_common::warning::clear_warnings;

use scene::{RenderReport, SceneConfig};

/// Veil - render nested opacity and alpha-mask layers to an image
#[derive(Parser, Debug)]
#[command(name = "veil")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Render the default scene
    veil --output scene.png

    # Render for a 2x display with deeper nesting
    veil --output scene@2x.png --dpr 2 --depth 4

    # Use an image's alpha channel as the mask
    veil --output masked.png --mask mask.png

    # Print a JSON report of the render
    veil --output scene.png --json
"#)]
struct Cli {
    /// Where to write the rendered PNG
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Logical width of the scene
    #[arg(long, default_value = "320")]
    width: u32,

    /// Logical height of the scene
    #[arg(long, default_value = "240")]
    height: u32,

    /// Device pixel ratio (physical pixels per logical pixel)
    #[arg(long, default_value = "1.0")]
    dpr: f32,

    /// Opacity of each nested layer, 0.0 to 1.0
    #[arg(long, default_value = "0.6")]
    opacity: f32,

    /// Mask image; its alpha channel is used (default: horizontal gradient)
    #[arg(long, value_name = "FILE")]
    mask: Option<PathBuf>,

    /// Number of nested opacity layers
    #[arg(long, default_value = "3", value_parser = clap::value_parser!(u32).range(0..=16))]
    depth: u32,

    /// Print a JSON report instead of a summary line
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    clear_warnings();

    if !(0.0..=1.0).contains(&cli.opacity) {
        bail!("--opacity must be between 0.0 and 1.0, got {}", cli.opacity);
    }

    let config = SceneConfig {
        width: cli.width,
        height: cli.height,
        device_pixel_ratio: cli.dpr,
        opacity: cli.opacity,
        depth: cli.depth,
    };
    let panel = scene::mask_rect(&config);

    let (mask, mask_source) = match &cli.mask {
        Some(path) => (scene::load_mask(path)?, path.display().to_string()),
        None => (
            scene::gradient_mask(panel, cli.dpr)?,
            "gradient".to_string(),
        ),
    };

    let canvas = scene::render(&config, &mask)?;
    scene::save_png(&canvas, &cli.output)?;

    let (physical_width, physical_height) = canvas
        .pixel_buffer()
        .map_or((0, 0), |buffer| (buffer.width(), buffer.height()));
    let report = RenderReport {
        width: cli.width,
        height: cli.height,
        physical_width,
        physical_height,
        device_pixel_ratio: cli.dpr,
        opacity_layers: cli.depth,
        layer_opacity: cli.opacity,
        mask_rect: panel,
        mask_source,
        painted_pixels: scene::painted_pixels(&canvas),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} {} ({}x{} px, {} layers)",
            "Rendered".green().bold(),
            cli.output.display(),
            report.physical_width,
            report.physical_height,
            report.opacity_layers
        );
    }

    Ok(())
}
