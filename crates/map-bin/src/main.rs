//! `map-renderer` entrypoint: wires `core-config`'s configuration discovery,
//! `tracing`-based logging, and `core-render`'s `Renderer` together to
//! rasterize a demo scene (or one of spec.md §8's S1-S6 scenarios) to a PNG
//! file — the `ox-bin` analogue for this workspace.

mod scenes;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use core_config::RenderConfigContext;
use core_font::StubFontEngine;
use core_render::{Renderer, RendererSettings};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

/// Render a demo scene to a PNG file.
#[derive(Parser, Debug)]
#[command(name = "map-renderer", version, about = "Thematic map renderer demo")]
struct Args {
    /// Which built-in scene to render: s1, s2, s3, s4, or demo-city.
    #[arg(long, default_value = "demo-city")]
    scene: String,

    /// Output PNG path.
    #[arg(long, default_value = "out.png")]
    out: PathBuf,

    /// Optional configuration file path (overrides discovery of `map.toml`).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("map-renderer.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }
    let file_appender = tracing_appender::rolling::never(log_dir, "map-renderer.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(()) => Some(guard),
        Err(_) => None,
    }
}

fn main() -> Result<()> {
    let _log_guard = configure_logging();
    let args = Args::parse();

    let Some(map) = scenes::by_name(&args.scene) else {
        bail!("unknown scene {:?}; choose one of: s1, s2, s3, s4, demo-city", args.scene);
    };

    let mut config = core_config::load_from(args.config.clone())?;
    config.apply_context(RenderConfigContext::new(map.width, map.height, 1.0));
    info!(
        target: "runtime",
        scene = args.scene.as_str(),
        width = map.width,
        height = map.height,
        mesh_size = config.effective_mesh_size,
        "render_start"
    );

    let fonts = StubFontEngine;
    let settings = RendererSettings { curve_tolerance: 0.25, gamma: config.gamma() };
    let renderer = Renderer::new(&fonts).with_settings(settings);

    let mut image_buffer = renderer.render(&map).context("rendering failed")?;
    image_buffer.demultiply();

    let rgba: Vec<u8> = image_buffer
        .pixels()
        .iter()
        .flat_map(|p| [p.r, p.g, p.b, p.a])
        .collect();
    let png = image::RgbaImage::from_raw(image_buffer.width(), image_buffer.height(), rgba)
        .context("pixel buffer size did not match width*height*4")?;
    png.save(&args.out).with_context(|| format!("failed to write {}", args.out.display()))?;

    info!(target: "runtime", path = %args.out.display(), "render_complete");
    Ok(())
}
