//! Renderer-wide configuration (§9 ambient stack): loads a `map.toml` the
//! way the teacher's `core-config` loads `oxidized.toml` — a
//! `#[derive(Deserialize)]` file shape with `#[serde(default = "...")]`
//! fallbacks, an effective `RenderConfig` computed from it plus a runtime
//! `RenderConfigContext` (viewport size), and a `discover()`/`load_from()`
//! pair that prefers a local working-directory file before falling back to
//! the platform config directory.
//!
//! Nothing here is mandated by spec.md — it is the ambient concern every
//! complete renderer needs (default gamma, default resampling filter, mesh
//! granularity, style-buffer padding, cancellation poll granularity) and
//! which a consumer would otherwise have to hardcode at every call site.

use std::{fs, path::PathBuf};

use anyhow::Result;
use serde::Deserialize;
use tracing::info;

use core_raster::Gamma;
use core_resample::Filter;

#[derive(Debug, Deserialize, Clone)]
pub struct RasterConfig {
    #[serde(default = "RasterConfig::default_gamma_power")]
    pub gamma_power: f64,
}

impl RasterConfig {
    const fn default_gamma_power() -> f64 {
        1.0
    }

    pub fn gamma(&self) -> Gamma {
        Gamma::Power(self.gamma_power)
    }
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self { gamma_power: Self::default_gamma_power() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResampleConfig {
    #[serde(default = "ResampleConfig::default_filter")]
    pub filter: String,
    #[serde(default = "ResampleConfig::default_mesh_size")]
    pub mesh_size: u32,
}

impl ResampleConfig {
    fn default_filter() -> String {
        "bilinear".to_string()
    }

    const fn default_mesh_size() -> u32 {
        core_resample::DEFAULT_MESH_SIZE
    }

    /// Maps the configured filter name onto a `core_resample::Filter`,
    /// falling back to the default (with a warning) on an unrecognized
    /// name rather than treating it as a `BadInput` parse failure — a
    /// typo'd filter name shouldn't abort the whole render (§7).
    pub fn filter(&self) -> Filter {
        match self.filter.to_ascii_lowercase().as_str() {
            "near" | "nearest" => Filter::Near,
            "bilinear" => Filter::Bilinear,
            "bicubic" => Filter::Bicubic,
            "spline16" => Filter::Spline16,
            "spline36" => Filter::Spline36,
            "hanning" => Filter::Hanning,
            "hamming" => Filter::Hamming,
            "hermite" => Filter::Hermite,
            "kaiser" => Filter::Kaiser,
            "quadric" => Filter::Quadric,
            "catrom" => Filter::Catrom,
            "gaussian" => Filter::Gaussian,
            "bessel" => Filter::Bessel,
            "mitchell" => Filter::Mitchell,
            "sinc" => Filter::Sinc,
            "lanczos" => Filter::Lanczos,
            "blackman" => Filter::Blackman,
            other => {
                tracing::warn!(target: "config", filter = other, "unknown resampling filter, falling back to bilinear");
                Filter::Bilinear
            }
        }
    }
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self { filter: Self::default_filter(), mesh_size: Self::default_mesh_size() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderSectionConfig {
    #[serde(default = "RenderSectionConfig::default_buffer_size")]
    pub buffer_size: u32,
    #[serde(default = "RenderSectionConfig::default_poll_interval")]
    pub cancellation_poll_interval: u32,
}

impl RenderSectionConfig {
    const fn default_buffer_size() -> u32 {
        0
    }

    const fn default_poll_interval() -> u32 {
        1
    }
}

impl Default for RenderSectionConfig {
    fn default() -> Self {
        Self { buffer_size: Self::default_buffer_size(), cancellation_poll_interval: Self::default_poll_interval() }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub raster: RasterConfig,
    #[serde(default)]
    pub resample: ResampleConfig,
    #[serde(default)]
    pub render: RenderSectionConfig,
}

/// Viewport-dependent context the effective configuration is clamped
/// against, mirroring the teacher's `ConfigContext` (there: viewport rows;
/// here: pixel extent and device scale factor).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfigContext {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
}

impl RenderConfigContext {
    pub fn new(width: u32, height: u32, scale_factor: f64) -> Self {
        Self { width, height, scale_factor }
    }
}

/// The effective, immediately-usable configuration a `Renderer` consumes,
/// derived from `ConfigFile` plus a `RenderConfigContext` (§9: the teacher's
/// `apply_context` clamp, generalized from "vertical scroll margin" to
/// "mesh size / buffer padding capped by the current viewport").
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub raw: Option<String>,
    pub file: ConfigFile,
    pub effective_mesh_size: u32,
    pub effective_buffer_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let file = ConfigFile::default();
        Self {
            raw: None,
            effective_mesh_size: file.resample.mesh_size,
            effective_buffer_size: file.render.buffer_size,
            file,
        }
    }
}

impl RenderConfig {
    pub fn gamma(&self) -> Gamma {
        self.file.raster.gamma()
    }

    pub fn filter(&self) -> Filter {
        self.file.resample.filter()
    }

    pub fn cancellation_poll_interval(&self) -> u32 {
        self.file.render.cancellation_poll_interval.max(1)
    }

    /// Recomputes the viewport-clamped fields. A mesh cell wider or taller
    /// than the viewport itself is nonsensical, so it is clamped down to
    /// the smaller of the two dimensions; buffer padding is clamped the
    /// same way a filter radius is clamped to the style buffer in
    /// `core-render`.
    pub fn apply_context(&mut self, ctx: RenderConfigContext) {
        let smallest_dim = ctx.width.min(ctx.height).max(1);
        let raw_mesh = self.file.resample.mesh_size.max(1);
        let clamped_mesh = raw_mesh.min(smallest_dim);
        if clamped_mesh != raw_mesh {
            info!(target: "config", raw_mesh, clamped_mesh, width = ctx.width, height = ctx.height, "mesh_size_clamped");
        }
        self.effective_mesh_size = clamped_mesh;
        self.effective_buffer_size = self.file.render.buffer_size.min(smallest_dim);
    }
}

/// Best-effort config path following platform conventions (XDG / AppData
/// Roaming), preferring a local working-directory file first (§9, mirrors
/// the teacher's `discover()`).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("map.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("map-renderer").join("map.toml");
    }
    PathBuf::from("map.toml")
}

/// Loads and parses the configuration at `path` (or the value of
/// `discover()` when `None`). A missing or unparseable file falls back to
/// `RenderConfig::default()` rather than surfacing a `BadInput` error — the
/// renderer always has a usable configuration, matching §7's "a partially
/// styled map is always produced" policy extended to configuration itself.
pub fn load_from(path: Option<PathBuf>) -> Result<RenderConfig> {
    let path = path.unwrap_or_else(discover);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Ok(RenderConfig::default()),
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Ok(RenderConfig {
            raw: Some(content),
            effective_mesh_size: file.resample.mesh_size,
            effective_buffer_size: file.render.buffer_size,
            file,
        }),
        Err(e) => {
            tracing::warn!(target: "config", path = %path.display(), error = %e, "failed to parse config, using defaults");
            Ok(RenderConfig::default())
        }
    }
}
