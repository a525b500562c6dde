use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Politique d'encodage des couleurs SGR.
///
/// # Example
/// ```
/// use sg_core::config::Palette;
/// assert_eq!(Palette::default(), Palette::Auto);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum Palette {
    /// 256-color cube index when the color lies exactly on it, 24-bit otherwise.
    #[default]
    Auto,
    /// Always 24-bit `2;R;G;B`.
    TrueColor,
}

/// Space in which block partitions are averaged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum BlendSpace {
    /// Linear-light sRGB (default).
    #[default]
    Linear,
    /// CIE L*a*b*, perceptually uniform.
    Lab,
}

/// Paramètres du rendu d'une image.
///
/// # Example
/// ```
/// use sg_core::config::{RenderConfig, Palette};
/// let config = RenderConfig::default();
/// assert_eq!(config.palette, Palette::Auto);
/// assert!(!config.parallel);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RenderConfig {
    /// Color encoding policy.
    pub palette: Palette,
    /// Averaging space for the two partitions of a block.
    pub blend: BlendSpace,
    /// Render rows on the rayon pool. Output is identical either way.
    pub parallel: bool,
}

/// Upper bound for [`PlaybackConfig::min_frame_delay_ms`].
pub const MAX_FRAME_DELAY_MS: u64 = 1000;

/// Paramètres de lecture d'une animation.
///
/// # Example
/// ```
/// use sg_core::config::PlaybackConfig;
/// let config = PlaybackConfig::default();
/// assert_eq!(config.min_frame_delay_ms, 20);
/// assert_eq!(config.max_loops, None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlaybackConfig {
    /// Delay used for frames that declare none (delay 0), in milliseconds.
    pub min_frame_delay_ms: u64,
    /// Number of passes over the animation. `None` loops until stopped.
    pub max_loops: Option<u32>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            min_frame_delay_ms: 20,
            max_loops: None,
        }
    }
}

impl PlaybackConfig {
    /// Zero-delay substitute as a `Duration`.
    #[must_use]
    pub fn min_frame_delay(&self) -> Duration {
        Duration::from_millis(self.min_frame_delay_ms)
    }
}

/// Configuration complète, chargée depuis TOML.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Still-image and per-frame rendering.
    pub render: RenderConfig,
    /// Animation playback.
    pub playback: PlaybackConfig,
}

impl Config {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        if self.playback.min_frame_delay_ms > MAX_FRAME_DELAY_MS {
            log::warn!(
                "min_frame_delay_ms = {} ramené à {MAX_FRAME_DELAY_MS}",
                self.playback.min_frame_delay_ms
            );
            self.playback.min_frame_delay_ms = MAX_FRAME_DELAY_MS;
        }
        if self.playback.max_loops == Some(0) {
            log::warn!("max_loops = 0 ramené à 1");
            self.playback.max_loops = Some(1);
        }
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    render: Option<RenderSection>,
    playback: Option<PlaybackSection>,
}

/// Render section of the TOML config, all fields optional for partial override.
#[derive(Deserialize)]
struct RenderSection {
    palette: Option<Palette>,
    blend: Option<BlendSpace>,
    parallel: Option<bool>,
}

/// Playback section of the TOML config, all fields optional.
#[derive(Deserialize)]
struct PlaybackSection {
    min_frame_delay_ms: Option<u64>,
    max_loops: Option<u32>,
}

/// Parse TOML text and merge it over the defaults.
///
/// # Errors
/// Returns an error if the text is not valid TOML for this schema.
///
/// # Example
/// ```
/// use sg_core::config::{parse_config, BlendSpace};
/// let config = parse_config("[render]\nblend = \"Lab\"\n").unwrap();
/// assert_eq!(config.render.blend, BlendSpace::Lab);
/// assert_eq!(config.playback.min_frame_delay_ms, 20);
/// ```
pub fn parse_config(content: &str) -> Result<Config> {
    let file: ConfigFile = toml::from_str(content)
        .map_err(|e| CoreError::Config(e.message().to_string()))
        .context("Erreur de parsing TOML")?;

    let mut config = Config::default();

    if let Some(r) = file.render {
        if let Some(v) = r.palette {
            config.render.palette = v;
        }
        if let Some(v) = r.blend {
            config.render.blend = v;
        }
        if let Some(v) = r.parallel {
            config.render.parallel = v;
        }
    }

    if let Some(p) = file.playback {
        if let Some(v) = p.min_frame_delay_ms {
            config.playback.min_frame_delay_ms = v;
        }
        if p.max_loops.is_some() {
            config.playback.max_loops = p.max_loops;
        }
    }

    config.clamp_all();
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use sg_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("semigraph.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    let config =
        parse_config(&content).with_context(|| format!("Config invalide : {}", path.display()))?;
    log::debug!("Config chargée depuis {}", path.display());
    Ok(config)
}
