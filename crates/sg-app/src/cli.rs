use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use sg_core::config::{BlendSpace, Config, Palette, load_config};

/// semigraph : affiche images et GIF dans le terminal en semigraphie octant.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Image fixe (PNG, JPEG, BMP) ou GIF animé.
    pub path: PathBuf,

    /// Fichier de configuration TOML. Absent : valeurs par défaut.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Toujours émettre des couleurs 24 bits.
    #[arg(long, default_value_t = false)]
    pub truecolor: bool,

    /// Moyenner les couleurs dans l'espace CIE L*a*b*.
    #[arg(long, default_value_t = false)]
    pub lab: bool,

    /// Rendre les lignes en parallèle.
    #[arg(long, default_value_t = false)]
    pub parallel: bool,

    /// Nombre de passes sur l'animation (défaut : jusqu'à Ctrl-C).
    #[arg(long)]
    pub loops: Option<u32>,

    /// Rendre sans rien écrire sur stdout.
    #[arg(long, default_value_t = false)]
    pub noprint: bool,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Load `--config`, falling back to defaults when the file is missing.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed.
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = if self.config.exists() {
            load_config(&self.config)?
        } else {
            log::warn!(
                "Config introuvable : {}. Utilisation des défauts.",
                self.config.display()
            );
            Config::default()
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    /// Flags given on the command line win over the file.
    pub fn apply_overrides(&self, config: &mut Config) {
        if self.truecolor {
            config.render.palette = Palette::TrueColor;
        }
        if self.lab {
            config.render.blend = BlendSpace::Lab;
        }
        if self.parallel {
            config.render.parallel = true;
        }
        if self.loops.is_some() {
            config.playback.max_loops = self.loops;
        }
        config.clamp_all();
    }
}
