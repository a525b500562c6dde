use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sg_anim::compositor::Animation;
use sg_anim::player::{spawn_playback, stop_channel};
use sg_blocks::render::render_with;
use sg_core::config::Config;
use sg_source::Input;

pub mod cli;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging (stderr, jamais stdout)
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Charger la config + overrides CLI
    let config = cli.resolve_config()?;

    // 4. Décoder l'entrée
    let input = Input::detect(&cli.path)?;

    match input {
        Input::Still(bitmap) => {
            let text = render_with(&bitmap, &config.render);
            if !cli.noprint {
                let mut out = std::io::stdout().lock();
                out.write_all(text.as_bytes())?;
                out.write_all(b"\n")?;
                out.flush()?;
            }
            Ok(())
        }
        Input::Animated(container) => {
            let animation = Animation::composite(&container, &config.render)
                .with_context(|| format!("Animation invalide : {}", cli.path.display()))?;
            if cli.noprint {
                log::info!("{} frames rendues, lecture ignorée", animation.len());
                return Ok(());
            }
            play(animation, &config)
        }
    }
}

/// Play until Ctrl-C or the configured number of passes.
fn play(animation: Animation, config: &Config) -> Result<()> {
    // Le handler est en place avant la première écriture.
    let (stop, signal) = stop_channel();
    let stopper = stop.clone();
    ctrlc::set_handler(move || stopper.stop()).context("Impossible d'installer le handler Ctrl-C")?;

    let playback = spawn_playback(Arc::new(animation), config.playback.clone(), stop, signal)
        .context("Impossible de lancer la lecture")?;
    playback.join().context("Erreur d'écriture pendant la lecture")
}
