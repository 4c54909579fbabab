use engine::{resolve_app_paths, AudioOutput, LoopConfig, Scene, StartupError};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::catalog::all_cue_sounds;
use super::config::{load_config, ConfigError};
use super::flow::{PuzzleApp, WINDOW_TITLE};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
    pub(crate) audio: AudioOutput,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Slide Puzzle Startup ===");

    let paths = resolve_app_paths()?;
    info!(root = %paths.root.display(), "app_root_resolved");
    let puzzle_config = load_config(&paths.assets_dir)?;

    let scene = PuzzleApp::new(&puzzle_config, paths.images_dir.clone())
        .map_err(|error| BootstrapError::Config(error.into()))?;

    let mut audio = AudioOutput::open(paths.sounds_dir.clone());
    for key in all_cue_sounds() {
        if let Err(error) = audio.preload(&key) {
            warn!(sound = key.as_str(), error = %error, "sound_unavailable");
        }
    }
    info!(enabled = audio.is_enabled(), "audio_ready");

    let config = LoopConfig {
        window_title: WINDOW_TITLE.to_string(),
        window_width: puzzle_config.board_width,
        window_height: puzzle_config.board_height,
        ..LoopConfig::default()
    };

    Ok(AppWiring {
        config,
        scene: Box::new(scene),
        audio,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
