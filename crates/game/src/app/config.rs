use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use super::puzzle::{BoardGeometry, LevelTable, LevelTableError};

pub(crate) const CONFIG_ENV_VAR: &str = "SLIDE_PUZZLE_CONFIG";
pub(crate) const CONFIG_FILE_NAME: &str = "puzzle.json";

/// Tunables for the board and the rules. Every field has a default, so a
/// config file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PuzzleConfig {
    pub(crate) level_tile_counts: Vec<u32>,
    pub(crate) image_size: u32,
    pub(crate) snap_tolerance_px: i32,
    pub(crate) scatter_gap_px: i32,
    pub(crate) scatter_margin_px: i32,
    pub(crate) countdown_base_seconds: u32,
    pub(crate) countdown_per_level_seconds: u32,
    pub(crate) score_per_level: u32,
    pub(crate) board_width: u32,
    pub(crate) board_height: u32,
    pub(crate) board_vertical_reserve_px: u32,
    pub(crate) border_overlay_size: u32,
    pub(crate) thumbnail_size: u32,
    pub(crate) shuffle_seed: Option<u64>,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            level_tile_counts: vec![4, 9, 16, 25],
            image_size: 400,
            snap_tolerance_px: 50,
            scatter_gap_px: 20,
            scatter_margin_px: 20,
            countdown_base_seconds: 60,
            countdown_per_level_seconds: 20,
            score_per_level: 3,
            board_width: 1600,
            board_height: 900,
            board_vertical_reserve_px: 50,
            border_overlay_size: 700,
            thumbnail_size: 200,
            shuffle_seed: None,
        }
    }
}

impl PuzzleConfig {
    pub(crate) fn level_table(&self) -> Result<LevelTable, LevelTableError> {
        LevelTable::new(self.level_tile_counts.clone())
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config '{path}' at {json_path}: {source}")]
    Parse {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid level table: {0}")]
    Levels(#[from] LevelTableError),
    #[error("validation failed at {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

/// Loads the config named by `SLIDE_PUZZLE_CONFIG`, else `assets/puzzle.json`,
/// else the defaults. An explicitly named file must exist.
pub(crate) fn load_config(assets_dir: &Path) -> Result<PuzzleConfig, ConfigError> {
    let explicit = match env::var(CONFIG_ENV_VAR) {
        Ok(value) => Some(PathBuf::from(value)),
        Err(env::VarError::NotPresent) => None,
        Err(source) => {
            return Err(ConfigError::EnvVar {
                var: CONFIG_ENV_VAR,
                source,
            })
        }
    };
    load_config_from(explicit, assets_dir)
}

fn load_config_from(
    explicit: Option<PathBuf>,
    assets_dir: &Path,
) -> Result<PuzzleConfig, ConfigError> {
    let (path, required) = match explicit {
        Some(path) => (path, true),
        None => (assets_dir.join(CONFIG_FILE_NAME), false),
    };
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound && !required => {
            info!(path = %path.display(), "config_default");
            let config = PuzzleConfig::default();
            validate_config(&config)?;
            return Ok(config);
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };
    let config = parse_config(&raw, &path)?;
    validate_config(&config)?;
    info!(
        path = %path.display(),
        levels = config.level_tile_counts.len(),
        snap_tolerance_px = config.snap_tolerance_px,
        "config_loaded"
    );
    Ok(config)
}

pub(crate) fn parse_config(raw: &str, path: &Path) -> Result<PuzzleConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, PuzzleConfig>(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        ConfigError::Parse {
            path: path.to_path_buf(),
            json_path,
            source: error.into_inner(),
        }
    })
}

fn invalid(field: &'static str, expected: &str, actual: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: format!("expected {expected}, got {actual}"),
    }
}

pub(crate) fn validate_config(config: &PuzzleConfig) -> Result<(), ConfigError> {
    let levels = config.level_table()?;
    if config.image_size == 0 {
        return Err(invalid("image_size", "a positive size", config.image_size));
    }
    if let Some(side) = levels.max_grid_side() {
        if side > config.image_size {
            return Err(invalid(
                "level_tile_counts",
                "a grid side no larger than image_size",
                side,
            ));
        }
    }
    if config.snap_tolerance_px <= 0 {
        return Err(invalid(
            "snap_tolerance_px",
            "a positive tolerance",
            config.snap_tolerance_px,
        ));
    }
    if config.scatter_gap_px < 0 {
        return Err(invalid("scatter_gap_px", "zero or more", config.scatter_gap_px));
    }
    if config.scatter_margin_px < 0 {
        return Err(invalid(
            "scatter_margin_px",
            "zero or more",
            config.scatter_margin_px,
        ));
    }
    if config.board_width < config.image_size {
        return Err(invalid(
            "board_width",
            "at least image_size",
            config.board_width,
        ));
    }
    if config.board_height < config.image_size + config.board_vertical_reserve_px {
        return Err(invalid(
            "board_height",
            "at least image_size plus board_vertical_reserve_px",
            config.board_height,
        ));
    }
    if config.thumbnail_size == 0 {
        return Err(invalid("thumbnail_size", "a positive size", config.thumbnail_size));
    }
    if let Some(side) = levels.max_grid_side() {
        validate_scatter(&BoardGeometry::from_config(config), side)?;
    }
    Ok(())
}

/// The largest level's scatter grid must fit on the board left of the target.
fn validate_scatter(geometry: &BoardGeometry, side: u32) -> Result<(), ConfigError> {
    let scatter = geometry.scatter_rect(side);
    let frame = geometry.frame_rect();
    if scatter.intersects(&geometry.target_rect()) {
        return Err(invalid(
            "scatter_gap_px",
            "a scatter grid clear of the target square",
            format!("scatter right edge {}", scatter.right()),
        ));
    }
    if scatter.x < frame.x
        || scatter.y < frame.y
        || scatter.right() > frame.right()
        || scatter.bottom() > frame.bottom()
    {
        return Err(invalid(
            "scatter_margin_px",
            "a scatter grid inside the board",
            format!("{scatter:?}"),
        ));
    }
    Ok(())
}
