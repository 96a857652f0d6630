// Configuration loading and parsing (drafter.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use hm_drafter_api::{ApiConfig, DEFAULT_BASE_URL};
use hm_drafter_core::draft::DraftRng;
use hm_drafter_core::model::ALT_NAME_SLUG;

pub const CONFIG_FILE: &str = "drafter.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// drafter.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub tournament: TournamentSection,
    #[serde(default)]
    pub draft: DraftSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    pub base_url: String,
    pub timeout_secs: u64,
    pub read_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        ApiSection {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            read_attempts: 3,
            retry_backoff_ms: 250,
        }
    }
}

/// Which events the console offers at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TournamentSection {
    pub scene: String,
    pub listing_limit: usize,
}

impl Default for TournamentSection {
    fn default() -> Self {
        TournamentSection {
            scene: "kqpdx".to_string(),
            listing_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DraftSection {
    /// Fixed RNG seed for reproducible draft orders. Unset means clock-seeded.
    pub seed: Option<u64>,
    /// Form-field slug holding a player's alternate name.
    pub alt_name_slug: String,
    /// Deadline for commands that call the tournament API.
    pub command_deadline_secs: u64,
}

impl Default for DraftSection {
    fn default() -> Self {
        DraftSection {
            seed: None,
            alt_name_slug: ALT_NAME_SLUG.to_string(),
            command_deadline_secs: 15,
        }
    }
}

impl Config {
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.api.base_url.clone(),
            timeout: Duration::from_secs(self.api.timeout_secs),
            read_attempts: self.api.read_attempts,
            retry_backoff: Duration::from_millis(self.api.retry_backoff_ms),
        }
    }

    pub fn command_deadline(&self) -> Duration {
        Duration::from_secs(self.draft.command_deadline_secs)
    }

    pub fn draft_rng(&self) -> DraftRng {
        match self.draft.seed {
            Some(seed) => DraftRng::seeded(seed),
            None => DraftRng::from_clock(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load `config/drafter.toml` relative to `base_dir` without copying
/// defaults. Prefer `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config = parse_config(&text, &path)?;
    validate(&config)?;
    Ok(config)
}

pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Make sure `config/drafter.toml` exists, seeding it from
/// `defaults/drafter.toml` the first time. Returns the path written, or
/// `None` when the operator already has a config file.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.is_file() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join(CONFIG_FILE);
    if !source.is_file() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "no {CONFIG_FILE} in config/ or defaults/ under {}",
                base_dir.display()
            ),
        });
    }

    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", dir.display()),
        })?;
    }
    std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {} to {}: {e}", source.display(), target.display()),
    })?;

    Ok(Some(target))
}

/// Load config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    if let Some(path) = ensure_config_file(&cwd)? {
        info!("Seeded {} from defaults", path.display());
    }
    load_config_from(&cwd)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.api.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "api.base_url".into(),
            message: "must not be empty".into(),
        });
    }

    let positive: &[(&str, u64)] = &[
        ("api.timeout_secs", config.api.timeout_secs),
        ("api.read_attempts", u64::from(config.api.read_attempts)),
        ("tournament.listing_limit", config.tournament.listing_limit as u64),
        ("draft.command_deadline_secs", config.draft.command_deadline_secs),
    ];
    for (name, val) in positive {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    if config.draft.alt_name_slug.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "draft.alt_name_slug".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
