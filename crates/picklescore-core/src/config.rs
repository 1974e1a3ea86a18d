// Configuration loading and parsing (config/picklescore.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::session::teams::RosterSelection;

/// Config file name inside `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "picklescore.toml";

/// Storage key used when the config does not name one.
pub const DEFAULT_SLOT_KEY: &str = "picklescore_db_v1";

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
// Config structs
// ---------------------------------------------------------------------------

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub slot_key: String,
    pub seed_roster_path: String,
    pub roster_selection: RosterSelection,
    pub lock_completed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: default_db_path(),
            slot_key: DEFAULT_SLOT_KEY.to_string(),
            seed_roster_path: "data/players.csv".to_string(),
            roster_selection: RosterSelection::AvailableOnly,
            lock_completed: true,
        }
    }
}

/// Raw deserialization target for picklescore.toml. Every section is
/// optional; absent keys take the defaults above.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    storage: StorageSection,
    #[serde(default)]
    seed: SeedSection,
    #[serde(default)]
    teams: TeamsSection,
    #[serde(default)]
    scoring: ScoringSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct StorageSection {
    db_path: Option<String>,
    slot_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SeedSection {
    roster_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TeamsSection {
    available_only: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ScoringSection {
    lock_completed: Option<bool>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Parse config text without touching the filesystem.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let file: ConfigFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let defaults = Config::default();
    let roster_selection = match file.teams.available_only {
        Some(false) => RosterSelection::All,
        Some(true) => RosterSelection::AvailableOnly,
        None => defaults.roster_selection,
    };

    let config = Config {
        db_path: file.storage.db_path.unwrap_or(defaults.db_path),
        slot_key: file.storage.slot_key.unwrap_or(defaults.slot_key),
        seed_roster_path: file.seed.roster_path.unwrap_or(defaults.seed_roster_path),
        roster_selection,
        lock_completed: file.scoring.lock_completed.unwrap_or(defaults.lock_completed),
    };

    validate(&config)?;
    Ok(config)
}

/// Load and validate `config/picklescore.toml` relative to `base_dir`.
///
/// This does not copy defaults; prefer `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = std::fs::read_to_string(&path).map_err(|_| ConfigError::FileNotFound {
        path: path.clone(),
    })?;
    parse_config(&text, &path)
}

/// Copy `defaults/picklescore.toml` into `config/` if it is not there yet.
/// Returns the list of files that were copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");
    let source = defaults_dir.join(CONFIG_FILE);
    let target = config_dir.join(CONFIG_FILE);

    if target.exists() {
        return Ok(vec![]);
    }
    if !source.exists() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither {} nor {} found; run from the project root or ensure defaults/ is present",
                target.display(),
                source.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;
    std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {}: {e}", source.display()),
    })?;

    Ok(vec![target])
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures the default config file is copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

/// `picklescore.db` in the platform data directory, or the working
/// directory when no home directory can be resolved.
fn default_db_path() -> String {
    directories::ProjectDirs::from("", "", "picklescore")
        .map(|dirs| dirs.data_dir().join("picklescore.db"))
        .unwrap_or_else(|| PathBuf::from("picklescore.db"))
        .to_string_lossy()
        .into_owned()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let required: &[(&str, &str)] = &[
        ("storage.db_path", config.db_path.as_str()),
        ("storage.slot_key", config.slot_key.as_str()),
        ("seed.roster_path", config.seed_roster_path.as_str()),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: field.to_string(),
                message: "must not be empty".into(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
