use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for algorhythm.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (ALGO_* prefix)
/// 3. Config file (~/.config/algorhythm/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// JSON catalog of artists, tracks and playlists.
    ///
    /// Can be set via:
    /// - CLI: --catalog /path/to/catalog.json
    /// - ENV: ALGO_CATALOG_PATH
    /// - Default: ~/.local/share/algorhythm/catalog.json
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Base URL of the audio-feature service. When unset, features come
    /// from the catalog.
    ///
    /// Can be set via:
    /// - ENV: ALGO_FEATURES_API_BASE
    #[serde(default)]
    pub features_api_base: Option<String>,

    /// Tuning tables overriding the built-in defaults.
    ///
    /// Can be set via:
    /// - CLI: --tuning /path/to/tuning.toml
    /// - ENV: ALGO_TUNING_PATH
    #[serde(default)]
    pub tuning_path: Option<PathBuf>,

    #[serde(default)]
    pub logging: twyg::Opts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            features_api_base: None,
            tuning_path: None,
            logging: twyg::Opts::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default file and environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from `config_path` (when it exists) layered with
    /// `ALGO_*` environment variables.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("algo");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;
        Ok(config)
    }
}

fn default_catalog_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("algorhythm")
        .join("catalog.json")
}

/// Returns:
/// - Linux: ~/.config/algorhythm/config.toml
/// - macOS: ~/Library/Application Support/algorhythm/config.toml
/// - Windows: %APPDATA%\algorhythm\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("algorhythm")
        .join("config.toml")
}

pub fn example_config() -> &'static str {
    r#"# Algorhythm Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (ALGO_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# JSON catalog of artists, tracks (with audio features) and playlists
#
# Can also be set via:
# - CLI: algorhythm --catalog /custom/catalog.json dna p1
# - Environment: ALGO_CATALOG_PATH=/custom/catalog.json
#
# Default: Platform-specific data directory
#catalog_path = "/path/to/catalog.json"

# Audio-feature service. When set, features are fetched over HTTP instead of
# being read from the catalog.
#
# Can also be set via:
# - Environment: ALGO_FEATURES_API_BASE=https://api.reccobeats.com/v1
#features_api_base = "https://api.reccobeats.com/v1"

# Tuning tables (feature ranges, baselines, genre adjacency, crawler and
# matcher constants). Omitted sections keep the built-in defaults.
#
# Can also be set via:
# - CLI: algorhythm --tuning config/tuning.toml ...
# - Environment: ALGO_TUNING_PATH=config/tuning.toml
#tuning_path = "config/tuning.toml"

# Logging options (twyg). Defaults to coloured output at info level.
#[logging]
#coloured = true
#level = "debug"
"#
}

/// Write `example_config()` to `config_path` unless it already exists.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file_at(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

/// Create the default config file if it doesn't exist.
pub fn ensure_config_file() -> Result<bool> {
    ensure_config_file_at(&config_file_path())
}
