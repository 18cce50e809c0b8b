//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG path →
//! system path → preset.

use std::path::{Path, PathBuf};

/// Where the sampling config was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/rarecrowds/.
    SystemConfig,

    /// No file; a named preset is used.
    #[default]
    Preset,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::Preset => write!(f, "preset"),
        }
    }
}

/// Discovered sampling config path.
#[derive(Debug, Clone, Default)]
pub struct SamplingPath {
    /// Path to sampling.json (or None if not found).
    pub path: Option<PathBuf>,

    pub source: ConfigSource,
}

/// Environment variable names.
pub const ENV_SAMPLING_PATH: &str = "RC_SAMPLING";
pub const ENV_CONFIG_DIR: &str = "RC_CONFIG_DIR";

const SAMPLING_FILENAME: &str = "sampling.json";

/// Application name for XDG directories.
const APP_NAME: &str = "rarecrowds";

/// Resolve the sampling config path.
///
/// 1. Explicit CLI path (if it exists)
/// 2. `RC_SAMPLING`
/// 3. `RC_CONFIG_DIR` + `sampling.json`
/// 4. XDG config directory (`~/.config/rarecrowds/`)
/// 5. System config (`/etc/rarecrowds/`)
/// 6. None: the caller falls back to a preset
pub fn resolve_sampling(cli_path: Option<&Path>) -> SamplingPath {
    if let Some(path) = cli_path {
        if path.exists() {
            return found(path.to_path_buf(), ConfigSource::CliArgument);
        }
    }

    if let Ok(env_path) = std::env::var(ENV_SAMPLING_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return found(path, ConfigSource::Environment);
        }
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(SAMPLING_FILENAME);
        if path.exists() {
            return found(path, ConfigSource::Environment);
        }
    }

    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(SAMPLING_FILENAME);
        if path.exists() {
            return found(path, ConfigSource::XdgConfig);
        }
    }

    let system_path = system_config_dir().join(SAMPLING_FILENAME);
    if system_path.exists() {
        return found(system_path, ConfigSource::SystemConfig);
    }

    SamplingPath::default()
}

fn found(path: PathBuf, source: ConfigSource) -> SamplingPath {
    SamplingPath {
        path: Some(path),
        source,
    }
}

/// Get the XDG config directory for rarecrowds.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}
