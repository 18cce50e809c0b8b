//! Sampling configuration loading for the CLI.
//!
//! Resolution order (highest to lowest priority):
//! 1. Explicit `--config` file
//! 2. Explicit `--preset`
//! 3. `sampling.json` found by [`rc_config::resolve_sampling`]
//! 4. The `default` preset

use rc_common::Result;
use rc_config::{
    get_preset, resolve_sampling, validate_sampling, ConfigSource, PresetName, SamplingConfig,
    SamplingPath, SamplingSnapshot,
};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::logging::event_names;

/// Options for loading the sampling configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    pub sampling_path: Option<PathBuf>,
    pub preset: Option<PresetName>,
}

/// The effective, validated configuration plus its provenance.
#[derive(Debug, Clone)]
pub struct ResolvedSampling {
    pub config: SamplingConfig,
    pub snapshot: SamplingSnapshot,
}

pub fn load_sampling(options: &ConfigOptions) -> Result<ResolvedSampling> {
    let (config, resolved, preset) = match (&options.sampling_path, options.preset) {
        (Some(path), _) => {
            let resolved = SamplingPath {
                path: Some(path.clone()),
                source: ConfigSource::CliArgument,
            };
            (SamplingConfig::from_file(path)?, resolved, None)
        }
        (None, Some(name)) => (get_preset(name), SamplingPath::default(), Some(name)),
        (None, None) => {
            let resolved = resolve_sampling(None);
            match &resolved.path {
                Some(path) => (SamplingConfig::from_file(path)?, resolved.clone(), None),
                None => (
                    get_preset(PresetName::Default),
                    resolved,
                    Some(PresetName::Default),
                ),
            }
        }
    };

    validate_sampling(&config)?;

    match preset {
        Some(name) => debug!(
            event = event_names::CONFIG_PRESET_USED,
            preset = name.as_str(),
            "using sampling preset"
        ),
        None => info!(
            event = event_names::CONFIG_LOADED,
            source = %resolved.source,
            path = ?resolved.path,
            "sampling config loaded"
        ),
    }

    let snapshot = SamplingSnapshot::new(&config, &resolved, preset.map(|p| p.as_str()));
    Ok(ResolvedSampling { config, snapshot })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_common::Error;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn explicit_file_wins_over_preset() {
        let file = write_temp(r#"{"imprecision": 3, "noise_ratio": 0.5}"#);
        let options = ConfigOptions {
            sampling_path: Some(file.path().to_path_buf()),
            preset: Some(PresetName::Ideal),
        };
        let loaded = load_sampling(&options).unwrap();
        assert_eq!(loaded.config.imprecision, 3);
        assert_eq!(loaded.snapshot.source, "CLI argument");
        assert!(loaded.snapshot.preset.is_none());
    }

    #[test]
    fn preset_is_recorded_in_snapshot() {
        let options = ConfigOptions {
            sampling_path: None,
            preset: Some(PresetName::Impre2),
        };
        let loaded = load_sampling(&options).unwrap();
        assert_eq!(loaded.config.imprecision, 2);
        assert_eq!(loaded.snapshot.preset.as_deref(), Some("impre2"));
        assert_eq!(loaded.snapshot.source, "preset");
    }

    #[test]
    fn invalid_file_is_config_error() {
        let file = write_temp(r#"{"noise_ratio": 2.0}"#);
        let options = ConfigOptions {
            sampling_path: Some(file.path().to_path_buf()),
            preset: None,
        };
        let err = load_sampling(&options).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn missing_file_is_error() {
        let options = ConfigOptions {
            sampling_path: Some(PathBuf::from("/nonexistent/sampling.json")),
            preset: None,
        };
        assert!(load_sampling(&options).is_err());
    }
}
