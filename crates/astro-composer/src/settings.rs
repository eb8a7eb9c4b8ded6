//! Settings resolution for the command line.
//!
//! Settings come from a JSON or YAML file (the format the editor host persists)
//! and are then overridden by `COMPOSER_*` environment variables for the scalar
//! knobs, e.g. `COMPOSER_DATE_FORMAT` or `COMPOSER_ADD_TRAILING_SLASH=true`.

use composer_core::{ComposerSettings, Error, Result};
use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "COMPOSER";

/// Settings file looked up in the vault root when none is given
pub const DEFAULT_SETTINGS_FILE: &str = "astro-composer.json";

fn config_error(e: ConfigError) -> Error {
    Error::config_error(e.to_string())
}

/// Scalar settings that can be overridden outside the settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SettingsOverrides {
    pub date_format: Option<String>,
    pub add_trailing_slash: Option<bool>,
    pub process_new_files: Option<bool>,
    pub self_write_ttl_secs: Option<u64>,
    pub debounce_ms: Option<u64>,
    pub log_level: Option<String>,
}

impl SettingsOverrides {
    /// Read `COMPOSER_*` variables from the process environment
    pub fn from_env() -> Result<Self> {
        let config = Config::builder()
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(config_error)?;
        Self::from_config(config)
    }

    /// Extract overrides from an already built configuration
    pub fn from_config(config: Config) -> Result<Self> {
        config.try_deserialize().map_err(config_error)
    }

    pub fn apply(self, settings: &mut ComposerSettings) {
        if let Some(date_format) = self.date_format {
            settings.date_format = date_format;
        }
        if let Some(add_trailing_slash) = self.add_trailing_slash {
            settings.add_trailing_slash = add_trailing_slash;
        }
        if let Some(process_new_files) = self.process_new_files {
            settings.process_new_files = process_new_files;
        }
        if let Some(ttl) = self.self_write_ttl_secs {
            settings.self_write_ttl_secs = ttl;
        }
        if let Some(debounce_ms) = self.debounce_ms {
            settings.debounce_ms = debounce_ms;
        }
        if let Some(log_level) = self.log_level {
            settings.log_level = log_level;
        }
    }
}

/// Settings file to use: the explicit one, else the vault's default file if present
pub fn settings_path(explicit: Option<&Path>, vault: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    vault
        .map(|root| root.join(DEFAULT_SETTINGS_FILE))
        .filter(|candidate| candidate.is_file())
}

/// Load settings from an optional file, then apply environment overrides
pub fn load_settings(path: Option<&Path>) -> Result<ComposerSettings> {
    let mut settings = match path {
        Some(path) => {
            log::debug!("Loading settings from {}", path.display());
            ComposerSettings::load(path)?
        }
        None => {
            log::debug!("No settings file; using defaults");
            ComposerSettings::default()
        }
    };
    SettingsOverrides::from_env()?.apply(&mut settings);
    Ok(settings)
}

/// Expand `~` and environment variables in a vault path and make it absolute
pub fn expand_vault_path(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw)
        .map_err(|e| Error::invalid_path(format!("Failed to expand path: {}", e)))?;
    let path = PathBuf::from(expanded.as_ref());

    if !path.is_dir() {
        return Err(Error::invalid_path(format!(
            "Vault directory does not exist: {}",
            path.display()
        )));
    }
    path.canonicalize()
        .map_err(|e| Error::invalid_path(format!("Failed to resolve path: {}", e)))
}
