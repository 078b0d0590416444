//! Configuration loading
//!
//! Loads an [`EngineConfig`] from a TOML file with environment overrides.
//! Variables use the `SENTIMENT` prefix and `__` as the nesting separator,
//! e.g. `SENTIMENT__AGGREGATOR__MIN_DATA_POINTS=3`.

use anyhow::{Context, Result};
use config_crate::{Config, Environment, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::components::EngineConfig;

/// Environment prefix for overrides
pub const ENV_PREFIX: &str = "SENTIMENT";

impl EngineConfig {
    /// Load from `path` with environment overrides, then validate
    pub fn load(path: &Path) -> Result<Self> {
        let builder = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(true))
            .add_source(env_source());

        let config: EngineConfig = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        info!("Loaded engine configuration from {}", path.display());
        Ok(config)
    }

    /// Defaults plus environment overrides, without a file
    pub fn from_env() -> Result<Self> {
        let config: EngineConfig = Config::builder()
            .add_source(env_source())
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate().context("Invalid environment configuration")?;
        Ok(config)
    }

    /// Render as TOML, e.g. to seed a config file
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Path from `env_var` if set, else `default`; `~` and `$VARS` are expanded
pub fn resolve_config_path(env_var: &str, default: &str) -> PathBuf {
    let raw = std::env::var(env_var).unwrap_or_else(|_| default.to_string());

    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(e) => {
            warn!("Failed to expand config path '{}': {}", raw, e);
            PathBuf::from(raw)
        }
    }
}

/// Load `path` if it exists, otherwise fall back to defaults plus env overrides
pub fn load_config_file(path: &Path) -> Result<EngineConfig> {
    if path.exists() {
        EngineConfig::load(path)
    } else {
        debug!("No config file at {}, using defaults", path.display());
        EngineConfig::from_env()
    }
}
