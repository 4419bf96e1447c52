//! Configuration Loader
//!
//! Layers an optional configuration file (TOML, YAML or JSON, detected by
//! extension) under `FLUENT_CRITERIA_*` environment overrides and validates the
//! result before handing it out.

use super::error::{ConfigResult, ConfigurationError};
use super::CompilerConfig;
use crate::constants::env as env_names;
use config::{Config, Environment, File};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Loaded, validated compiler configuration
#[derive(Debug)]
pub struct ConfigManager {
    config: CompilerConfig,
    source_file: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration from `FLUENT_CRITERIA_CONFIG` (if set) plus environment overrides
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        let file = env::var(env_names::CONFIG_FILE).ok().map(PathBuf::from);
        Self::load_layers(file.as_deref(), true)
    }

    /// Load configuration from a specific file plus environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<Arc<ConfigManager>> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigurationError::file_read_error(
                path.display().to_string(),
                "not a regular file",
            ));
        }
        Self::load_layers(Some(path), true)
    }

    /// Load configuration from a file only, ignoring the process environment.
    /// Useful for tests that must not depend on global environment variables.
    pub fn load_file_only(path: impl AsRef<Path>) -> ConfigResult<Arc<ConfigManager>> {
        Self::load_layers(Some(path.as_ref()), false)
    }

    /// Wrap an already-built configuration after validating it
    pub fn from_config(config: CompilerConfig) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            config,
            source_file: None,
        }))
    }

    fn load_layers(file: Option<&Path>, with_env: bool) -> ConfigResult<Arc<ConfigManager>> {
        let defaults = Config::try_from(&CompilerConfig::default())
            .map_err(|e| ConfigurationError::parse_error("defaults", e))?;

        let mut builder = Config::builder().add_source(defaults);

        if let Some(path) = file {
            debug!("Loading compiler configuration from: {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        if with_env {
            builder = builder.add_source(
                Environment::with_prefix(env_names::CONFIG_PREFIX).try_parsing(true),
            );
        }

        let source_name = file
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "environment".to_string());

        let config: CompilerConfig = builder
            .build()
            .and_then(|layered| layered.try_deserialize())
            .map_err(|e| match file {
                Some(path) if !path.exists() => {
                    ConfigurationError::file_read_error(path.display().to_string(), e)
                }
                _ => ConfigurationError::parse_error(source_name.clone(), e),
            })?;

        config.validate()?;

        info!(
            source = %source_name,
            root_alias = %config.root_alias,
            alias_prefix = %config.alias_prefix,
            join_kind = ?config.default_join_kind,
            "Compiler configuration loaded"
        );

        Ok(Arc::new(ConfigManager {
            config,
            source_file: file.map(Path::to_path_buf),
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// File the configuration was read from, if any
    pub fn source_file(&self) -> Option<&Path> {
        self.source_file.as_deref()
    }
}
