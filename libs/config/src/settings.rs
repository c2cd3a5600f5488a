//! MPI configuration loading
//!
//! Layers, lowest priority first:
//! 1. Built-in defaults
//! 2. Base TOML file (`config/mpi.toml` unless a path is given; optional)
//! 3. Environment file `config/environments/<env>.toml` when an environment is named
//! 4. `MPI_`-prefixed environment variables, `__` between section and key
//!    (`MPI_LOGGING__LEVEL=debug`, `MPI_ENGINE__WARM_UP_BINDINGS=false`)

use anyhow::{Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "config/mpi.toml";
pub const ENV_PREFIX: &str = "MPI";

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct MpiConfig {
    pub engine: EngineConfig,
    pub negotiation: NegotiationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Message definition file replacing the compiled-in definitions
    pub definitions: Option<PathBuf>,
    /// Resolve every binding descriptor at startup instead of on first use
    pub warm_up_bindings: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct NegotiationConfig {
    /// Wire version forced from startup, as if a peer had renegotiated
    pub wire_version: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            definitions: None,
            warm_up_bindings: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl MpiConfig {
    /// Load configuration from files with environment overrides
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        match base_path {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                builder = builder
                    .add_source(File::from(Path::new(DEFAULT_CONFIG_PATH)).required(false));
            }
        }

        if let Some(env) = environment {
            let env_file = PathBuf::from("config/environments").join(format!("{}.toml", env));
            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;
        let mut config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.expand_env_vars()?;
        Ok(config)
    }

    /// Expand `$VAR` / `${VAR}` references in path values
    pub fn expand_env_vars(&mut self) -> Result<()> {
        if let Some(definitions) = &self.engine.definitions {
            let raw = definitions.to_string_lossy();
            let expanded =
                shellexpand::full(&raw).context("Failed to expand definitions path")?;
            self.engine.definitions = Some(PathBuf::from(expanded.as_ref()));
        }
        Ok(())
    }

    /// Effective configuration rendered as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render configuration")
    }
}

/// Convenience function to load configuration with defaults
pub fn load_config(path: Option<&Path>) -> Result<MpiConfig> {
    MpiConfig::load(path, None)
}
