//! # MPI Configuration
//!
//! Layered settings for the engine and the gateway: compiled-in defaults, an
//! optional TOML file, an optional per-environment overlay and `MPI_`
//! environment variables.
//!
//! ## Usage
//!
//! ```rust
//! use mpi_config::MpiConfig;
//!
//! let config = MpiConfig::default();
//! assert_eq!(config.logging.level, "info");
//! assert!(config.engine.warm_up_bindings);
//! ```

pub mod settings;

pub use settings::{
    load_config, EngineConfig, LoggingConfig, MpiConfig, NegotiationConfig, DEFAULT_CONFIG_PATH,
    ENV_PREFIX,
};
