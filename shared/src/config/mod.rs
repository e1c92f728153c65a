//! Configuration module with business-specific sub-modules
//!
//! - `jwt` - Token signing, lifetime, validation and revocation settings
//! - `cache` - TTL cache backend backing the revocation ledger
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server configuration

pub mod cache;
pub mod environment;
pub mod jwt;
pub mod server;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export commonly used types
pub use cache::{CacheBackend, CacheConfig};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use jwt::{
    AudienceConfig, ConfigValidationError, JwtConfig, KeyMaterialConfig, ParserSpec,
    ALWAYS_REFRESHED_CLAIMS, SUPPORTED_ALGORITHMS,
};
pub use server::ServerConfig;

/// Prefix of environment variables overriding file configuration,
/// e.g. `TW__JWT__TTL_MINUTES=30`
pub const ENV_PREFIX: &str = "TW";

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ConfigValidationError),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Token lifecycle configuration
    pub jwt: JwtConfig,

    /// Cache configuration
    pub cache: CacheConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            jwt: JwtConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from plain environment variables (`JWT_*`, `REDIS_*`, `SERVER_*`)
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        let mut logging = LoggingConfig::for_environment(environment);
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            logging.level = level;
        }

        Self {
            environment,
            server: ServerConfig::from_env(),
            jwt: JwtConfig::from_env(),
            cache: CacheConfig::from_env(),
            logging,
        }
    }

    /// Load configuration by layering sources, later ones winning:
    ///
    /// 1. `.env` then `.env.<environment>` (via dotenvy, never overriding
    ///    variables already set) feeding the plain environment defaults
    /// 2. optional configuration file at `path` (or the environment's default file)
    /// 3. `TW__`-prefixed environment variables
    ///
    /// The result is validated before it is returned.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        let _ = dotenvy::dotenv();
        let _ = dotenvy::from_filename(Environment::from_env().env_file());

        let defaults = Self::from_env();
        let file = match path {
            Some(path) => path.to_string_lossy().into_owned(),
            None => defaults.environment.config_file().to_string(),
        };

        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&defaults)?)
            .add_source(config::File::with_name(&file).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.jwt.validate()?;
        Ok(config)
    }
}
