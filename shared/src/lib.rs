//! Shared configuration and response types for Tokenwarden
//!
//! - Configuration types and loaders
//! - Error response envelope and error codes

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AudienceConfig, CacheBackend, CacheConfig, ConfigLoadError,
    ConfigValidationError, Environment, JwtConfig, KeyMaterialConfig, LogFormat, LoggingConfig,
    ParserSpec, ServerConfig,
};
pub use errors::{error_codes, ApiResult, ErrorResponse, IntoErrorResponse};
