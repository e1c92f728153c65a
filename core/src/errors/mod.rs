//! Domain-specific error types and error handling.

mod types;

#[cfg(test)]
mod tests;

// Re-export all error types
pub use types::{CacheError, InvalidReason, TokenError};

/// Result alias used throughout the token lifecycle
pub type TokenResult<T> = Result<T, TokenError>;
