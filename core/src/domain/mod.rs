//! Domain layer containing the token and claim entities.

pub mod entities;

// Re-export commonly used domain types
pub use entities::{is_registered, ClaimSet, ClaimSetBuilder, Token, TokenHeader, REGISTERED_CLAIMS};
