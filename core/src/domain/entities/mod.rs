//! Domain entities representing tokens and their claims.

pub mod claims;
pub mod token;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use claims::{is_registered, ClaimSet, ClaimSetBuilder, REGISTERED_CLAIMS};
pub use token::{Token, TokenHeader};
