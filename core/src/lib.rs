//! # Tokenwarden Core
//!
//! Token lifecycle engine: issues, verifies, refreshes and revokes signed
//! bearer tokens. This crate contains the claim and token entities, the
//! signer/codec, claim validation, the revocation ledger, request token
//! extraction and the [`TokenManager`] that ties them together. Caches are
//! reached through the [`TtlCache`] trait and implemented in `tw_infra`.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
