//! Revocation ledger for token identifiers
//!
//! Revoked `jti` values are kept in a TTL cache under a configurable key
//! prefix. Entries expire on their own once the revocation window closes.

mod store;

pub use store::{RevocationStore, DEFAULT_KEY_PREFIX};
