//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - Signer selection and key material loading (HMAC, RSA, ECDSA incl. P-521)
//! - Compact token encoding, decoding and signature verification
//! - Time-window and claim validation with clock-skew leeway
//! - Default claims for issuance and the refreshed-claim set
//! - Lifecycle orchestration (issue, parse, refresh, invalidate)

mod codec;
mod es512;
mod manager;
mod payload;
mod signer;
mod validator;

#[cfg(test)]
mod tests;

pub use codec::TokenCodec;
pub use es512::Es512Keys;
pub use manager::{TokenManager, PERMANENT_REVOCATION_SECONDS};
pub use payload::ClaimsDefaults;
pub use signer::{
    decrypt_private_key, load_key_material, DigestSize, KeyPair, SignerConfig, SigningAlgorithm,
    FILE_KEY_PREFIX,
};
pub use validator::{ClaimValidator, ExpectedClaims, ValidationPolicy};
