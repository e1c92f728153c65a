//! Services implementing the token lifecycle.

pub mod clock;
pub mod request;
pub mod revocation;
pub mod token;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use request::{ParsedBody, ParserChain, RequestReader, SimpleRequest, TokenExtractor};
pub use revocation::RevocationStore;
pub use token::{
    ClaimValidator, ClaimsDefaults, DigestSize, ExpectedClaims, KeyPair, SignerConfig,
    SigningAlgorithm, TokenCodec, TokenManager, ValidationPolicy, PERMANENT_REVOCATION_SECONDS,
};
