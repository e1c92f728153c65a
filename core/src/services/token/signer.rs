//! Signing algorithm selection and key material loading

use std::fmt;
use std::fs;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use pkcs8::{EncryptedPrivateKeyInfo, LineEnding};
use tracing::debug;
use tw_shared::config::JwtConfig;

use crate::errors::{TokenError, TokenResult};

/// Prefix marking key material stored on disk instead of inline
pub const FILE_KEY_PREFIX: &str = "file://";

const ENCRYPTED_KEY_LABEL: &str = "ENCRYPTED PRIVATE KEY";

/// Hash size paired with the algorithm family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestSize {
    Sha256,
    Sha384,
    Sha512,
}

/// Signing algorithms supported by the codec
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningAlgorithm {
    HS256,
    HS384,
    HS512,
    RS256,
    RS384,
    RS512,
    ES256,
    ES384,
    ES512,
}

impl SigningAlgorithm {
    /// Name used in the `alg` header
    pub fn name(&self) -> &'static str {
        match self {
            SigningAlgorithm::HS256 => "HS256",
            SigningAlgorithm::HS384 => "HS384",
            SigningAlgorithm::HS512 => "HS512",
            SigningAlgorithm::RS256 => "RS256",
            SigningAlgorithm::RS384 => "RS384",
            SigningAlgorithm::RS512 => "RS512",
            SigningAlgorithm::ES256 => "ES256",
            SigningAlgorithm::ES384 => "ES384",
            SigningAlgorithm::ES512 => "ES512",
        }
    }

    /// jsonwebtoken counterpart. ES512 has none and is signed with P-521 directly.
    pub fn jose(&self) -> Option<Algorithm> {
        match self {
            SigningAlgorithm::HS256 => Some(Algorithm::HS256),
            SigningAlgorithm::HS384 => Some(Algorithm::HS384),
            SigningAlgorithm::HS512 => Some(Algorithm::HS512),
            SigningAlgorithm::RS256 => Some(Algorithm::RS256),
            SigningAlgorithm::RS384 => Some(Algorithm::RS384),
            SigningAlgorithm::RS512 => Some(Algorithm::RS512),
            SigningAlgorithm::ES256 => Some(Algorithm::ES256),
            SigningAlgorithm::ES384 => Some(Algorithm::ES384),
            SigningAlgorithm::ES512 => None,
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// PEM-encoded asymmetric key pair
#[derive(Clone)]
pub struct KeyPair {
    private_pem: String,
    public_pem: String,
}

impl KeyPair {
    pub fn new(private_pem: impl Into<String>, public_pem: impl Into<String>) -> Self {
        Self {
            private_pem: private_pem.into(),
            public_pem: public_pem.into(),
        }
    }

    /// Load a key pair, resolving `file://` references and decrypting the
    /// private key when a passphrase is given
    ///
    /// # Arguments
    ///
    /// * `private` - Inline PEM or `file://` path of the private key
    /// * `public` - Inline PEM or `file://` path of the public key
    /// * `passphrase` - Passphrase of an encrypted PKCS#8 private key
    ///
    /// # Returns
    ///
    /// * `Ok(KeyPair)` - Both keys loaded
    /// * `Err(TokenError::Config)` - A key could not be read or decrypted
    pub fn load(private: &str, public: &str, passphrase: Option<&str>) -> TokenResult<Self> {
        let mut private_pem = load_key_material(private)?;
        let public_pem = load_key_material(public)?;

        if let Some(passphrase) = passphrase {
            private_pem = decrypt_private_key(&private_pem, passphrase)?;
        }

        Ok(Self::new(private_pem, public_pem))
    }

    pub fn private_pem(&self) -> &str {
        &self.private_pem
    }

    pub fn public_pem(&self) -> &str {
        &self.public_pem
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("private_pem", &"<redacted>")
            .field("public_pem", &self.public_pem)
            .finish()
    }
}

/// Signing algorithm family and its key material
#[derive(Clone)]
pub enum SignerConfig {
    Hmac { digest: DigestSize, secret: String },
    Rsa { digest: DigestSize, keys: KeyPair },
    Ecdsa { digest: DigestSize, keys: KeyPair },
}

impl SignerConfig {
    /// HMAC signer. An empty secret is rejected.
    pub fn hmac(digest: DigestSize, secret: impl Into<String>) -> TokenResult<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(TokenError::config("HMAC signing requires a non-empty secret"));
        }
        Ok(SignerConfig::Hmac { digest, secret })
    }

    pub fn rsa(digest: DigestSize, keys: KeyPair) -> Self {
        SignerConfig::Rsa { digest, keys }
    }

    pub fn ecdsa(digest: DigestSize, keys: KeyPair) -> Self {
        SignerConfig::Ecdsa { digest, keys }
    }

    /// Build the signer described by the JWT configuration
    pub fn from_jwt_config(config: &JwtConfig) -> TokenResult<Self> {
        let algorithm = config.algorithm.to_ascii_uppercase();
        let family = algorithm.get(..2).unwrap_or_default();
        let digest = match algorithm.get(2..).unwrap_or_default() {
            "256" => DigestSize::Sha256,
            "384" => DigestSize::Sha384,
            "512" => DigestSize::Sha512,
            _ => {
                return Err(TokenError::config(format!(
                    "Unsupported signing algorithm: {}",
                    config.algorithm
                )))
            }
        };

        match family {
            "HS" => {
                let secret = config.secret.clone().unwrap_or_default();
                Self::hmac(digest, secret)
            }
            "RS" | "ES" => {
                let (private, public) = match (&config.keys.private, &config.keys.public) {
                    (Some(private), Some(public)) => (private, public),
                    _ => {
                        return Err(TokenError::config(format!(
                            "{} requires both a private and a public key",
                            algorithm
                        )))
                    }
                };
                let keys = KeyPair::load(private, public, config.keys.passphrase.as_deref())?;
                if family == "RS" {
                    Ok(Self::rsa(digest, keys))
                } else {
                    Ok(Self::ecdsa(digest, keys))
                }
            }
            _ => Err(TokenError::config(format!(
                "Unsupported signing algorithm: {}",
                config.algorithm
            ))),
        }
    }

    pub fn digest(&self) -> DigestSize {
        match self {
            SignerConfig::Hmac { digest, .. }
            | SignerConfig::Rsa { digest, .. }
            | SignerConfig::Ecdsa { digest, .. } => *digest,
        }
    }

    /// The JOSE algorithm for this signer
    pub fn algorithm(&self) -> SigningAlgorithm {
        match (self, self.digest()) {
            (SignerConfig::Hmac { .. }, DigestSize::Sha256) => SigningAlgorithm::HS256,
            (SignerConfig::Hmac { .. }, DigestSize::Sha384) => SigningAlgorithm::HS384,
            (SignerConfig::Hmac { .. }, DigestSize::Sha512) => SigningAlgorithm::HS512,
            (SignerConfig::Rsa { .. }, DigestSize::Sha256) => SigningAlgorithm::RS256,
            (SignerConfig::Rsa { .. }, DigestSize::Sha384) => SigningAlgorithm::RS384,
            (SignerConfig::Rsa { .. }, DigestSize::Sha512) => SigningAlgorithm::RS512,
            (SignerConfig::Ecdsa { .. }, DigestSize::Sha256) => SigningAlgorithm::ES256,
            (SignerConfig::Ecdsa { .. }, DigestSize::Sha384) => SigningAlgorithm::ES384,
            (SignerConfig::Ecdsa { .. }, DigestSize::Sha512) => SigningAlgorithm::ES512,
        }
    }

    /// Asymmetric key pair, `None` for HMAC
    pub fn keys(&self) -> Option<&KeyPair> {
        match self {
            SignerConfig::Hmac { .. } => None,
            SignerConfig::Rsa { keys, .. } | SignerConfig::Ecdsa { keys, .. } => Some(keys),
        }
    }

    /// Key used to produce signatures
    pub fn encoding_key(&self) -> TokenResult<EncodingKey> {
        match self {
            SignerConfig::Hmac { secret, .. } => Ok(EncodingKey::from_secret(secret.as_bytes())),
            SignerConfig::Rsa { keys, .. } => EncodingKey::from_rsa_pem(keys.private_pem.as_bytes())
                .map_err(|e| TokenError::config(format!("Invalid RSA private key: {}", e))),
            SignerConfig::Ecdsa { keys, .. } => EncodingKey::from_ec_pem(keys.private_pem.as_bytes())
                .map_err(|e| TokenError::config(format!("Invalid EC private key: {}", e))),
        }
    }

    /// Key used to verify signatures
    pub fn decoding_key(&self) -> TokenResult<DecodingKey> {
        match self {
            SignerConfig::Hmac { secret, .. } => Ok(DecodingKey::from_secret(secret.as_bytes())),
            SignerConfig::Rsa { keys, .. } => DecodingKey::from_rsa_pem(keys.public_pem.as_bytes())
                .map_err(|e| TokenError::config(format!("Invalid RSA public key: {}", e))),
            SignerConfig::Ecdsa { keys, .. } => DecodingKey::from_ec_pem(keys.public_pem.as_bytes())
                .map_err(|e| TokenError::config(format!("Invalid EC public key: {}", e))),
        }
    }
}

impl fmt::Debug for SignerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignerConfig::Hmac { digest, .. } => f
                .debug_struct("Hmac")
                .field("digest", digest)
                .field("secret", &"<redacted>")
                .finish(),
            SignerConfig::Rsa { digest, keys } => f
                .debug_struct("Rsa")
                .field("digest", digest)
                .field("keys", keys)
                .finish(),
            SignerConfig::Ecdsa { digest, keys } => f
                .debug_struct("Ecdsa")
                .field("digest", digest)
                .field("keys", keys)
                .finish(),
        }
    }
}

/// Resolve inline PEM or a `file://` reference to PEM text
pub fn load_key_material(value: &str) -> TokenResult<String> {
    match value.strip_prefix(FILE_KEY_PREFIX) {
        Some(path) => {
            debug!(path = %path, "Loading key material from file");
            fs::read_to_string(path)
                .map_err(|e| TokenError::config(format!("Failed to read key file {}: {}", path, e)))
        }
        None => Ok(value.to_string()),
    }
}

/// Decrypt a passphrase-protected PKCS#8 private key into an unencrypted PEM.
/// Keys that are not encrypted are returned unchanged.
pub fn decrypt_private_key(pem: &str, passphrase: &str) -> TokenResult<String> {
    let (label, der) = pkcs8::der::pem::decode_vec(pem.as_bytes())
        .map_err(|e| TokenError::config(format!("Invalid private key PEM: {}", e)))?;

    if label != ENCRYPTED_KEY_LABEL {
        return Ok(pem.to_string());
    }

    let info = EncryptedPrivateKeyInfo::try_from(der.as_slice())
        .map_err(|e| TokenError::config(format!("Invalid encrypted private key: {}", e)))?;
    let document = info
        .decrypt(passphrase)
        .map_err(|_| TokenError::config("Failed to decrypt private key with the given passphrase"))?;
    let decrypted = document
        .to_pem("PRIVATE KEY", LineEnding::LF)
        .map_err(|e| TokenError::config(format!("Failed to encode private key: {}", e)))?;

    Ok(decrypted.as_str().to_owned())
}
