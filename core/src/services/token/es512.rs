//! ECDSA P-521 / SHA-512 signing for ES512 tokens

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use p521::ecdsa::signature::{Signer, Verifier};
use p521::ecdsa::{Signature, SigningKey, VerifyingKey};
use p521::pkcs8::{DecodePrivateKey, DecodePublicKey};
use p521::{PublicKey, SecretKey};

use crate::errors::{TokenError, TokenResult};

use super::signer::KeyPair;

const SEC1_KEY_LABEL: &str = "EC PRIVATE KEY";

/// P-521 key pair producing fixed-size `r || s` JWS signatures
pub struct Es512Keys {
    signing: SigningKey,
    verifying: VerifyingKey,
}

impl Es512Keys {
    /// Parse the PEM key pair. The private key may be PKCS#8 or SEC1.
    ///
    /// # Returns
    ///
    /// * `Ok(Es512Keys)` - Both keys are P-521 keys
    /// * `Err(TokenError::Config)` - A key is not a usable P-521 key
    pub fn from_key_pair(keys: &KeyPair) -> TokenResult<Self> {
        let private_pem = keys.private_pem();
        let secret = if private_pem.contains(SEC1_KEY_LABEL) {
            SecretKey::from_sec1_pem(private_pem).map_err(|_| invalid_private_key())?
        } else {
            SecretKey::from_pkcs8_pem(private_pem).map_err(|_| invalid_private_key())?
        };

        let signing = SigningKey::from_bytes(&secret.to_bytes())
            .map_err(|e| TokenError::config(format!("Invalid EC private key: {}", e)))?;

        let public = PublicKey::from_public_key_pem(keys.public_pem())
            .map_err(|e| TokenError::config(format!("Invalid EC public key: {}", e)))?;
        let verifying = VerifyingKey::from_sec1_bytes(&public.to_sec1_bytes())
            .map_err(|e| TokenError::config(format!("Invalid EC public key: {}", e)))?;

        Ok(Self { signing, verifying })
    }

    /// Sign `message` and return the base64url signature segment
    pub fn sign(&self, message: &[u8]) -> TokenResult<String> {
        let signature: Signature = self.signing.try_sign(message).map_err(|e| {
            TokenError::Signing {
                message: e.to_string(),
            }
        })?;
        Ok(URL_SAFE_NO_PAD.encode(signature.to_bytes()))
    }

    /// Check a base64url signature segment against `message`
    pub fn verify(&self, signature: &str, message: &[u8]) -> bool {
        let Ok(bytes) = URL_SAFE_NO_PAD.decode(signature) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(&bytes) else {
            return false;
        };
        self.verifying.verify(message, &signature).is_ok()
    }
}

fn invalid_private_key() -> TokenError {
    TokenError::config("Invalid EC private key: expected a P-521 key")
}
