//! Compact token encoding, decoding and signature verification

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use serde_json::{Map, Value};

use crate::domain::entities::{ClaimSet, Token, TokenHeader};
use crate::errors::{TokenError, TokenResult};

use super::es512::Es512Keys;
use super::signer::{SignerConfig, SigningAlgorithm};

#[derive(Clone)]
enum CodecKeys {
    Jose {
        algorithm: Algorithm,
        encoding: EncodingKey,
        decoding: DecodingKey,
    },
    Es512(Arc<Es512Keys>),
}

/// Encodes claim sets into signed compact tokens and turns compact strings
/// back into [`Token`] values.
///
/// Holds only immutable key material and is safe to share between threads.
#[derive(Clone)]
pub struct TokenCodec {
    algorithm: SigningAlgorithm,
    keys: CodecKeys,
}

impl TokenCodec {
    /// Create a codec for the given signer
    ///
    /// # Arguments
    ///
    /// * `signer` - Algorithm family, digest and key material
    ///
    /// # Returns
    ///
    /// * `Ok(TokenCodec)` - Keys parsed and ready
    /// * `Err(TokenError::Config)` - Unusable key material
    pub fn new(signer: &SignerConfig) -> TokenResult<Self> {
        let algorithm = signer.algorithm();
        let keys = match (algorithm.jose(), signer.keys()) {
            (Some(jose), _) => CodecKeys::Jose {
                algorithm: jose,
                encoding: signer.encoding_key()?,
                decoding: signer.decoding_key()?,
            },
            (None, Some(pair)) => CodecKeys::Es512(Arc::new(Es512Keys::from_key_pair(pair)?)),
            (None, None) => {
                return Err(TokenError::config(format!(
                    "{} requires a key pair",
                    algorithm
                )))
            }
        };

        Ok(Self { algorithm, keys })
    }

    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// Serialize and sign a claim set
    ///
    /// # Returns
    ///
    /// * `Ok(Token)` - Signed token
    /// * `Err(TokenError::Signing)` - Serialization or the signing operation failed
    pub fn encode(&self, claims: &ClaimSet) -> TokenResult<Token> {
        let header = TokenHeader::new(self.algorithm.name());
        let header_json = serde_json::to_vec(&header).map_err(signing_error)?;
        let payload_json = serde_json::to_vec(claims).map_err(signing_error)?;

        let message = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header_json),
            URL_SAFE_NO_PAD.encode(payload_json)
        );
        let signature = self.sign(message.as_bytes())?;
        let raw = format!("{}.{}", message, signature);

        Ok(Token::new(header, claims.clone(), signature, raw))
    }

    /// Parse the three-part compact structure without checking the signature
    ///
    /// # Returns
    ///
    /// * `Ok(Token)` - Header and payload decoded
    /// * `Err(TokenError::MalformedToken)` - Wrong segment count, bad base64,
    ///   a header that is not a JOSE header or a payload that is not a JSON object
    pub fn decode(&self, raw: &str) -> TokenResult<Token> {
        let segments: Vec<&str> = raw.trim().split('.').collect();
        let [header_b64, payload_b64, signature_b64] = segments.as_slice() else {
            return Err(TokenError::malformed(format!(
                "expected 3 segments, found {}",
                segments.len()
            )));
        };

        if header_b64.is_empty() || payload_b64.is_empty() || signature_b64.is_empty() {
            return Err(TokenError::malformed("empty token segment"));
        }

        let header_json = decode_segment(header_b64, "header")?;
        let header: TokenHeader = serde_json::from_slice(&header_json)
            .map_err(|e| TokenError::malformed(format!("invalid header: {}", e)))?;

        let payload_json = decode_segment(payload_b64, "payload")?;
        let payload: Map<String, Value> = serde_json::from_slice(&payload_json)
            .map_err(|e| TokenError::malformed(format!("payload is not a JSON object: {}", e)))?;

        decode_segment(signature_b64, "signature")?;

        Ok(Token::new(
            header,
            ClaimSet::from(payload),
            *signature_b64,
            raw.trim(),
        ))
    }

    /// Decode the token and verify its signature with the configured key
    ///
    /// # Returns
    ///
    /// * `Ok(Token)` - Signature matches
    /// * `Err(TokenError::MalformedToken)` - Token could not be decoded
    /// * `Err(TokenError::SignatureInvalid)` - Signature mismatch or the header
    ///   names a different algorithm than the configured one
    pub fn verify_signature(&self, raw: &str) -> TokenResult<Token> {
        let token = self.decode(raw)?;

        if token.header().alg != self.algorithm.name() {
            return Err(TokenError::SignatureInvalid);
        }

        let Some((message, signature)) = token.as_str().rsplit_once('.') else {
            return Err(TokenError::malformed("missing signature segment"));
        };

        let valid = match &self.keys {
            CodecKeys::Jose {
                algorithm,
                decoding,
                ..
            } => jsonwebtoken::crypto::verify(signature, message.as_bytes(), decoding, *algorithm)
                .map_err(|_| TokenError::SignatureInvalid)?,
            CodecKeys::Es512(keys) => keys.verify(signature, message.as_bytes()),
        };

        if !valid {
            return Err(TokenError::SignatureInvalid);
        }

        Ok(token)
    }

    fn sign(&self, message: &[u8]) -> TokenResult<String> {
        match &self.keys {
            CodecKeys::Jose {
                algorithm,
                encoding,
                ..
            } => jsonwebtoken::crypto::sign(message, encoding, *algorithm).map_err(signing_error),
            CodecKeys::Es512(keys) => keys.sign(message),
        }
    }
}

fn signing_error(error: impl std::fmt::Display) -> TokenError {
    TokenError::Signing {
        message: error.to_string(),
    }
}

fn decode_segment(segment: &str, name: &str) -> TokenResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TokenError::malformed(format!("invalid base64 in {}: {}", name, e)))
}
