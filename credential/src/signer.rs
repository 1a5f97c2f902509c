use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::SignerError;

/// Codec for tamper-evident signed credential strings.
///
/// Generic over the claims type to allow services to define their own
/// payload. Uses HS256 (HMAC with SHA-256).
pub struct Signer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl Signer {
    /// Create a new signer from a symmetric secret.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing (should be at least 32 bytes for HS256)
    ///
    /// # Returns
    /// Signer instance configured with HS256
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Encode claims into a signed credential string.
    ///
    /// # Errors
    /// * `EncodingFailed` - Claims serialization or signing failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, SignerError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| SignerError::EncodingFailed(e.to_string()))
    }

    /// Decode a credential string, verifying signature and expiry.
    ///
    /// Expiry is validated with zero leeway: a credential whose `exp` has
    /// passed is rejected immediately.
    ///
    /// # Errors
    /// * `Expired` - The `exp` claim is in the past
    /// * `InvalidToken` - Signature verification failed or the string is malformed
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, SignerError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let token_data =
            decode::<T>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => SignerError::Expired,
                _ => SignerError::InvalidToken(e.to_string()),
            })?;

        Ok(token_data.claims)
    }
}
