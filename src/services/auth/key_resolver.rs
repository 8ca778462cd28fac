use jsonwebtoken::{Algorithm, DecodingKey, Header};
use thiserror::Error;

/// Errors a key resolver may report. The gate treats every variant as an
/// authentication failure; the detail only reaches the logs.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("unexpected signing algorithm: expected {expected:?}, got {actual:?}")]
    UnexpectedAlgorithm {
        expected: Algorithm,
        actual: Algorithm,
    },

    #[error("no verification key for kid {0:?}")]
    UnknownKeyId(Option<String>),

    #[error("invalid key material: {0}")]
    InvalidKey(#[from] jsonwebtoken::errors::Error),

    #[error("key resolution failed: {0}")]
    Other(String),
}

/// Resolves the verification key for a token from its decoded header.
///
/// The header is handed over as-is so implementations can check `alg`
/// (and `kid`, `typ`, ...) before returning a key. Rejecting an unexpected
/// algorithm is the resolver's job.
pub trait KeyResolver: Send + Sync {
    fn resolve(&self, header: &Header) -> Result<DecodingKey, KeyError>;
}

impl<F> KeyResolver for F
where
    F: Fn(&Header) -> Result<DecodingKey, KeyError> + Send + Sync,
{
    fn resolve(&self, header: &Header) -> Result<DecodingKey, KeyError> {
        self(header)
    }
}

/// A single key pinned to a single algorithm.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct StaticKey {
    algorithm: Algorithm,
    key: DecodingKey,
}

impl std::fmt::Debug for StaticKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticKey")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl StaticKey {
    pub fn new(algorithm: Algorithm, key: DecodingKey) -> Self {
        Self { algorithm, key }
    }

    /// Shared-secret key for HS256/HS384/HS512.
    pub fn hmac(algorithm: Algorithm, secret: &[u8]) -> Self {
        Self::new(algorithm, DecodingKey::from_secret(secret))
    }

    /// Ed25519 public key in PEM (SPKI) format.
    pub fn from_ed_pem(pem: &[u8]) -> Result<Self, KeyError> {
        Ok(Self::new(Algorithm::EdDSA, DecodingKey::from_ed_pem(pem)?))
    }

    pub fn from_rsa_pem(algorithm: Algorithm, pem: &[u8]) -> Result<Self, KeyError> {
        Ok(Self::new(algorithm, DecodingKey::from_rsa_pem(pem)?))
    }

    pub fn from_ec_pem(algorithm: Algorithm, pem: &[u8]) -> Result<Self, KeyError> {
        Ok(Self::new(algorithm, DecodingKey::from_ec_pem(pem)?))
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

impl KeyResolver for StaticKey {
    fn resolve(&self, header: &Header) -> Result<DecodingKey, KeyError> {
        // alg は署名前の自己申告なので、ここで固定値と突き合わせる
        if header.alg != self.algorithm {
            return Err(KeyError::UnexpectedAlgorithm {
                expected: self.algorithm,
                actual: header.alg,
            });
        }

        Ok(self.key.clone())
    }
}
