use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{Header, Validation};
use serde_json::Value;
use thiserror::Error;

use super::claims::{ClaimSet, ClaimsError, MapClaims, TimeWindow};
use super::key_resolver::KeyError;
use super::signing::SigningConfig;

// Every variant maps to the same 401 at the HTTP edge; the detail is for logs.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("malformed token header: {0}")]
    Header(#[source] jsonwebtoken::errors::Error),

    #[error("key resolution failed: {0}")]
    KeyResolution(#[from] KeyError),

    #[error("jwt verification failed: {0}")]
    Signature(#[source] jsonwebtoken::errors::Error),

    #[error("claims do not match the expected shape: {0}")]
    ClaimsDecode(#[from] serde_json::Error),

    #[error("invalid claims: {0}")]
    Claims(#[from] ClaimsError),
}

/// A token whose signature has been checked.
///
/// Only `verify` constructs it, so holding one means verification passed.
#[derive(Clone)]
pub struct VerifiedToken {
    raw: String,
    header: Header,
    claims: Value,
    signature: String,
}

impl fmt::Debug for VerifiedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The raw token is a bearer credential, keep it out of logs
        f.debug_struct("VerifiedToken")
            .field("header", &self.header)
            .field("claims", &self.claims)
            .finish_non_exhaustive()
    }
}

impl VerifiedToken {
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The payload exactly as signed, before any claim-set decoding.
    pub fn claims(&self) -> &Value {
        &self.claims
    }

    /// Signature segment (base64url) of the compact serialization.
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

/// Verify `token` against `config` and decode its claim set.
///
/// - The key comes from the configured resolver, which sees the header first.
/// - Only `config.algorithm()` is accepted.
/// - With a claim-set factory the payload is decoded into a fresh claim set.
///   Without one it is kept as `MapClaims`.
/// - Either way the claim set's `validate` decides about `exp`/`nbf`/`iat`
///   against the current time and the configured leeway.
pub fn verify(
    token: &str,
    config: &SigningConfig,
) -> Result<(VerifiedToken, Arc<dyn ClaimSet>), VerifyError> {
    let header = jsonwebtoken::decode_header(token).map_err(VerifyError::Header)?;
    let key = config.key_resolver().resolve(&header)?;

    // 時刻系 claim は ClaimSet::validate 側で見る
    let mut validation = Validation::new(config.algorithm());
    validation.required_spec_claims.clear();
    validation.validate_aud = false;
    validation.validate_exp = false;
    validation.validate_nbf = false;

    let data = jsonwebtoken::decode::<Value>(token, &key, &validation)
        .map_err(VerifyError::Signature)?;

    let claims: Arc<dyn ClaimSet> = match config.claims_factory() {
        Some(factory) => factory.create(data.claims.clone())?,
        None => Arc::new(serde_json::from_value::<MapClaims>(data.claims.clone())?),
    };
    claims.validate(&TimeWindow::current(config.leeway_seconds()))?;

    let signature = token.rsplit('.').next().unwrap_or_default().to_string();

    Ok((
        VerifiedToken {
            raw: token.to_string(),
            header: data.header,
            claims: data.claims,
            signature,
        },
        claims,
    ))
}
