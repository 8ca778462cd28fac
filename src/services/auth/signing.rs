use std::fmt;
use std::sync::Arc;

use jsonwebtoken::Algorithm;

use super::claims::{ClaimSet, ClaimSetFactory, TypedClaims};
use super::key_resolver::KeyResolver;

/// Form / query field the credential is read from when no Bearer header is sent.
pub const DEFAULT_FORM_KEY: &str = "_jwt";
/// Request-state key of the verified token.
pub const DEFAULT_TOKEN_KEY: &str = "json.web.token";
/// Request-state key of the decoded claim set.
pub const DEFAULT_CLAIMS_KEY: &str = "json.web.token.claims";
/// Upper bound for buffering a form-encoded body while looking for the credential.
pub const DEFAULT_FORM_BODY_LIMIT: usize = 1024 * 1024;

/// Process-wide verification settings.
///
/// Built once at startup, then shared read-only (`Arc<SigningConfig>`) by
/// every request. There are no setters; the `with_*` methods consume `self`.
#[derive(Clone)]
pub struct SigningConfig {
    algorithm: Algorithm,
    key_resolver: Arc<dyn KeyResolver>,
    form_key: String,
    token_key: String,
    claims_key: String,
    claims_factory: Option<Arc<dyn ClaimSetFactory>>,
    leeway_seconds: u64,
    form_body_limit: usize,
}

impl fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("SigningConfig")
            .field("algorithm", &self.algorithm)
            .field("form_key", &self.form_key)
            .field("token_key", &self.token_key)
            .field("claims_key", &self.claims_key)
            .field("claims_factory", &self.claims_factory.is_some())
            .field("leeway_seconds", &self.leeway_seconds)
            .field("form_body_limit", &self.form_body_limit)
            .finish()
    }
}

impl SigningConfig {
    pub fn new(algorithm: Algorithm, key_resolver: impl KeyResolver + 'static) -> Self {
        Self {
            algorithm,
            key_resolver: Arc::new(key_resolver),
            form_key: DEFAULT_FORM_KEY.to_string(),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            claims_key: DEFAULT_CLAIMS_KEY.to_string(),
            claims_factory: None,
            leeway_seconds: 0,
            form_body_limit: DEFAULT_FORM_BODY_LIMIT,
        }
    }

    pub fn with_form_key(mut self, form_key: impl Into<String>) -> Self {
        self.form_key = form_key.into();
        self
    }

    pub fn with_token_key(mut self, token_key: impl Into<String>) -> Self {
        self.token_key = token_key.into();
        self
    }

    pub fn with_claims_key(mut self, claims_key: impl Into<String>) -> Self {
        self.claims_key = claims_key.into();
        self
    }

    pub fn with_claims_factory(mut self, factory: impl ClaimSetFactory + 'static) -> Self {
        self.claims_factory = Some(Arc::new(factory));
        self
    }

    /// Shorthand for `with_claims_factory(TypedClaims::<C>::new())`.
    pub fn with_claims<C>(self) -> Self
    where
        C: ClaimSet + serde::de::DeserializeOwned,
    {
        self.with_claims_factory(TypedClaims::<C>::new())
    }

    pub fn with_leeway(mut self, leeway_seconds: u64) -> Self {
        self.leeway_seconds = leeway_seconds;
        self
    }

    pub fn with_form_body_limit(mut self, limit: usize) -> Self {
        self.form_body_limit = limit;
        self
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn key_resolver(&self) -> &dyn KeyResolver {
        self.key_resolver.as_ref()
    }

    pub fn form_key(&self) -> &str {
        &self.form_key
    }

    pub fn token_key(&self) -> &str {
        &self.token_key
    }

    pub fn claims_key(&self) -> &str {
        &self.claims_key
    }

    pub fn claims_factory(&self) -> Option<&dyn ClaimSetFactory> {
        self.claims_factory.as_deref()
    }

    pub fn leeway_seconds(&self) -> u64 {
        self.leeway_seconds
    }

    pub fn form_body_limit(&self) -> usize {
        self.form_body_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::claims::MapClaims;
    use crate::services::auth::key_resolver::StaticKey;

    #[test]
    fn defaults_match_the_documented_keys() {
        let config = SigningConfig::new(
            Algorithm::HS256,
            StaticKey::hmac(Algorithm::HS256, b"secret"),
        );

        assert_eq!(config.algorithm(), Algorithm::HS256);
        assert_eq!(config.form_key(), "_jwt");
        assert_eq!(config.token_key(), "json.web.token");
        assert_eq!(config.claims_key(), "json.web.token.claims");
        assert!(config.claims_factory().is_none());
        assert_eq!(config.leeway_seconds(), 0);
        assert_eq!(config.form_body_limit(), 1024 * 1024);
    }

    #[test]
    fn builder_overrides_are_kept() {
        let config = SigningConfig::new(
            Algorithm::HS256,
            StaticKey::hmac(Algorithm::HS256, b"secret"),
        )
        .with_form_key("token")
        .with_token_key("auth.token")
        .with_claims_key("auth.claims")
        .with_claims::<MapClaims>()
        .with_leeway(30);

        assert_eq!(config.form_key(), "token");
        assert_eq!(config.token_key(), "auth.token");
        assert_eq!(config.claims_key(), "auth.claims");
        assert!(config.claims_factory().is_some());
        assert_eq!(config.leeway_seconds(), 30);
    }

    #[test]
    fn debug_output_hides_key_material() {
        let config = SigningConfig::new(
            Algorithm::HS256,
            StaticKey::hmac(Algorithm::HS256, b"super-secret"),
        );

        let printed = format!("{config:?}");
        assert!(printed.contains("HS256"));
        assert!(!printed.contains("super-secret"));
    }
}
