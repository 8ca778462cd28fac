/*
 * Responsibility
 * - ClaimSet (検証可能な claims) の契約と、標準で用意する実装
 *   - MapClaims: 任意の key/value
 *   - RegisteredClaims: RFC 7519 の registered claims (アプリ側の struct に flatten して使う)
 * - ClaimSetFactory: リクエストごとに新しい ClaimSet を作る strategy
 */
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("token is expired")]
    Expired,

    #[error("token is not valid yet")]
    NotYetValid,

    #[error("token used before issued")]
    IssuedInFuture,

    #[error("claim '{0}' has an invalid type")]
    InvalidType(&'static str),

    #[error("{0}")]
    Invalid(String),
}

/// Reference time for temporal claim checks, with clock-skew leeway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub now: i64,
    pub leeway: u64,
}

impl TimeWindow {
    pub fn at(now: i64, leeway: u64) -> Self {
        Self { now, leeway }
    }

    pub fn current(leeway: u64) -> Self {
        Self::at(chrono::Utc::now().timestamp(), leeway)
    }

    fn leeway(&self) -> i64 {
        i64::try_from(self.leeway).unwrap_or(i64::MAX)
    }

    /// `exp`: valid while `now <= exp` (+ leeway).
    pub fn check_exp(&self, exp: i64) -> Result<(), ClaimsError> {
        if self.now > exp.saturating_add(self.leeway()) {
            return Err(ClaimsError::Expired);
        }
        Ok(())
    }

    /// `nbf`: valid once `now >= nbf` (- leeway).
    pub fn check_nbf(&self, nbf: i64) -> Result<(), ClaimsError> {
        if self.now.saturating_add(self.leeway()) < nbf {
            return Err(ClaimsError::NotYetValid);
        }
        Ok(())
    }

    /// `iat`: must not lie in the future (- leeway).
    pub fn check_iat(&self, iat: i64) -> Result<(), ClaimsError> {
        if self.now.saturating_add(self.leeway()) < iat {
            return Err(ClaimsError::IssuedInFuture);
        }
        Ok(())
    }
}

/// Upcast helper so that a `dyn ClaimSet` can be handed out as `dyn Any`
/// and downcast to the concrete claims type by downstream handlers.
pub trait AnyClaims: Any + Send + Sync {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AnyClaims for T {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A decoded claim set that knows how to check itself.
///
/// `validate` runs after the signature has been verified and should cover
/// structural and time-based checks (`exp`, `nbf`, `iat`, required fields...).
pub trait ClaimSet: AnyClaims + fmt::Debug {
    fn validate(&self, window: &TimeWindow) -> Result<(), ClaimsError>;
}

pub(crate) fn into_any(claims: Arc<dyn ClaimSet>) -> Arc<dyn Any + Send + Sync> {
    claims.into_any()
}

/// Open key/value claims.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapClaims(pub Map<String, Value>);

impl MapClaims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    // NumericDate may legally be a fraction, truncate it
    fn numeric_date(&self, key: &'static str) -> Result<Option<i64>, ClaimsError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .map(Some)
                .ok_or(ClaimsError::InvalidType(key)),
            Some(_) => Err(ClaimsError::InvalidType(key)),
        }
    }
}

impl From<Map<String, Value>> for MapClaims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl ClaimSet for MapClaims {
    fn validate(&self, window: &TimeWindow) -> Result<(), ClaimsError> {
        if let Some(exp) = self.numeric_date("exp")? {
            window.check_exp(exp)?;
        }
        if let Some(iat) = self.numeric_date("iat")? {
            window.check_iat(iat)?;
        }
        if let Some(nbf) = self.numeric_date("nbf")? {
            window.check_nbf(nbf)?;
        }
        Ok(())
    }
}

/// `aud` in JWT can be either string or array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::One(aud) => aud == audience,
            Audience::Many(auds) => auds.iter().any(|aud| aud == audience),
        }
    }
}

/// Registered claims (RFC 7519 §4.1), all optional.
///
/// Application claims embed this with `#[serde(flatten)]` and delegate
/// their `validate` to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl ClaimSet for RegisteredClaims {
    fn validate(&self, window: &TimeWindow) -> Result<(), ClaimsError> {
        if let Some(exp) = self.exp {
            window.check_exp(exp)?;
        }
        if let Some(iat) = self.iat {
            window.check_iat(iat)?;
        }
        if let Some(nbf) = self.nbf {
            window.check_nbf(nbf)?;
        }
        Ok(())
    }
}

/// Builds a fresh claim set for every request from the verified payload.
pub trait ClaimSetFactory: Send + Sync {
    fn create(&self, payload: Value) -> Result<Arc<dyn ClaimSet>, serde_json::Error>;
}

impl<F> ClaimSetFactory for F
where
    F: Fn(Value) -> Result<Arc<dyn ClaimSet>, serde_json::Error> + Send + Sync,
{
    fn create(&self, payload: Value) -> Result<Arc<dyn ClaimSet>, serde_json::Error> {
        self(payload)
    }
}

/// Factory that deserializes the payload into `C`.
pub struct TypedClaims<C>(PhantomData<fn() -> C>);

impl<C> TypedClaims<C> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<C> Default for TypedClaims<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for TypedClaims<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedClaims")
            .field(&std::any::type_name::<C>())
            .finish()
    }
}

impl<C> ClaimSetFactory for TypedClaims<C>
where
    C: ClaimSet + DeserializeOwned,
{
    fn create(&self, payload: Value) -> Result<Arc<dyn ClaimSet>, serde_json::Error> {
        let claims: C = serde_json::from_value(payload)?;
        Ok(Arc::new(claims))
    }
}
