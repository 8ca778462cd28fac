/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - RequestState はリクエスト 1 件分の key/value 置き場 (型チェック付き)
 * - key は SigningConfig の token_key / claims_key で決まる
 */
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::services::auth::VerifiedToken;

/// Per-request, string-keyed state bag.
///
/// Lives in the request extensions and is dropped with the request.
/// Values are type-checked on the way out: asking for the wrong type is
/// the same as asking for a missing key.
#[derive(Clone, Default)]
pub struct RequestState {
    values: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl fmt::Debug for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

impl RequestState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T>(&mut self, key: impl Into<String>, value: T)
    where
        T: Any + Send + Sync,
    {
        self.values.insert(key.into(), Arc::new(value));
    }

    pub fn insert_arc(&mut self, key: impl Into<String>, value: Arc<dyn Any + Send + Sync>) {
        self.values.insert(key.into(), value);
    }

    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key)?.downcast_ref::<T>()
    }

    pub fn get_arc<T>(&self, key: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.values.get(key)?.clone().downcast::<T>().ok()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `token` は署名検証済みのトークン (header / payload)
/// - `claims` は ClaimSetFactory が作った claims を `C` として取り出したもの
///   (factory 未設定なら `MapClaims`)
#[derive(Debug)]
pub struct Authenticated<C> {
    pub token: Arc<VerifiedToken>,
    pub claims: Arc<C>,
}

impl<C> Clone for Authenticated<C> {
    fn clone(&self) -> Self {
        Self {
            token: Arc::clone(&self.token),
            claims: Arc::clone(&self.claims),
        }
    }
}
