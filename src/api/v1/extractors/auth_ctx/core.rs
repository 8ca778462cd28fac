use std::any::Any;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::{SigningConfig, VerifiedToken};

use super::{Authenticated, RequestState};

/// Handler で、認証済みコンテキストを受け取るための extractor
/// middleware が RequestState を request.extensions() に insert 済みである前提
/// 見つからない・型が違う場合は設定ミス (middleware 未適用 / claims 型の不一致) なので 500 を返す
impl<S, C> FromRequestParts<S> for Authenticated<C>
where
    S: Send + Sync,
    Arc<SigningConfig>: FromRef<S>,
    C: Any + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<SigningConfig>::from_ref(state);

        let Some(request_state) = parts.extensions.get::<RequestState>() else {
            tracing::error!("request state missing; is the auth middleware applied to this route?");
            return Err(AppError::Internal);
        };

        let token = request_state
            .get_arc::<VerifiedToken>(config.token_key())
            .ok_or_else(|| {
                tracing::error!(
                    key = config.token_key(),
                    "verified token missing from request state"
                );
                AppError::Internal
            })?;

        let claims = request_state
            .get_arc::<C>(config.claims_key())
            .ok_or_else(|| {
                tracing::error!(
                    key = config.claims_key(),
                    expected = std::any::type_name::<C>(),
                    "claims missing from request state or of a different type"
                );
                AppError::Internal
            })?;

        Ok(Authenticated { token, claims })
    }
}
