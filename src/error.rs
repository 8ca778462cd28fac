/*
 * Responsibility
 * - 認証ゲートの拒否 (AuthRejection) と、アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - 拒否理由の詳細はレスポンスに出さない (ログのみ)
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::services::auth::KeyError;

/// Terminal outcomes of the authentication gate.
///
/// The response is the bare status code; causes stay in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthRejection {
    #[error("missing credential")]
    MissingCredential,

    #[error("request body could not be read")]
    UnreadableBody,

    #[error("unauthorized")]
    Unauthorized,
}

impl AuthRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthRejection::MissingCredential | AuthRejection::UnreadableBody => {
                StatusCode::BAD_REQUEST
            }
            AuthRejection::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        self.status().into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid verification key: {0}")]
    Key(#[from] KeyError),

    #[error("internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // いずれもサーバ側の設定/実装の問題なので、詳細はログにのみ残す
        tracing::error!(error = %self, "request failed");

        let body = ErrorResponse {
            error: ErrorBody {
                code: "INTERNAL_SERVER_ERROR",
                message: "internal server error".into(),
            },
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn rejections_are_status_only() {
        let res = AuthRejection::MissingCredential.into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());

        let res = AuthRejection::UnreadableBody.into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());

        let res = AuthRejection::Unauthorized.into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn app_errors_do_not_leak_details() {
        let res = AppError::Config(ConfigError::Missing("JWT_SECRET")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], "INTERNAL_SERVER_ERROR");
        assert!(!body.to_string().contains("JWT_SECRET"));
    }
}
