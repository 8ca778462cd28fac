/*
 * Responsibility
 * - GET|POST /me: 認証済み主体をそのまま返す
 * - 認証済みコンテキストは Authenticated<UserClaims> extractor で受け取る
 */
use axum::Json;

use crate::api::v1::{
    dto::me::{MeResponse, UserClaims},
    extractors::Authenticated,
};

pub async fn me(auth: Authenticated<UserClaims>) -> Json<MeResponse> {
    let claims = auth.claims.as_ref();

    Json(MeResponse {
        name: claims.name.clone(),
        subject: claims.registered.sub.clone(),
        expires_at: claims.registered.exp,
        algorithm: format!("{:?}", auth.token.header().alg),
    })
}
