/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /me は認証ゲートの内側 (/health は app 側で root に置く)
 */
use std::sync::Arc;

use axum::{Router, routing::get};

use crate::api::v1::handlers::me::me;
use crate::middleware;
use crate::services::auth::SigningConfig;
use crate::state::AppState;

pub fn routes(signing: Arc<SigningConfig>) -> Router<AppState> {
    let protected = Router::new().route("/me", get(me).post(me));

    middleware::auth::apply(protected, signing)
}
