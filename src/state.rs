/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - signing: 起動時に一度だけ組み立てる検証設定 (以後 read-only)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use axum::extract::FromRef;

use crate::services::auth::SigningConfig;

#[derive(Clone, Debug)]
pub struct AppState {
    pub signing: Arc<SigningConfig>,
}

impl AppState {
    pub fn new(signing: Arc<SigningConfig>) -> Self {
        Self { signing }
    }
}

impl FromRef<AppState> for Arc<SigningConfig> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.signing)
    }
}
