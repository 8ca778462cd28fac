/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - 認証済みリクエストのコンテキスト（Authenticated / RequestState）を handler に提供する
 * - HTTP / axum 依存は core に閉じ込め、型定義は types に分離する
 *
 * Public API:
 * - Authenticated
 * - RequestState
 */

mod core;
mod types;

pub use types::{Authenticated, RequestState};
