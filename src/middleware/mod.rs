/*
 * Responsibility
 * - middleware の公開インターフェース (re-export)
 * - auth: JWT 認証ゲート, http: 横断的な HTTP レイヤ
 */
pub mod auth;
pub mod http;
