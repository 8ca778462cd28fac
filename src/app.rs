/*
 * Responsibility
 * - Config読み込み → SigningConfig 生成 → Router 組み立て
 * - Middleware の適用 (HTTP 共通レイヤ / JWT 認証ゲート)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::dto::me::UserClaims;
use crate::config::Config;
use crate::error::AppError;
use crate::middleware::http::{self, HttpLimits};
use crate::services::auth::build_signing_config;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,bearer_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development では即死させて気づけるようにする
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_state(config: &Config) -> Result<AppState, AppError> {
    // SigningConfig は起動時に一度だけ作り、以後は Arc で共有する (read-only)
    let signing = build_signing_config(config)?.with_claims::<UserClaims>();

    tracing::info!(signing = ?signing, "jwt gate configured");

    Ok(AppState::new(Arc::new(signing)))
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(api::v1::handlers::health::health))
        .nest("/api/v1", api::v1::routes(state.signing.clone()))
        .with_state(state);

    http::apply(router, HttpLimits::default())
}
