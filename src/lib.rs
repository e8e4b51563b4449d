pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod forms;
pub mod lineage;
pub mod models;
pub mod routes;
pub mod schedule;
pub mod seed;
pub mod service;
pub mod state;
pub mod stats;
pub mod storage;
pub mod views;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use sqlx::PgPool;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::{AppState, SharedState};
use crate::storage::UploadStore;

/// Multipart framing on top of the largest accepted file.
const BODY_OVERHEAD: usize = 64 * 1024;

pub fn build_app(pool: PgPool, config: Config) -> Router {
    let body_limit = config.max_upload_size.saturating_add(BODY_OVERHEAD);
    let uploads = UploadStore::new(config.upload_dir.clone());

    let state: SharedState = Arc::new(AppState {
        pool,
        config,
        uploads,
    });

    Router::new()
        .merge(routes::api_routes())
        .merge(views::view_routes())
        .nest_service("/static", ServeDir::new("static"))
        .route("/health", axum::routing::get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
