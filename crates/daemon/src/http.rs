use std::path::Path;
use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use stockwatch_core::api::{CheckResponse, StockResponse};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::service::StockWatcher;

#[derive(Clone)]
pub struct AppState {
    watcher: Arc<StockWatcher>,
}

impl AppState {
    pub fn new(watcher: Arc<StockWatcher>) -> Self {
        Self { watcher }
    }
}

/// Both stock endpoints answer 200; failure is carried in the body.
pub fn router(state: AppState, public_dir: &Path) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/stock/check", get(check_stock))
        .route("/api/stock/get", get(current_stock))
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

pub async fn check_stock(State(st): State<AppState>) -> Json<CheckResponse> {
    Json(st.watcher.check_stock_changes().await)
}

pub async fn current_stock(State(st): State<AppState>) -> Json<StockResponse> {
    Json(st.watcher.get_current_stock().await)
}
