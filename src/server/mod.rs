//! HTTP surface of the export service

pub mod headers;
pub mod response;

use crate::error::ExportError;
use crate::export::{run_export, ExportQuery, ExportRequest, ExportSettings};
use crate::fetch::JsonFetcher;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Path of the export endpoint
pub const COMBINE_PATH: &str = "/api/combine";

/// Shared server state; every request builds its own index and output
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn JsonFetcher>,
    pub settings: Arc<ExportSettings>,
}

impl AppState {
    pub fn new(fetcher: Arc<dyn JsonFetcher>, settings: ExportSettings) -> Self {
        Self {
            fetcher,
            settings: Arc::new(settings),
        }
    }
}

/// Build the router with CORS, isolation headers and request tracing
pub fn build_router(state: AppState) -> Router {
    // CorsLayer answers every OPTIONS request with an empty 200
    let router = Router::new()
        .route(COMBINE_PATH, get(combine))
        .route("/health", get(health_check))
        .layer(headers::cors_layer());

    headers::static_headers()
        .into_iter()
        .fold(router, |router, layer| router.layer(layer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until the process receives Ctrl-C
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}{}", addr, COMBINE_PATH);
    }

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
}

async fn combine(
    State(state): State<AppState>,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> Result<String, ExportError> {
    let Query(query) = query.map_err(|e| ExportError::InvalidParameter(e.body_text()))?;
    let request = ExportRequest::from_query(query, &state.settings)?;
    run_export(state.fetcher.as_ref(), &request, &state.settings).await
}

async fn health_check() -> &'static str {
    "ok"
}
