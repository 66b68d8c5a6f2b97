pub mod error;
pub mod handlers;

use crate::adapters::{LocalStorage, RestDocumentStore};
use crate::core::engine::SyncEngine;
use crate::core::pipeline::StationPipeline;
use crate::core::state::StationState;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub type StationEngine = SyncEngine<StationPipeline<LocalStorage, RestDocumentStore>>;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<StationEngine>,
    pub station_id: String,
}

impl AppState {
    pub fn new(engine: Arc<StationEngine>, station_id: impl Into<String>) -> Self {
        Self {
            engine,
            station_id: station_id.into(),
        }
    }

    pub fn station(&self) -> &StationState {
        self.engine.state()
    }
}

/// Allows a single origin when configured, any origin otherwise.
pub fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ]);

    match allowed_origin.and_then(|origin| HeaderValue::from_str(origin).ok()) {
        Some(origin) => cors.allow_origin(origin),
        None => cors.allow_origin(Any),
    }
}

pub fn build_router(state: AppState, allowed_origin: Option<&str>) -> Router {
    Router::new()
        .route("/", get(handlers::health_check))
        .route("/refresh", get(handlers::refresh).post(handlers::refresh))
        .route("/records", get(handlers::list_records))
        .route("/latest", get(handlers::latest_record))
        .route("/download", get(handlers::download_records))
        .route("/flood_history", get(handlers::flood_history))
        .route("/report_flood", post(handlers::report_flood))
        .layer(cors_layer(allowed_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(router: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
