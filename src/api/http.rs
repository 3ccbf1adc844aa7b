use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::error::ApiError;
use crate::logging::MetricsLogger;
use crate::models::EnrichedTransfer;
use crate::pipeline::Pipeline;

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response structure for the health endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub registry_tokens: usize,
    pub window_size: u64,
    pub threshold_usd: f64,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

/// HTTP API server
pub struct ApiServer {
    state: AppState,
    host: String,
    pub port: u16,
}

impl ApiServer {
    /// Create a new API server instance
    pub fn new(pipeline: Arc<Pipeline>, host: String, port: u16) -> Self {
        Self {
            state: AppState { pipeline },
            host,
            port,
        }
    }

    /// Start the HTTP server
    pub async fn start(&self) -> Result<(), ApiError> {
        let app = create_router(self.state.clone());

        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ApiError::Bind {
                addr: addr.clone(),
                source: e,
            })?;

        log::info!("HTTP API server starting on {}", addr);

        axum::serve(listener, app)
            .await
            .map_err(|e| ApiError::Server(format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// Build the application router; kept separate so tests can drive it
/// without binding a socket.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/transactions", get(get_transactions))
        .route("/health", get(get_health))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

/// GET /transactions - Scan the recent window and return every token
/// transfer at or above the configured USD threshold
pub async fn get_transactions(
    State(state): State<AppState>,
) -> Result<Json<Vec<EnrichedTransfer>>, (StatusCode, Json<ErrorResponse>)> {
    let started = Instant::now();

    match state.pipeline.run().await {
        Ok(transfers) => {
            MetricsLogger::log_request_served(
                "/transactions",
                transfers.len(),
                started.elapsed().as_millis() as u64,
            );
            Ok(Json(transfers))
        }
        Err(e) => {
            log::error!("Pipeline run failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}

/// GET /health - Liveness check with the scan parameters in effect
pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        registry_tokens: state.pipeline.registry().len(),
        window_size: state.pipeline.window_size(),
        threshold_usd: state.pipeline.threshold_usd(),
    })
}
