//! HTTP read API for reconstructed trace stacks.
//!
//! - `GET /health` - liveness and version
//! - `GET /trace/stack/globalTraceId?globalTraceId=<id>` - ordered span array

use crate::core::config::ServerConfig;
use crate::core::{Result, TraceStackError};
use crate::stack::TraceStackService;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// API server state.
#[derive(Clone)]
struct ApiState {
    stack: TraceStackService,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

/// Query parameters for the trace stack endpoint.
#[derive(Debug, Deserialize)]
struct TraceStackQuery {
    #[serde(rename = "globalTraceId")]
    global_trace_id: Option<String>,
}

/// Build the API router.
pub fn router(stack: TraceStackService, config: &ServerConfig) -> Router {
    let mut app = Router::new()
        .route("/health", get(health_handler))
        .route("/trace/stack/globalTraceId", get(trace_stack_handler))
        .with_state(ApiState { stack })
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(config.request_timeout)),
        );

    if config.enable_cors {
        app = app.layer(CorsLayer::permissive());
    }

    app
}

/// Start the API server and serve until ctrl-c.
pub async fn start_server(stack: TraceStackService, config: &ServerConfig) -> Result<()> {
    let app = router(stack, config);
    let addr = SocketAddr::new(config.bind_address, config.port);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| TraceStackError::network(format!("Failed to bind to {}: {}", addr, e)))?;
    tracing::info!("Starting trace stack API on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Received shutdown signal, stopping...");
        })
        .await
        .map_err(|e| TraceStackError::network(format!("API server error: {}", e)))?;

    Ok(())
}

/// GET /health
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /trace/stack/globalTraceId - spans of one trace in tree order
async fn trace_stack_handler(
    State(state): State<ApiState>,
    Query(params): Query<TraceStackQuery>,
) -> impl IntoResponse {
    let global_trace_id = match parse_global_trace_id(params.global_trace_id) {
        Ok(id) => id,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                    code: 400,
                }),
            )
                .into_response();
        },
    };

    tracing::debug!(global_trace_id = %global_trace_id, "trace stack requested");
    Json(state.stack.load(&global_trace_id).await).into_response()
}

fn parse_global_trace_id(raw: Option<String>) -> Result<String> {
    let id = raw.map(|id| id.trim().to_string()).unwrap_or_default();
    if id.is_empty() {
        return Err(TraceStackError::invalid_argument("globalTraceId must not be empty"));
    }
    Ok(id)
}
