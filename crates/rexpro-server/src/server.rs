//! `RexProServer`: Axum HTTP + WebSocket server.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use rexpro_filter::FilterGate;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::connection::run_connection;
use crate::error::ServerError;
use crate::execution::ExecutionStage;
use crate::health::HealthResponse;
use crate::shutdown::ShutdownCoordinator;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Session gate every inbound frame passes through.
    pub gate: Arc<FilterGate>,
    /// Stage receiving the messages the gate forwards.
    pub execution: Arc<dyn ExecutionStage>,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// Open WebSocket connections.
    pub connections: Arc<AtomicUsize>,
    /// Prometheus handle backing `/metrics`, if a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
    /// When the server started.
    pub start_time: Instant,
    /// Largest accepted WebSocket frame in bytes.
    pub max_message_size: usize,
    connection_seq: Arc<AtomicU64>,
}

impl AppState {
    pub(crate) fn next_connection_id(&self) -> u64 {
        self.connection_seq.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// The RexPro front end: session gate behind a WebSocket endpoint.
pub struct RexProServer {
    config: ServerConfig,
    state: AppState,
}

impl RexProServer {
    /// Create a new server around `gate`, handing forwarded messages to
    /// `execution`.
    pub fn new(
        config: ServerConfig,
        gate: Arc<FilterGate>,
        execution: Arc<dyn ExecutionStage>,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        let state = AppState {
            gate,
            execution,
            shutdown: Arc::new(ShutdownCoordinator::new()),
            connections: Arc::new(AtomicUsize::new(0)),
            metrics,
            start_time: Instant::now(),
            max_message_size: config.max_message_size,
            connection_seq: Arc::new(AtomicU64::new(0)),
        };
        Self { config, state }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/ws", get(ws_handler))
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind the configured address and serve until shutdown is signalled.
    ///
    /// Returns the bound address (useful with port `0`) and the serve task.
    pub async fn listen(&self) -> Result<(SocketAddr, JoinHandle<()>), ServerError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "rexpro server listening");

        let router = self.router();
        let token = self.state.shutdown.token();
        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await;
            if let Err(e) = result {
                tracing::error!(error = %e, "server terminated with error");
            }
        });

        Ok((local_addr, handle))
    }

    /// Get the session gate.
    pub fn gate(&self) -> &Arc<FilterGate> {
        &self.state.gate
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.state.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Number of WebSocket connections currently open.
    pub fn connection_count(&self) -> usize {
        self.state.connections.load(Ordering::Relaxed)
    }
}

/// GET /ws
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.max_message_size(state.max_message_size)
        .on_upgrade(move |socket| run_connection(socket, state))
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::capture(
        &state.gate,
        state.start_time,
        state.connections.load(Ordering::Relaxed),
    ))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_owned()),
    }
}
