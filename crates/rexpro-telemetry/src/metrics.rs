//! Prometheus recorder and metric name constants.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Messages handled by the gate (counter, labels: kind, outcome).
pub const GATE_MESSAGES_TOTAL: &str = "rexpro_gate_messages_total";
/// Error responses written by the gate (counter, labels: code).
pub const GATE_ERRORS_TOTAL: &str = "rexpro_gate_errors_total";
/// Sessions created (counter).
pub const SESSIONS_CREATED_TOTAL: &str = "rexpro_sessions_created_total";
/// Sessions destroyed by kill requests (counter).
pub const SESSIONS_DESTROYED_TOTAL: &str = "rexpro_sessions_destroyed_total";
/// Identifier collisions hit while minting (counter).
pub const SESSION_MINT_COLLISIONS_TOTAL: &str = "rexpro_session_mint_collisions_total";
/// WebSocket connections opened (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "rexpro_ws_connections_total";
/// Active WebSocket connections (gauge).
pub const WS_CONNECTIONS_ACTIVE: &str = "rexpro_ws_connections_active";

#[derive(Debug, thiserror::Error)]
#[error("failed to install metrics recorder: {0}")]
pub struct MetricsError(#[from] BuildError);

/// Install the global Prometheus recorder.
///
/// Returns the handle used to render the `/metrics` endpoint. Call once at
/// startup before any metric is recorded.
pub fn install_recorder() -> Result<PrometheusHandle, MetricsError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    tracing::info!("prometheus metrics recorder installed");
    Ok(handle)
}
