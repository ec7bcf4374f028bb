//! Body of the `/health` endpoint.
//!
//! Besides liveness it reports what a client needs to open a session: the
//! graphs that can be bound and how malformed session metadata is treated.

use std::time::Instant;

use rexpro_filter::{FilterGate, MetadataPolicy};
use serde::Serialize;

/// Snapshot served by `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// `"ok"` whenever the server can answer at all.
    pub status: &'static str,
    pub uptime_secs: u64,
    /// Open WebSocket connections.
    pub connections: usize,
    pub sessions: SessionHealth,
}

/// Session side of the health snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SessionHealth {
    /// Live sessions in the registry.
    pub active: usize,
    /// Graphs a session request may bind, sorted.
    pub graphs: Vec<String>,
    pub metadata_policy: MetadataPolicy,
}

impl HealthResponse {
    /// Capture the gate's current state alongside transport counters.
    pub fn capture(gate: &FilterGate, started: Instant, connections: usize) -> Self {
        Self {
            status: "ok",
            uptime_secs: started.elapsed().as_secs(),
            connections,
            sessions: SessionHealth {
                active: gate.registry().len(),
                graphs: gate.graph_names(),
                metadata_policy: gate.config().metadata_policy,
            },
        }
    }
}
