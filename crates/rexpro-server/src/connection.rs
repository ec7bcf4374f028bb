//! WebSocket connection lifecycle: from upgrade through disconnect.
//!
//! Each text (or UTF-8 binary) frame is decoded, run through the session
//! gate, and, when the gate forwards it, handed to the execution stage.
//! Responses go back on the same socket in the order they were produced.

use std::sync::atomic::Ordering;

use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures::{Sink, SinkExt, StreamExt};
use metrics::{counter, gauge};
use rexpro_core::Response;
use rexpro_filter::{FilterGate, NextAction};
use rexpro_telemetry::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL};
use tracing::{debug, info, instrument, warn};

use crate::codec::{decode_frame, encode_response};
use crate::execution::ExecutionStage;
use crate::server::AppState;

/// Decode one frame and produce every response it yields.
pub async fn process_frame(
    text: &str,
    gate: &FilterGate,
    execution: &dyn ExecutionStage,
) -> Vec<Response> {
    let frame = match decode_frame(text) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(error = %e, "rejecting malformed frame");
            return vec![e.to_response()];
        }
    };

    let mut responses = Vec::new();
    if let NextAction::Invoke(message) = gate.handle(frame, &mut responses) {
        responses.push(execution.execute(message).await);
    }
    responses
}

/// Serve one upgraded socket until the client leaves or shutdown begins.
#[instrument(skip_all, fields(connection_id))]
pub async fn run_connection(socket: WebSocket, state: AppState) {
    let connection_id = state.next_connection_id();
    tracing::Span::current().record("connection_id", connection_id);

    let _ = state.connections.fetch_add(1, Ordering::Relaxed);
    counter!(WS_CONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).increment(1.0);
    info!("client connected");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let token = state.shutdown.token();

    loop {
        let msg = tokio::select! {
            () = token.cancelled() => {
                debug!("shutdown requested, closing connection");
                let _ = ws_tx.send(WsMessage::Close(None)).await;
                break;
            }
            msg = ws_rx.next() => msg,
        };

        let text = match msg {
            Some(Ok(WsMessage::Text(t))) => t.to_string(),
            Some(Ok(WsMessage::Binary(data))) => match String::from_utf8(data.to_vec()) {
                Ok(s) => s,
                Err(_) => {
                    info!(len = data.len(), "ignoring non-UTF8 binary frame");
                    continue;
                }
            },
            Some(Ok(WsMessage::Close(_))) => {
                info!("client sent close frame");
                break;
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                debug!(error = %e, "websocket receive error");
                break;
            }
            None => break,
        };

        let responses = process_frame(&text, &state.gate, state.execution.as_ref()).await;
        if !send_all(&mut ws_tx, &responses).await {
            break;
        }
    }

    let _ = state.connections.fetch_sub(1, Ordering::Relaxed);
    gauge!(WS_CONNECTIONS_ACTIVE).decrement(1.0);
    info!("client disconnected");
}

async fn send_all<S>(ws_tx: &mut S, responses: &[Response]) -> bool
where
    S: Sink<WsMessage> + Unpin,
{
    for response in responses {
        let text = match encode_response(response) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, request = %response.request_id(), "failed to encode response");
                continue;
            }
        };
        if ws_tx.send(WsMessage::Text(text.into())).await.is_err() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rexpro_core::{ErrorCode, RequestId, SessionId};
    use rexpro_filter::FilterConfig;
    use rexpro_session::{SessionRegistry, StaticEngines, StaticGraphs};
    use serde_json::json;

    use crate::execution::UnavailableExecution;

    fn gate() -> FilterGate {
        FilterGate::new(
            Arc::new(SessionRegistry::new()),
            Arc::new(StaticGraphs::from_names(["tinkergraph"])),
            Arc::new(StaticEngines::new(["groovy"])),
            FilterConfig::default(),
        )
    }

    #[tokio::test]
    async fn malformed_frame_yields_single_invalid_message() {
        let out = process_frame("not json", &gate(), &UnavailableExecution).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].error_code(), Some(ErrorCode::InvalidMessageError));
    }

    #[tokio::test]
    async fn script_goes_to_execution_stage() {
        let request = RequestId::new();
        let text = json!({"type": "script", "request": request}).to_string();
        let out = process_frame(&text, &gate(), &UnavailableExecution).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].request_id(), request);
        assert_eq!(out[0].error_code(), Some(ErrorCode::ScriptFailureError));
    }

    #[tokio::test]
    async fn session_open_then_scoped_request_reaches_execution() {
        let gate = gate();
        let open = json!({
            "type": "session",
            "request": RequestId::new(),
            "meta": {"killSession": false}
        })
        .to_string();
        let out = process_frame(&open, &gate, &UnavailableExecution).await;
        assert_eq!(out.len(), 1);
        let session = out[0].session_id();
        assert!(!session.is_empty());

        let scoped = json!({"type": "traversal", "request": RequestId::new(), "session": session})
            .to_string();
        let out = process_frame(&scoped, &gate, &UnavailableExecution).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].session_id(), session);
        assert_eq!(out[0].error_code(), Some(ErrorCode::ScriptFailureError));
    }

    #[tokio::test]
    async fn scoped_request_without_session_never_reaches_execution() {
        let text = json!({"type": "traversal", "request": RequestId::new()}).to_string();
        let out = process_frame(&text, &gate(), &UnavailableExecution).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].error_code(), Some(ErrorCode::InvalidSessionError));
        assert_eq!(out[0].session_id(), SessionId::EMPTY);
    }
}
