//! The stage that receives messages the gate forwards.

use async_trait::async_trait;
use rexpro_core::{ErrorCode, Message, Response, SessionId};

/// Next stage after the session gate.
///
/// Implementations run scripts and scoped requests. Every forwarded message
/// gets exactly one response.
#[async_trait]
pub trait ExecutionStage: Send + Sync {
    async fn execute(&self, message: Message) -> Response;
}

/// Stage used when no script engine is wired in.
///
/// Answers every forwarded message with `SCRIPT_FAILURE_ERROR`.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableExecution;

#[async_trait]
impl ExecutionStage for UnavailableExecution {
    async fn execute(&self, message: Message) -> Response {
        Response::error(
            message.request_id(),
            message.session().unwrap_or(SessionId::EMPTY),
            ErrorCode::ScriptFailureError,
            format!("no script engine available for [{}] requests", message.kind()),
        )
    }
}
