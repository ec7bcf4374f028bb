//! JSON text framing for the WebSocket transport.

use rexpro_core::{ErrorCode, InboundFrame, RequestId, Response, SessionId};
use serde_json::Value;

/// A frame that could not be decoded into an [`InboundFrame`].
#[derive(Debug, thiserror::Error)]
#[error("malformed frame: {source}")]
pub struct CodecError {
    /// Request id recovered from the raw text, or [`RequestId::UNKNOWN`].
    pub request: RequestId,
    #[source]
    source: serde_json::Error,
}

impl CodecError {
    /// The `INVALID_MESSAGE_ERROR` answer for this frame.
    pub fn to_response(&self) -> Response {
        Response::error(
            self.request,
            SessionId::EMPTY,
            ErrorCode::InvalidMessageError,
            self.to_string(),
        )
    }
}

/// Parse one JSON text frame.
pub fn decode_frame(text: &str) -> Result<InboundFrame, CodecError> {
    serde_json::from_str(text).map_err(|source| CodecError {
        request: salvage_request_id(text),
        source,
    })
}

/// Serialize a response as a JSON text frame.
pub fn encode_response(response: &Response) -> Result<String, serde_json::Error> {
    serde_json::to_string(response)
}

fn salvage_request_id(text: &str) -> RequestId {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| v.get("request")?.as_str()?.parse().ok())
        .unwrap_or(RequestId::UNKNOWN)
}
