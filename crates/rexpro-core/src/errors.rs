use serde::{Deserialize, Serialize};

/// Wire-visible error codes carried by an error response.
///
/// The numeric values match the protocol's error-code table; codes the gate
/// never produces (auth, channel, serialization) are not modelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed message or lifecycle metadata.
    InvalidMessageError,
    /// Missing or unknown session on a session-scoped request.
    InvalidSessionError,
    /// Execution of a forwarded request failed.
    ScriptFailureError,
    /// A requested graph could not be bound into a new session.
    GraphConfigError,
}

impl ErrorCode {
    /// Numeric value sent as the error response `flag`.
    pub const fn wire_code(self) -> u8 {
        match self {
            Self::InvalidMessageError => 0,
            Self::InvalidSessionError => 1,
            Self::ScriptFailureError => 2,
            Self::GraphConfigError => 4,
        }
    }

    /// Canonical name, also used as a metrics label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidMessageError => "INVALID_MESSAGE_ERROR",
            Self::InvalidSessionError => "INVALID_SESSION_ERROR",
            Self::ScriptFailureError => "SCRIPT_FAILURE_ERROR",
            Self::GraphConfigError => "GRAPH_CONFIG_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural problems with session-request metadata.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    #[error("meta value for [{key}] is required")]
    Missing { key: &'static str },

    #[error("meta value for [{key}] must be of type {expected}")]
    WrongType {
        key: &'static str,
        expected: &'static str,
    },
}
