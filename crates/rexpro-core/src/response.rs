//! Responses the gate writes back to a client, and their builders.

use serde::{Deserialize, Serialize};

use crate::errors::ErrorCode;
use crate::ids::{RequestId, SessionId};

/// Detail carried when a scoped request names no session.
pub const SESSION_NOT_SPECIFIED: &str = "session not specified";
/// Detail carried when a scoped request names a session that is not live.
pub const SESSION_INVALID: &str = "invalid session";

/// Acknowledgement of a lifecycle request.
///
/// A kill is acknowledged with the empty session and no languages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub request: RequestId,
    pub session: SessionId,
    #[serde(default)]
    pub languages: Vec<String>,
}

/// Wire error response.
///
/// Carries the code twice: by name, and as the protocol's numeric `flag`
/// that older clients switch on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub request: RequestId,
    pub session: SessionId,
    pub code: ErrorCode,
    pub flag: u8,
    pub message: String,
}

/// Every response this layer can produce.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Session(SessionResponse),
    Error(ErrorResponse),
}

impl Response {
    /// Error response; `flag` is derived from `code`.
    pub fn error(
        request: RequestId,
        session: SessionId,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self::Error(ErrorResponse {
            request,
            session,
            code,
            flag: code.wire_code(),
            message: message.into(),
        })
    }

    /// Session response carrying the empty session, used to acknowledge a kill.
    pub fn empty_session(request: RequestId) -> Self {
        Self::Session(SessionResponse {
            request,
            session: SessionId::EMPTY,
            languages: Vec::new(),
        })
    }

    /// Response for a freshly created session.
    pub fn new_session(request: RequestId, session: SessionId, languages: Vec<String>) -> Self {
        Self::Session(SessionResponse {
            request,
            session,
            languages,
        })
    }

    pub fn request_id(&self) -> RequestId {
        match self {
            Self::Session(r) => r.request,
            Self::Error(r) => r.request,
        }
    }

    pub fn session_id(&self) -> SessionId {
        match self {
            Self::Session(r) => r.session,
            Self::Error(r) => r.session,
        }
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Error(r) => Some(r.code),
            Self::Session(_) => None,
        }
    }
}
