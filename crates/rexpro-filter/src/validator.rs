use rexpro_core::response::{SESSION_INVALID, SESSION_NOT_SPECIFIED};
use rexpro_core::{ScopedRequest, SessionId};
use rexpro_session::SessionRegistry;

/// Why a session-scoped request may not proceed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{}", SESSION_NOT_SPECIFIED)]
    NotSpecified,

    #[error("{}", SESSION_INVALID)]
    Invalid(SessionId),
}

/// Check that `request` names a live session.
///
/// The empty sentinel counts as "no session". The registry is only read.
pub fn validate_session(
    registry: &SessionRegistry,
    request: &ScopedRequest,
) -> Result<SessionId, ValidationError> {
    let session = match request.session {
        Some(id) if !id.is_empty() => id,
        _ => return Err(ValidationError::NotSpecified),
    };

    if registry.contains(&session) {
        Ok(session)
    } else {
        Err(ValidationError::Invalid(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rexpro_core::{Channel, RequestId};
    use rexpro_session::StaticGraphs;
    use serde_json::{Map, Value};

    fn scoped(session: Option<SessionId>) -> ScopedRequest {
        ScopedRequest {
            kind: "traversal".into(),
            request: RequestId::new(),
            session,
            meta: Map::new(),
            payload: Value::Null,
        }
    }

    #[test]
    fn missing_session_is_not_specified() {
        let registry = SessionRegistry::new();
        let err = validate_session(&registry, &scoped(None)).unwrap_err();
        assert_eq!(err, ValidationError::NotSpecified);
        assert_eq!(err.to_string(), "session not specified");
    }

    #[test]
    fn empty_sentinel_is_not_specified() {
        let registry = SessionRegistry::new();
        assert_eq!(
            validate_session(&registry, &scoped(Some(SessionId::EMPTY))),
            Err(ValidationError::NotSpecified)
        );
    }

    #[test]
    fn unknown_session_is_invalid() {
        let registry = SessionRegistry::new();
        let id = SessionId::new();
        let err = validate_session(&registry, &scoped(Some(id))).unwrap_err();
        assert_eq!(err, ValidationError::Invalid(id));
        assert_eq!(err.to_string(), "invalid session");
    }

    #[test]
    fn live_session_passes() {
        let registry = SessionRegistry::new();
        let id = SessionId::new();
        let _ = registry
            .create(id, Arc::new(StaticGraphs::new()), Channel::MsgPack)
            .unwrap();
        assert_eq!(validate_session(&registry, &scoped(Some(id))), Ok(id));
        assert_eq!(registry.len(), 1);
    }
}
