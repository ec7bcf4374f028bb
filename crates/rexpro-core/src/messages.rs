//! Inbound protocol units.
//!
//! An [`InboundFrame`] is what the wire codec hands over: a kind tag plus the
//! common envelope fields. The gate classifies every frame into exactly one
//! [`Message`] variant before doing anything else with it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::MetadataError;
use crate::ids::{RequestId, SessionId};

/// Kind tag of sessionless script requests.
pub const KIND_SCRIPT: &str = "script";
/// Kind tag of session lifecycle requests.
pub const KIND_SESSION: &str = "session";

/// Metadata key: destroy the named session instead of creating one.
pub const META_KILL_SESSION: &str = "killSession";
/// Metadata key: graph to bind into a new session.
pub const META_GRAPH_NAME: &str = "graphName";
/// Metadata key: variable name the bound graph is exposed under.
pub const META_GRAPH_OBJECT_NAME: &str = "graphObjName";

/// Serialization channel a session was opened on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Console,
    #[default]
    MsgPack,
    GraphSon,
}

impl Channel {
    /// Decode the channel byte of a session request (`1`, `2` or `3`).
    pub const fn from_wire_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Console),
            2 => Some(Self::MsgPack),
            3 => Some(Self::GraphSon),
            _ => None,
        }
    }
}

/// A decoded but not yet classified frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InboundFrame {
    #[serde(rename = "type")]
    pub kind: String,
    pub request: RequestId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<u8>,
    #[serde(default)]
    pub meta: Map<String, Value>,
    #[serde(default)]
    pub payload: Value,
}

/// Sessionless script request. Forwarded untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptRequest {
    pub request: RequestId,
    pub session: Option<SessionId>,
    pub meta: Map<String, Value>,
    pub payload: Value,
}

/// Request to open or close a session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionRequest {
    pub request: RequestId,
    pub session: Option<SessionId>,
    pub channel: Channel,
    pub meta: Map<String, Value>,
}

/// Any other request kind; must run inside a live session.
#[derive(Clone, Debug, PartialEq)]
pub struct ScopedRequest {
    pub kind: String,
    pub request: RequestId,
    pub session: Option<SessionId>,
    pub meta: Map<String, Value>,
    pub payload: Value,
}

/// Classified inbound message.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    Script(ScriptRequest),
    Session(SessionRequest),
    Scoped(ScopedRequest),
}

impl Message {
    pub fn request_id(&self) -> RequestId {
        match self {
            Self::Script(m) => m.request,
            Self::Session(m) => m.request,
            Self::Scoped(m) => m.request,
        }
    }

    pub fn session(&self) -> Option<SessionId> {
        match self {
            Self::Script(m) => m.session,
            Self::Session(m) => m.session,
            Self::Scoped(m) => m.session,
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::Script(_) => KIND_SCRIPT,
            Self::Session(_) => KIND_SESSION,
            Self::Scoped(m) => &m.kind,
        }
    }
}

/// Typed view of session-request metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LifecycleMeta {
    pub kill_session: bool,
    pub graph_name: Option<String>,
    pub graph_obj_name: Option<String>,
}

impl SessionRequest {
    /// Check the metadata map structurally and return its typed form.
    ///
    /// `killSession` must be present and boolean. The graph keys may be
    /// absent or null; when present they must be strings.
    pub fn validate_meta(&self) -> Result<LifecycleMeta, MetadataError> {
        let kill_session = match self.meta.get(META_KILL_SESSION) {
            None | Some(Value::Null) => {
                return Err(MetadataError::Missing {
                    key: META_KILL_SESSION,
                })
            }
            Some(Value::Bool(b)) => *b,
            Some(_) => {
                return Err(MetadataError::WrongType {
                    key: META_KILL_SESSION,
                    expected: "boolean",
                })
            }
        };

        Ok(LifecycleMeta {
            kill_session,
            graph_name: optional_meta_str(&self.meta, META_GRAPH_NAME)?,
            graph_obj_name: optional_meta_str(&self.meta, META_GRAPH_OBJECT_NAME)?,
        })
    }

    /// Best-effort reading of the metadata that never fails: ill-typed
    /// values are treated as absent.
    pub fn lenient_meta(&self) -> LifecycleMeta {
        LifecycleMeta {
            kill_session: self
                .meta
                .get(META_KILL_SESSION)
                .and_then(Value::as_bool)
                .unwrap_or(false),
            graph_name: self
                .meta
                .get(META_GRAPH_NAME)
                .and_then(Value::as_str)
                .map(str::to_owned),
            graph_obj_name: self
                .meta
                .get(META_GRAPH_OBJECT_NAME)
                .and_then(Value::as_str)
                .map(str::to_owned),
        }
    }
}

fn optional_meta_str(
    meta: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<String>, MetadataError> {
    match meta.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(MetadataError::WrongType {
            key,
            expected: "string",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session_request(meta: Value) -> SessionRequest {
        SessionRequest {
            request: RequestId::new(),
            session: None,
            channel: Channel::default(),
            meta: meta.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn validate_meta_create_without_graph() {
        let req = session_request(json!({"killSession": false, "graphName": null}));
        let meta = req.validate_meta().unwrap();
        assert_eq!(meta, LifecycleMeta::default());
    }

    #[test]
    fn validate_meta_with_graph() {
        let req = session_request(json!({
            "killSession": false,
            "graphName": "tinkergraph",
            "graphObjName": "graph"
        }));
        let meta = req.validate_meta().unwrap();
        assert_eq!(meta.graph_name.as_deref(), Some("tinkergraph"));
        assert_eq!(meta.graph_obj_name.as_deref(), Some("graph"));
    }

    #[test]
    fn validate_meta_requires_kill_flag() {
        let req = session_request(json!({"graphName": "tinkergraph"}));
        assert_eq!(
            req.validate_meta().unwrap_err(),
            MetadataError::Missing { key: META_KILL_SESSION }
        );
    }

    #[test]
    fn validate_meta_rejects_non_boolean_kill_flag() {
        let req = session_request(json!({"killSession": "yes"}));
        assert!(matches!(
            req.validate_meta(),
            Err(MetadataError::WrongType { key: META_KILL_SESSION, .. })
        ));
    }

    #[test]
    fn validate_meta_rejects_non_string_graph_name() {
        let req = session_request(json!({"killSession": false, "graphName": 7}));
        assert!(matches!(
            req.validate_meta(),
            Err(MetadataError::WrongType { key: META_GRAPH_NAME, .. })
        ));
    }

    #[test]
    fn lenient_meta_ignores_bad_types() {
        let req = session_request(json!({"killSession": "yes", "graphName": 7, "graphObjName": "g2"}));
        let meta = req.lenient_meta();
        assert!(!meta.kill_session);
        assert!(meta.graph_name.is_none());
        assert_eq!(meta.graph_obj_name.as_deref(), Some("g2"));
    }

    #[test]
    fn frame_decodes_with_defaults() {
        let frame: InboundFrame = serde_json::from_str(
            r#"{"type":"script","request":"6f1c2a8e-0d4b-4a39-9d55-2a0e6c1f7b10"}"#,
        )
        .unwrap();
        assert_eq!(frame.kind, KIND_SCRIPT);
        assert!(frame.session.is_none());
        assert!(frame.meta.is_empty());
        assert_eq!(frame.payload, Value::Null);
    }

    #[test]
    fn channel_wire_codes() {
        assert_eq!(Channel::from_wire_code(1), Some(Channel::Console));
        assert_eq!(Channel::from_wire_code(3), Some(Channel::GraphSon));
        assert_eq!(Channel::from_wire_code(9), None);
        assert_eq!(Channel::from_wire_code(2), Some(Channel::default()));
    }

    #[test]
    fn message_accessors() {
        let id = RequestId::new();
        let msg = Message::Scoped(ScopedRequest {
            kind: "traversal".into(),
            request: id,
            session: Some(SessionId::EMPTY),
            meta: Map::new(),
            payload: Value::Null,
        });
        assert_eq!(msg.request_id(), id);
        assert_eq!(msg.kind(), "traversal");
        assert_eq!(msg.session(), Some(SessionId::EMPTY));
    }
}
