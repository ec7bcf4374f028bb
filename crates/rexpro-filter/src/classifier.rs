use rexpro_core::messages::{KIND_SCRIPT, KIND_SESSION};
use rexpro_core::{Channel, InboundFrame, Message, ScopedRequest, ScriptRequest, SessionRequest};

/// Turn a decoded frame into exactly one [`Message`] variant.
///
/// Purely structural: only the kind tag is inspected. Unknown tags are
/// treated as session-scoped so newer request kinds still get validated.
pub fn classify(frame: InboundFrame) -> Message {
    let InboundFrame {
        kind,
        request,
        session,
        channel,
        meta,
        payload,
    } = frame;

    match kind.as_str() {
        KIND_SCRIPT => Message::Script(ScriptRequest {
            request,
            session,
            meta,
            payload,
        }),
        KIND_SESSION => Message::Session(SessionRequest {
            request,
            session,
            channel: channel
                .and_then(Channel::from_wire_code)
                .unwrap_or_default(),
            meta,
        }),
        _ => Message::Scoped(ScopedRequest {
            kind,
            request,
            session,
            meta,
            payload,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rexpro_core::{RequestId, SessionId};
    use serde_json::{json, Map, Value};

    fn frame(kind: &str) -> InboundFrame {
        InboundFrame {
            kind: kind.into(),
            request: RequestId::new(),
            session: None,
            channel: None,
            meta: Map::new(),
            payload: Value::Null,
        }
    }

    #[test]
    fn script_is_sessionless() {
        let mut f = frame("script");
        f.payload = json!({"script": "g.V().count()", "language": "groovy"});
        let request = f.request;
        match classify(f) {
            Message::Script(m) => {
                assert_eq!(m.request, request);
                assert_eq!(m.payload["script"], "g.V().count()");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn session_keeps_channel() {
        let mut f = frame("session");
        f.channel = Some(3);
        f.session = Some(SessionId::EMPTY);
        match classify(f) {
            Message::Session(m) => {
                assert_eq!(m.channel, Channel::GraphSon);
                assert_eq!(m.session, Some(SessionId::EMPTY));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn session_with_unknown_channel_uses_default() {
        let mut f = frame("session");
        f.channel = Some(42);
        assert!(matches!(
            classify(f),
            Message::Session(SessionRequest { channel: Channel::MsgPack, .. })
        ));
    }

    #[test]
    fn unknown_kinds_are_scoped() {
        for kind in ["traversal", "", "SCRIPT", "close"] {
            match classify(frame(kind)) {
                Message::Scoped(m) => assert_eq!(m.kind, kind),
                other => panic!("unexpected {other:?}"),
            }
        }
    }
}
