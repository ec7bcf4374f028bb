use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rexpro_core::{Channel, SessionId};

use crate::error::GraphBindingError;
use crate::graph::{Graph, GraphProvider};

/// Variable name a bound graph is exposed under when the client names none.
pub const DEFAULT_GRAPH_OBJECT_NAME: &str = "g";

/// A graph bound into a session under a variable name.
#[derive(Clone, Debug)]
pub struct BoundGraph {
    pub graph_name: String,
    pub object_name: String,
    pub graph: Arc<dyn Graph>,
}

/// Server-side state for one session identifier.
pub struct Session {
    id: SessionId,
    application: Arc<dyn GraphProvider>,
    channel: Channel,
    created_at: DateTime<Utc>,
    graph: Option<BoundGraph>,
}

impl Session {
    /// Create an unbound session resolving graphs through `application`.
    pub fn new(id: SessionId, application: Arc<dyn GraphProvider>, channel: Channel) -> Self {
        Self {
            id,
            application,
            channel,
            created_at: Utc::now(),
            graph: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// When the session was created, in UTC.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The graph bound at creation, if the client asked for one.
    pub fn bound_graph(&self) -> Option<&BoundGraph> {
        self.graph.as_ref()
    }

    /// Bind the named graph from the application context into this session.
    ///
    /// `object_name` defaults to [`DEFAULT_GRAPH_OBJECT_NAME`]. On failure the
    /// session is left unchanged.
    pub fn bind_graph(
        &mut self,
        graph_name: &str,
        object_name: Option<&str>,
    ) -> Result<(), GraphBindingError> {
        let object_name = object_name.unwrap_or(DEFAULT_GRAPH_OBJECT_NAME);
        if !is_valid_object_name(object_name) {
            return Err(GraphBindingError::InvalidObjectName(object_name.to_owned()));
        }

        let graph = self
            .application
            .graph(graph_name)
            .ok_or_else(|| GraphBindingError::UnknownGraph(graph_name.to_owned()))?;

        self.graph = Some(BoundGraph {
            graph_name: graph_name.to_owned(),
            object_name: object_name.to_owned(),
            graph,
        });
        Ok(())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("channel", &self.channel)
            .field("created_at", &self.created_at)
            .field("graph", &self.graph)
            .finish_non_exhaustive()
    }
}

/// Script variable rules: a letter or underscore, then letters, digits or underscores.
fn is_valid_object_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::StaticGraphs;

    fn app() -> Arc<dyn GraphProvider> {
        Arc::new(StaticGraphs::from_names(["tinkergraph"]))
    }

    #[test]
    fn new_session_has_no_graph() {
        let id = SessionId::new();
        let session = Session::new(id, app(), Channel::Console);
        assert_eq!(session.id(), id);
        assert_eq!(session.channel(), Channel::Console);
        assert!(session.bound_graph().is_none());
    }

    #[test]
    fn bind_graph_uses_default_object_name() {
        let mut session = Session::new(SessionId::new(), app(), Channel::MsgPack);
        session.bind_graph("tinkergraph", None).unwrap();
        let bound = session.bound_graph().unwrap();
        assert_eq!(bound.graph_name, "tinkergraph");
        assert_eq!(bound.object_name, "g");
        assert_eq!(bound.graph.name(), "tinkergraph");
    }

    #[test]
    fn bind_graph_with_custom_object_name() {
        let mut session = Session::new(SessionId::new(), app(), Channel::MsgPack);
        session.bind_graph("tinkergraph", Some("tg_1")).unwrap();
        assert_eq!(session.bound_graph().unwrap().object_name, "tg_1");
    }

    #[test]
    fn bind_unknown_graph_fails_and_leaves_session_untouched() {
        let mut session = Session::new(SessionId::new(), app(), Channel::MsgPack);
        let err = session.bind_graph("bad-graph", None).unwrap_err();
        assert_eq!(err, GraphBindingError::UnknownGraph("bad-graph".into()));
        assert!(session.bound_graph().is_none());
    }

    #[test]
    fn bind_rejects_invalid_object_names() {
        let mut session = Session::new(SessionId::new(), app(), Channel::MsgPack);
        for bad in ["", "1g", "g-raph", "g raph"] {
            assert!(matches!(
                session.bind_graph("tinkergraph", Some(bad)),
                Err(GraphBindingError::InvalidObjectName(_))
            ));
        }
        assert!(session.bound_graph().is_none());
    }

    #[test]
    fn debug_omits_application() {
        let session = Session::new(SessionId::EMPTY, app(), Channel::GraphSon);
        let out = format!("{session:?}");
        assert!(out.contains("GraphSon"));
        assert!(!out.contains("application"));
    }
}
