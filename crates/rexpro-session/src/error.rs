use rexpro_core::SessionId;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session already exists: {0}")]
    AlreadyExists(SessionId),
}

/// Failure to bind a graph object into a session.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GraphBindingError {
    #[error("the graph [{0}] was not found")]
    UnknownGraph(String),

    #[error("[{0}] is not a valid graph object name")]
    InvalidObjectName(String),
}
