use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rexpro_core::{Channel, SessionId};

use crate::error::SessionError;
use crate::graph::GraphProvider;
use crate::session::Session;

/// Process-wide registry of live sessions.
///
/// Constructed once by the server and shared as `Arc<SessionRegistry>`.
/// The registry owns every [`Session`]; callers only ever borrow `Arc`
/// handles for the duration of one message.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Arc<Session>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` names a live session.
    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Look up a live session.
    pub fn get(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.sessions.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Publish a fully built session. Fails if the id is already taken;
    /// the existing entry is never replaced.
    pub fn try_insert(&self, session: Session) -> Result<Arc<Session>, SessionError> {
        match self.sessions.entry(session.id()) {
            Entry::Occupied(entry) => Err(SessionError::AlreadyExists(*entry.key())),
            Entry::Vacant(entry) => {
                let session = Arc::new(session);
                let _ = entry.insert(Arc::clone(&session));
                tracing::debug!(session_id = %session.id(), "session registered");
                Ok(session)
            }
        }
    }

    /// Create a bare session bound to `channel` and `application`.
    pub fn create(
        &self,
        id: SessionId,
        application: Arc<dyn GraphProvider>,
        channel: Channel,
    ) -> Result<Arc<Session>, SessionError> {
        self.try_insert(Session::new(id, application, channel))
    }

    /// Remove a session. Removing an unknown id is a no-op.
    pub fn destroy(&self, id: &SessionId) -> Option<Arc<Session>> {
        let removed = self.sessions.remove(id).map(|(_, session)| session);
        if removed.is_some() {
            tracing::debug!(session_id = %id, "session destroyed");
        }
        removed
    }

    /// Remove every session, returning how many were dropped.
    pub fn destroy_all(&self) -> usize {
        let ids = self.session_ids();
        ids.iter().filter(|id| self.destroy(id).is_some()).count()
    }

    /// Ids of all live sessions, sorted.
    pub fn session_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.sessions.iter().map(|entry| *entry.key()).collect();
        ids.sort();
        ids
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
