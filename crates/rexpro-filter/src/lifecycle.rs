//! Session creation and destruction.

use std::sync::Arc;

use metrics::counter;
use rexpro_core::{ErrorCode, LifecycleMeta, RequestId, Response, SessionId, SessionRequest};
use rexpro_session::{
    EngineLanguages, GraphBindingError, GraphProvider, Session, SessionError, SessionRegistry,
};
use rexpro_telemetry::metrics::{
    SESSIONS_CREATED_TOTAL, SESSIONS_DESTROYED_TOTAL, SESSION_MINT_COLLISIONS_TOTAL,
};
use tracing::{debug, info, warn};

use crate::config::FilterConfig;

/// Source of fresh session identifiers.
pub type IdMinter = Arc<dyn Fn() -> SessionId + Send + Sync>;

/// Failure of the create path.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    GraphConfig(#[from] GraphBindingError),

    #[error("could not allocate a session identifier after {attempts} attempts")]
    IdentifierExhausted { attempts: u32 },
}

impl LifecycleError {
    /// Wire error code this failure is reported under.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::GraphConfig(_) => ErrorCode::GraphConfigError,
            Self::IdentifierExhausted { .. } => ErrorCode::InvalidSessionError,
        }
    }

    /// Wire response for this failure. No session context exists yet, so
    /// the empty sentinel is echoed.
    pub fn to_response(&self, request: RequestId) -> Response {
        Response::error(request, SessionId::EMPTY, self.code(), self.to_string())
    }
}

/// Creates and destroys sessions on behalf of session requests.
pub struct LifecycleHandler {
    registry: Arc<SessionRegistry>,
    application: Arc<dyn GraphProvider>,
    engines: Arc<dyn EngineLanguages>,
    config: FilterConfig,
    mint: IdMinter,
}

impl LifecycleHandler {
    /// Create a handler that mints identifiers with [`SessionId::new`].
    pub fn new(
        registry: Arc<SessionRegistry>,
        application: Arc<dyn GraphProvider>,
        engines: Arc<dyn EngineLanguages>,
        config: FilterConfig,
    ) -> Self {
        Self {
            registry,
            application,
            engines,
            config,
            mint: Arc::new(SessionId::new),
        }
    }

    /// Replace the identifier source.
    #[must_use]
    pub fn with_id_minter(mut self, mint: IdMinter) -> Self {
        self.mint = mint;
        self
    }

    /// Names of the graphs sessions may bind.
    pub fn graph_names(&self) -> Vec<String> {
        self.application.graph_names()
    }

    /// Destroy the session named by `request`, if any, and acknowledge with
    /// the empty session. Unknown or missing ids are not an error.
    pub fn kill(&self, request: &SessionRequest) -> Response {
        if let Some(id) = request.session.filter(|id| !id.is_empty()) {
            if let Some(session) = self.registry.destroy(&id) {
                counter!(SESSIONS_DESTROYED_TOTAL).increment(1);
                let age_secs = (chrono::Utc::now() - session.created_at()).num_seconds();
                info!(session_id = %id, age_secs, "session killed");
            } else {
                debug!(session_id = %id, "kill for unknown session");
            }
        }
        Response::empty_session(request.request)
    }

    /// Mint a new session, bind the requested graph, and publish it.
    ///
    /// The session only becomes visible in the registry once binding has
    /// succeeded, so a failed bind leaves nothing behind. Identifier
    /// collisions are resolved first-writer-wins: the loser re-mints.
    pub fn create(
        &self,
        request: &SessionRequest,
        meta: &LifecycleMeta,
    ) -> Result<Response, LifecycleError> {
        let languages = self.engines.languages();
        let attempts = self.config.max_mint_attempts.max(1);

        for _ in 0..attempts {
            let response = Response::new_session(request.request, (self.mint)(), languages.clone());
            let id = response.session_id();

            let mut session = Session::new(id, Arc::clone(&self.application), request.channel);
            if let Some(graph_name) = meta.graph_name.as_deref() {
                let object_name = meta
                    .graph_obj_name
                    .as_deref()
                    .unwrap_or(&self.config.default_graph_obj_name);
                session.bind_graph(graph_name, Some(object_name))?;
            }

            match self.registry.try_insert(session) {
                Ok(session) => {
                    counter!(SESSIONS_CREATED_TOTAL).increment(1);
                    info!(
                        session_id = %id,
                        channel = ?session.channel(),
                        graph = session.bound_graph().map_or("", |bound| bound.graph_name.as_str()),
                        "session created"
                    );
                    return Ok(response);
                }
                Err(SessionError::AlreadyExists(dup)) => {
                    counter!(SESSION_MINT_COLLISIONS_TOTAL).increment(1);
                    warn!(session_id = %dup, "minted session id already registered, retrying");
                }
            }
        }

        Err(LifecycleError::IdentifierExhausted { attempts })
    }
}
