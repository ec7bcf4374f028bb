use std::sync::Arc;

use metrics::counter;
use rexpro_core::{ErrorCode, InboundFrame, Message, Response, ScopedRequest, SessionId, SessionRequest};
use rexpro_session::{EngineLanguages, GraphProvider, SessionRegistry};
use rexpro_telemetry::metrics::{GATE_ERRORS_TOTAL, GATE_MESSAGES_TOTAL};
use tracing::{debug, instrument, warn};

use crate::classifier::classify;
use crate::config::{FilterConfig, MetadataPolicy};
use crate::lifecycle::{IdMinter, LifecycleHandler};
use crate::sink::ResponseSink;
use crate::validator::{validate_session, ValidationError};

/// What the chain should do after the gate has seen a message.
#[derive(Clone, Debug, PartialEq)]
pub enum NextAction {
    /// Pass the message, unchanged, to the next stage.
    Invoke(Message),
    /// Stop here; any responses have already been written.
    Stop,
}

/// Per-message session gate.
///
/// Safe to share across connections: all state lives in the injected
/// registry and collaborators.
pub struct FilterGate {
    registry: Arc<SessionRegistry>,
    lifecycle: LifecycleHandler,
    config: FilterConfig,
}

impl FilterGate {
    /// Create a gate over `registry`. New sessions draw graphs from
    /// `application` and advertise the languages `engines` reports.
    pub fn new(
        registry: Arc<SessionRegistry>,
        application: Arc<dyn GraphProvider>,
        engines: Arc<dyn EngineLanguages>,
        config: FilterConfig,
    ) -> Self {
        let lifecycle =
            LifecycleHandler::new(Arc::clone(&registry), application, engines, config.clone());
        Self {
            registry,
            lifecycle,
            config,
        }
    }

    /// Replace the source of new session identifiers.
    #[must_use]
    pub fn with_id_minter(mut self, mint: IdMinter) -> Self {
        self.lifecycle = self.lifecycle.with_id_minter(mint);
        self
    }

    /// Get the session registry this gate validates against.
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Get the gate configuration.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Names of the graphs a session request may bind.
    pub fn graph_names(&self) -> Vec<String> {
        self.lifecycle.graph_names()
    }

    /// Classify `frame` and run it through the gate.
    #[instrument(skip_all, fields(kind = %frame.kind, request_id = %frame.request))]
    pub fn handle<S>(&self, frame: InboundFrame, sink: &mut S) -> NextAction
    where
        S: ResponseSink + ?Sized,
    {
        self.handle_message(classify(frame), sink)
    }

    /// Run an already classified message through the gate.
    pub fn handle_message<S>(&self, message: Message, sink: &mut S) -> NextAction
    where
        S: ResponseSink + ?Sized,
    {
        let forward = match &message {
            Message::Script(_) => true,
            Message::Session(request) => {
                self.handle_lifecycle(request, sink);
                false
            }
            Message::Scoped(request) => self.check_scoped(request, sink),
        };

        let outcome = if forward { "forwarded" } else { "stopped" };
        counter!(GATE_MESSAGES_TOTAL, "kind" => kind_label(&message), "outcome" => outcome)
            .increment(1);

        if forward {
            NextAction::Invoke(message)
        } else {
            NextAction::Stop
        }
    }

    fn handle_lifecycle<S>(&self, request: &SessionRequest, sink: &mut S)
    where
        S: ResponseSink + ?Sized,
    {
        let meta = match request.validate_meta() {
            Ok(meta) => meta,
            Err(e) => {
                warn!(error = %e, "invalid session request metadata");
                write(
                    sink,
                    Response::error(
                        request.request,
                        SessionId::EMPTY,
                        ErrorCode::InvalidMessageError,
                        e.to_string(),
                    ),
                );
                match self.config.metadata_policy {
                    MetadataPolicy::Strict => return,
                    MetadataPolicy::Lenient => request.lenient_meta(),
                }
            }
        };

        if meta.kill_session {
            write(sink, self.lifecycle.kill(request));
            return;
        }

        match self.lifecycle.create(request, &meta) {
            Ok(response) => write(sink, response),
            Err(e) => {
                warn!(error = %e, "session creation failed");
                write(sink, e.to_response(request.request));
            }
        }
    }

    fn check_scoped<S>(&self, request: &ScopedRequest, sink: &mut S) -> bool
    where
        S: ResponseSink + ?Sized,
    {
        match validate_session(&self.registry, request) {
            Ok(session_id) => {
                debug!(session_id = %session_id, "session validated");
                true
            }
            Err(e) => {
                if let ValidationError::Invalid(id) = &e {
                    debug!(session_id = %id, "request names unknown session");
                }
                write(
                    sink,
                    Response::error(
                        request.request,
                        SessionId::EMPTY,
                        ErrorCode::InvalidSessionError,
                        e.to_string(),
                    ),
                );
                false
            }
        }
    }
}

fn write<S>(sink: &mut S, response: Response)
where
    S: ResponseSink + ?Sized,
{
    if let Some(code) = response.error_code() {
        counter!(GATE_ERRORS_TOTAL, "code" => code.as_str()).increment(1);
    }
    sink.write(response);
}

fn kind_label(message: &Message) -> &'static str {
    match message {
        Message::Script(_) => "script",
        Message::Session(_) => "session",
        Message::Scoped(_) => "scoped",
    }
}
