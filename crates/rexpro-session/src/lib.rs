//! # rexpro-session
//!
//! Server-side session state and the process-wide registry that owns it,
//! plus the collaborator seams a session depends on: the application's
//! graph catalogue and the script engines it advertises.

#![deny(unsafe_code)]

pub mod engine;
pub mod error;
pub mod graph;
pub mod registry;
pub mod session;

pub use engine::{EngineLanguages, StaticEngines};
pub use error::{GraphBindingError, SessionError};
pub use graph::{Graph, GraphProvider, NamedGraph, StaticGraphs};
pub use registry::SessionRegistry;
pub use session::{BoundGraph, Session, DEFAULT_GRAPH_OBJECT_NAME};
