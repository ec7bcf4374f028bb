//! # rexpro-filter
//!
//! The session gate that sits in front of script execution. For every
//! inbound frame it either forwards the message to the next stage or stops
//! the chain after writing a response:
//!
//! - sessionless script requests are forwarded untouched
//! - session requests create or destroy a session and are answered here
//! - everything else must name a live session or is rejected
//!
//! The gate holds no mutable state of its own; the only shared state is the
//! injected [`rexpro_session::SessionRegistry`].

#![deny(unsafe_code)]

pub mod classifier;
pub mod config;
pub mod gate;
pub mod lifecycle;
pub mod sink;
pub mod validator;

pub use classifier::classify;
pub use config::{FilterConfig, MetadataPolicy};
pub use gate::{FilterGate, NextAction};
pub use lifecycle::{IdMinter, LifecycleError, LifecycleHandler};
pub use sink::ResponseSink;
pub use validator::{validate_session, ValidationError};
