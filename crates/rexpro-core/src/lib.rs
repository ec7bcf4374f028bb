//! # rexpro-core
//!
//! Types shared by every layer of the RexPro session gate: identifiers,
//! inbound frames and their classified [`messages::Message`] form, wire
//! error codes, and the responses the gate writes back.

#![deny(unsafe_code)]

pub mod errors;
pub mod ids;
pub mod messages;
pub mod response;

pub use errors::{ErrorCode, MetadataError};
pub use ids::{RequestId, SessionId};
pub use messages::{Channel, InboundFrame, LifecycleMeta, Message, ScopedRequest, ScriptRequest, SessionRequest};
pub use response::{ErrorResponse, Response, SessionResponse};
