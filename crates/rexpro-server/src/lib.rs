//! # rexpro-server
//!
//! WebSocket front end for the RexPro session gate.
//!
//! - [`config`]: layered configuration (defaults, JSON file, `REXPRO_*` env)
//! - [`codec`]: JSON text framing
//! - [`connection`]: per-socket loop feeding frames through the gate
//! - [`execution`]: the stage forwarded messages are handed to
//! - [`server`]: Axum router with `/ws`, `/health` and `/metrics`
//! - [`shutdown`]: cancellation and session teardown

#![deny(unsafe_code)]

pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod execution;
pub mod health;
pub mod server;
pub mod shutdown;

pub use config::{load_config, ConfigError, ServerConfig};
pub use error::ServerError;
pub use execution::{ExecutionStage, UnavailableExecution};
pub use server::RexProServer;
pub use shutdown::ShutdownCoordinator;
