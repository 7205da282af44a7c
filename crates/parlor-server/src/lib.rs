//! # parlor-server
//!
//! The broadcast relay itself:
//!
//! - [`ConnectionRegistry`]: the set of connections that receive broadcasts
//! - [`Broadcaster`]: the single task draining the intake queue and writing
//!   each message to every registered connection, in enqueue order
//! - Per-connection read loops ([`websocket::session`]) that register,
//!   announce, forward, and finally deregister their connection
//! - [`RelayServer`]: axum router with the WebSocket endpoint, `/health`, and
//!   static asset fallback, all on one listener

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod health;
pub mod server;
pub mod websocket;

pub use config::ServerConfig;
pub use error::ServerError;
pub use server::{RelayServer, ServerHandle};
pub use websocket::broadcast::{Broadcaster, RoundReport};
pub use websocket::connection::{Connection, MessageSink};
pub use websocket::intake::{IntakeReceiver, IntakeSender, intake};
pub use websocket::registry::ConnectionRegistry;
