//! # parlor-core
//!
//! Shared vocabulary for the Parlor broadcast relay:
//!
//! - **Messages**: [`ChatMessage`] and [`MessageKind`], the JSON frame
//!   exchanged with every client
//! - **IDs**: [`ConnectionId`], the identity of one live connection
//! - **Errors**: [`RelayError`] for encode/decode and transport failures

#![deny(unsafe_code)]

pub mod errors;
pub mod ids;
pub mod message;

pub use errors::{RelayError, Result};
pub use ids::ConnectionId;
pub use message::{ChatMessage, MessageKind, SYSTEM_USERNAME};
