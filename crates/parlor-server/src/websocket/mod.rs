//! WebSocket connections, the registry, the intake queue, and the broadcast loop.

pub mod broadcast;
pub mod connection;
pub mod handler;
pub mod intake;
pub mod registry;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;
