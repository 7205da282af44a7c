//! Server error types.

use thiserror::Error;

/// Errors raised while starting the relay server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: String,
        /// Underlying socket error.
        #[source]
        source: std::io::Error,
    },
    /// Other socket I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_display_names_address() {
        let err = ServerError::Bind {
            addr: "0.0.0.0:8080".into(),
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use"),
        };
        let msg = err.to_string();
        assert!(msg.contains("0.0.0.0:8080"));
        assert!(msg.contains("address in use"));
    }

    #[test]
    fn io_from_conversion() {
        let err: ServerError = std::io::Error::other("boom").into();
        assert!(matches!(err, ServerError::Io(_)));
    }
}
