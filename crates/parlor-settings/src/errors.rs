//! Settings error types.

use thiserror::Error;

/// Why a settings layer could not be applied.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("cannot read settings: {0}")]
    Io(#[from] std::io::Error),
    /// The settings file is not valid JSON, or a field has the wrong type.
    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
    /// A merged value the relay cannot run with.
    #[error("{field}: {reason}")]
    InvalidValue {
        /// Dotted camelCase path of the offending field, e.g. `server.wsPath`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl SettingsError {
    /// Shorthand for [`SettingsError::InvalidValue`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;
