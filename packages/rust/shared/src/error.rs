//! Error types for PhoneSpec.
//!
//! Library crates use [`PhoneSpecError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Only the fetch boundary and request validation produce errors. Extraction,
//! normalization, filtering and aggregation are total and degrade to defaults.

use std::path::PathBuf;

/// Top-level error type for all PhoneSpec operations.
#[derive(Debug, thiserror::Error)]
pub enum PhoneSpecError {
    /// The target resource does not exist at the source (upstream 404).
    #[error("not found: {url}")]
    NotFound { url: String },

    /// Network, timeout or navigation failure while fetching a document.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// A required request parameter was missing or blank.
    #[error("missing required input: {field}")]
    EmptyInput { field: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (unknown source id, malformed argument, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PhoneSpecError>;

impl PhoneSpecError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create an empty-input error naming the missing parameter.
    pub fn empty_input(field: impl Into<String>) -> Self {
        Self::EmptyInput {
            field: field.into(),
        }
    }

    /// Create a not-found error for the given URL.
    pub fn not_found(url: impl Into<String>) -> Self {
        Self::NotFound { url: url.into() }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Caller-facing message for this error kind.
    ///
    /// Not-found and fetch failures get dedicated wording; everything else
    /// maps to a generic failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { .. } => {
                "Phone not found. Check the name and try again.".to_string()
            }
            Self::Fetch(_) => {
                "Could not reach the source right now. Please try again in a moment.".to_string()
            }
            Self::EmptyInput { field } => format!("Parameter '{field}' is required."),
            _ => format!("Request failed: {self}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = PhoneSpecError::config("bad timeout");
        assert_eq!(err.to_string(), "config error: bad timeout");

        let err = PhoneSpecError::empty_input("searchTerm");
        assert_eq!(err.to_string(), "missing required input: searchTerm");
    }

    #[test]
    fn user_messages_by_kind() {
        let not_found = PhoneSpecError::not_found("https://example.com/x");
        assert!(not_found.user_message().contains("not found"));

        let fetch = PhoneSpecError::Fetch("timed out".into());
        assert!(fetch.user_message().contains("try again"));

        let other = PhoneSpecError::validation("unknown source 'foo'");
        assert!(other.user_message().starts_with("Request failed"));
    }
}
