//! Error types for native file dialogs.

use std::fmt;
use std::io;

use crate::backend::BackendKind;

/// Result type alias for dialog operations.
pub type Result<T> = std::result::Result<T, DialogError>;

/// Why no native dialog facility could be selected.
///
/// This is kept separate from [`DialogError`] so the lazily selected global
/// backend can hand the same failure out on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendUnavailable {
    /// The operating system (or family) that was detected.
    pub os: String,
    /// The helper program or platform dependency that is missing.
    pub missing: String,
}

impl BackendUnavailable {
    /// Create a new selection failure.
    pub fn new(os: impl Into<String>, missing: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            missing: missing.into(),
        }
    }
}

impl fmt::Display for BackendUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no native file dialog on {} (missing {})", self.os, self.missing)
    }
}

impl std::error::Error for BackendUnavailable {}

/// Errors that can occur while showing a native file dialog.
///
/// A cancelled dialog is never an error; operations return `None` or an
/// empty list instead.
#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    /// The filter description does not match any supported shape.
    #[error("Invalid filter shape: {reason}")]
    InvalidFilterShape { reason: String },

    /// No usable native dialog facility was found.
    #[error("No file dialog backend available: {0}")]
    NoBackendAvailable(#[from] BackendUnavailable),

    /// The native facility could not be started or terminated abnormally.
    #[error("{backend} invocation failed: {message}")]
    BackendInvocationFailed {
        backend: BackendKind,
        message: String,
        #[source]
        source: Option<io::Error>,
    },

    /// Invalid dialog configuration.
    #[error("Invalid dialog configuration: {message}")]
    Config { message: String },
}

impl DialogError {
    /// Create an invalid filter error.
    pub fn invalid_filter(reason: impl Into<String>) -> Self {
        Self::InvalidFilterShape {
            reason: reason.into(),
        }
    }

    /// Create an invocation error without an underlying I/O error.
    pub fn invocation(backend: BackendKind, message: impl Into<String>) -> Self {
        Self::BackendInvocationFailed {
            backend,
            message: message.into(),
            source: None,
        }
    }

    /// Create an invocation error for a helper that could not be spawned.
    pub fn spawn(backend: BackendKind, source: io::Error) -> Self {
        Self::BackendInvocationFailed {
            backend,
            message: format!("failed to start helper: {source}"),
            source: Some(source),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns true if this error was caused by a malformed filter.
    pub fn is_invalid_filter(&self) -> bool {
        matches!(self, Self::InvalidFilterShape { .. })
    }

    /// Returns true if no backend could be selected.
    pub fn is_no_backend(&self) -> bool {
        matches!(self, Self::NoBackendAvailable(_))
    }

    /// Returns true if the native facility failed.
    pub fn is_invocation_failure(&self) -> bool {
        matches!(self, Self::BackendInvocationFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_display() {
        let err = DialogError::from(BackendUnavailable::new("linux", "kdialog or zenity"));
        assert!(err.is_no_backend());
        assert_eq!(
            err.to_string(),
            "No file dialog backend available: no native file dialog on linux (missing kdialog or zenity)"
        );
    }

    #[test]
    fn test_spawn_error_keeps_source() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "no such file");
        let err = DialogError::spawn(BackendKind::Zenity, io_err);
        assert!(err.is_invocation_failure());
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("zenity invocation failed"));
    }

    #[test]
    fn test_invalid_filter_predicate() {
        let err = DialogError::invalid_filter("empty pattern list");
        assert!(err.is_invalid_filter());
        assert!(!err.is_invocation_failure());
    }
}
