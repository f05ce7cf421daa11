//! Unified error type for the apacal-lib crate.
//!
//! [`ApacalError`] wraps module-specific errors (`StreamError`, I/O) and
//! domain-specific error kinds (`Config`, `Layout`). `From` impls allow `?`
//! to propagate across module boundaries.

use std::fmt;

use crate::stream::StreamError;

/// Unified error type for apacal-lib operations.
#[derive(Debug)]
pub enum ApacalError {
    /// Polling the web interface failed.
    Stream(StreamError),
    /// Standard I/O error (LED device, config persistence).
    Io(std::io::Error),
    /// Configuration validation error.
    Config(String),
    /// Pixel window does not fit the strip.
    Layout(String),
}

impl fmt::Display for ApacalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApacalError::Stream(e) => write!(f, "{e}"),
            ApacalError::Io(e) => write!(f, "I/O error: {e}"),
            ApacalError::Config(e) => write!(f, "Config error: {e}"),
            ApacalError::Layout(e) => write!(f, "Layout error: {e}"),
        }
    }
}

impl std::error::Error for ApacalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApacalError::Stream(e) => Some(e),
            ApacalError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StreamError> for ApacalError {
    fn from(e: StreamError) -> Self {
        ApacalError::Stream(e)
    }
}

impl From<std::io::Error> for ApacalError {
    fn from(e: std::io::Error) -> Self {
        ApacalError::Io(e)
    }
}

/// Crate-level Result alias using [`ApacalError`].
pub type Result<T> = std::result::Result<T, ApacalError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::Stage;

    #[test]
    fn from_stream_error() {
        let e: ApacalError = StreamError::Closed.into();
        assert!(matches!(e, ApacalError::Stream(StreamError::Closed)));
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let e: ApacalError = io_err.into();
        assert!(matches!(e, ApacalError::Io(_)));
    }

    #[test]
    fn display_stream_error_is_transparent() {
        let e = ApacalError::Stream(StreamError::Cancelled(Stage::Request));
        assert_eq!(e.to_string(), "request: cancelled");
    }

    #[test]
    fn display_config_error() {
        let e = ApacalError::Config("invalid input".into());
        assert_eq!(e.to_string(), "Config error: invalid input");
    }

    #[test]
    fn display_layout_error() {
        let e = ApacalError::Layout("overflow".into());
        assert_eq!(e.to_string(), "Layout error: overflow");
    }

    #[test]
    fn source_chains_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let e = ApacalError::Io(io_err);
        let source = std::error::Error::source(&e).unwrap();
        assert!(source.to_string().contains("denied"));
    }

    #[test]
    fn source_none_for_string_variants() {
        let e = ApacalError::Config("test".into());
        assert!(std::error::Error::source(&e).is_none());
    }

    #[test]
    fn question_mark_propagation_io() {
        fn inner() -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "nope"))
        }
        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }
        let err = outer().unwrap_err();
        assert!(matches!(err, ApacalError::Io(_)));
    }
}
