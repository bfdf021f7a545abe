//! Unified, `miette`-based error type for the Assay engine.
//!
//! Assertion failures are never represented here. They are log entries in the
//! [`TestLog`](crate::log::TestLog) and only ever affect the boolean result of a
//! run. `AssayError` covers the structural failures around a run: a test that
//! cannot be instantiated, a malformed runner configuration, and I/O while
//! writing reports.

use miette::Diagnostic;
use thiserror::Error;

/// Convenience alias used across the crate.
pub type AssayResult<T> = Result<T, AssayError>;

/// Type-safe error classification, mirroring the [`AssayError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// A test factory refused to build its test instance
    TestCreation,
    /// Invalid runner configuration (environment or arguments)
    Config,
    /// Report output failed
    Io,
    /// JSON export failed
    Json,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::TestCreation => "TestCreation",
            ErrorType::Config => "Config",
            ErrorType::Io => "Io",
            ErrorType::Json => "Json",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum AssayError {
    #[error("Failed to create test '{test}': {message}")]
    #[diagnostic(
        code(assay::creation),
        help("the test factory returned an error; the test is scored as failed")
    )]
    TestCreation { test: String, message: String },

    #[error("Invalid configuration value {value:?} for {key}: {message}")]
    #[diagnostic(code(assay::config))]
    Config {
        key: String,
        value: String,
        message: String,
    },

    #[error("I/O error: {0}")]
    #[diagnostic(code(assay::io))]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    #[diagnostic(code(assay::json))]
    Json(#[from] serde_json::Error),
}

impl AssayError {
    /// Builds a [`AssayError::TestCreation`] for the named test.
    pub fn creation(test: impl Into<String>, message: impl Into<String>) -> Self {
        AssayError::TestCreation {
            test: test.into(),
            message: message.into(),
        }
    }

    pub fn config(
        key: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        AssayError::Config {
            key: key.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Returns the type-safe error classification for this error.
    pub fn error_type(&self) -> ErrorType {
        match self {
            AssayError::TestCreation { .. } => ErrorType::TestCreation,
            AssayError::Config { .. } => ErrorType::Config,
            AssayError::Io(_) => ErrorType::Io,
            AssayError::Json(_) => ErrorType::Json,
        }
    }
}

#[cfg(test)]
mod diagnostics_tests {
    use miette::Report;

    use super::*;

    #[test]
    fn test_creation_error_renders_help() {
        let err = AssayError::creation("ByteRangeTests", "missing fixture");
        assert_eq!(err.error_type(), ErrorType::TestCreation);
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("ByteRangeTests"));
        assert!(output.contains("missing fixture"));
        assert!(output.contains("scored as failed"));
    }

    #[test]
    fn test_config_error_message() {
        let err = AssayError::config("ASSAY_INCIDENT_BREAKPOINT", "maybe", "expected a boolean");
        assert_eq!(err.error_type(), ErrorType::Config);
        assert_eq!(
            err.to_string(),
            "Invalid configuration value \"maybe\" for ASSAY_INCIDENT_BREAKPOINT: expected a boolean"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: AssayError = io.into();
        assert_eq!(err.error_type(), ErrorType::Io);
        assert!(err.to_string().contains("pipe closed"));
    }
}
