//! Error types for the pathmap core library
//!
//! This module defines the error handling system for pathmap, using thiserror
//! for error definitions and anyhow for errors raised by caller-supplied
//! transfer functions.

use crate::projection::ProjectionError;
use thiserror::Error;

/// Main error type for pathmap operations
#[derive(Error, Debug)]
pub enum Error {
    /// The path does not live in the `func.` namespace
    #[error("Not a function path: {path} (expected prefix `{prefix}`)")]
    NotFunctionPath { path: String, prefix: String },

    /// The path is in the `func.` namespace but has no `input`/`output` segment
    #[error("Function path is missing a direction: {path} (expected {expected})")]
    DirectionMissing { path: String, expected: String },

    /// Candidate functions exist but none had all of its inputs present
    #[error(
        "Transfer function not found: candidates [{}], targets [{}], input: {input}",
        .candidates.join(","),
        .targets.join(",")
    )]
    FunctionNotFound {
        candidates: Vec<String>,
        targets: Vec<String>,
        input: String,
    },

    /// A required function input is absent from the supplied data
    #[error("Missing argument for {function}: {path} not found in input")]
    MissingArgument { function: String, path: String },

    /// The caller-supplied transfer function failed
    #[error("Transfer function {function} failed: {source}")]
    Callback {
        function: String,
        #[source]
        source: anyhow::Error,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Projection expression parse or evaluation errors
    #[error("Projection error: {source}")]
    Projection {
        #[source]
        source: ProjectionError,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error only means "this rule is not a function parameter".
    ///
    /// Scans over mixed rule sets skip such rules instead of failing.
    pub fn is_skippable(&self) -> bool {
        matches!(self, Error::NotFunctionPath { .. } | Error::DirectionMissing { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<ProjectionError> for Error {
    fn from(err: ProjectionError) -> Self {
        Error::Projection { source: err }
    }
}
