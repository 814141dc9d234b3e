//! Error handling module
//!
//! This module defines the error types and result type aliases used in the crate.
//! Every failure falls into one of a small number of kinds (see [`ErrorKind`]);
//! nothing is retried or recovered internally.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Broad category of an [`EndpointError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced context, cluster, user or stored endpoint does not exist
    NotFound,
    /// Malformed kubeconfig or persisted record
    Parse,
    /// File or store access failure
    Io,
    /// Invalid application settings
    Config,
}

/// Kube endpoint error type
#[derive(Error, Debug)]
pub enum EndpointError {
    /// Something that was looked up does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Parse error
    #[error("parse error: {0}")]
    Parse(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Failed to read a specific file
    #[error("failed to read {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EndpointError {
    /// Create a not found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Wrap an IO error with the path that caused it
    pub fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Parse(_) => ErrorKind::Parse,
            Self::Io(_) | Self::FileRead { .. } => ErrorKind::Io,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Shorthand for `kind() == ErrorKind::NotFound`
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<serde_json::Error> for EndpointError {
    fn from(err: serde_json::Error) -> Self {
        EndpointError::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for EndpointError {
    fn from(err: serde_yaml::Error) -> Self {
        EndpointError::Parse(err.to_string())
    }
}

impl From<base64::DecodeError> for EndpointError {
    fn from(err: base64::DecodeError) -> Self {
        EndpointError::Parse(format!("invalid base64 data: {}", err))
    }
}

impl From<config::ConfigError> for EndpointError {
    fn from(err: config::ConfigError) -> Self {
        EndpointError::Config(err.to_string())
    }
}

/// Result type alias
///
/// This is a `Result` type alias that uses our custom `EndpointError`.
pub type Result<T> = std::result::Result<T, EndpointError>;
