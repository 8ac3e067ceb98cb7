//! Error types for the core library.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while preparing or sending a mailing.
#[derive(Debug, Error)]
pub enum Error {
    /// A body, recipient, or attachment file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    FileAccess {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The server could not be reached or refused the connection.
    #[error("connection failed: {0}")]
    Connect(String),

    /// STARTTLS was unavailable or the TLS handshake failed.
    #[error("TLS upgrade failed: {0}")]
    Tls(String),

    /// The server rejected the credentials or offers no usable mechanism.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A single message was refused; the session carries on.
    #[error("sending to {recipient} failed: {reason}")]
    RecipientError {
        /// Recipient that was refused.
        recipient: String,
        /// Server response or local reason.
        reason: String,
    },

    /// The connection became unusable while sending.
    #[error("session failed: {0}")]
    Session(String),

    /// The operator interrupted the run.
    #[error("interrupted")]
    Interrupted,

    /// Invalid settings or arguments.
    #[error("configuration error: {0}")]
    Config(String),

    /// A prompt could not be answered.
    #[error("cannot read input: {0}")]
    Input(#[source] std::io::Error),

    /// A message could not be built.
    #[error("cannot build message: {0}")]
    Mime(#[from] snailmail_mime::Error),
}

impl Error {
    /// Wraps an I/O error with the path it concerns.
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
