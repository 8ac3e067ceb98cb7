//! Errors raised while building or reading messages.

use std::string::FromUtf8Error;

/// Shorthand for results in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a message could not be built or read back.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A header name or value would break the header block.
    #[error("invalid header: {0}")]
    Header(String),

    /// A media type string could not be parsed.
    #[error("invalid media type: {0}")]
    MediaType(String),

    /// The multipart delimiter is empty or occurs inside a part.
    #[error("unusable boundary: {0}")]
    Boundary(String),

    /// A header the operation needs is absent.
    #[error("missing {0} header")]
    MissingHeader(&'static str),

    /// A base64 body did not decode.
    #[error("bad base64 body: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A text body is not UTF-8.
    #[error("text body is not UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}
