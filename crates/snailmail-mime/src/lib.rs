//! # snailmail-mime
//!
//! Generation of outgoing MIME messages: a plain-text body followed by
//! base64 attachments in a `multipart/mixed` envelope.
//!
//! ## Quick Start
//!
//! ```
//! use snailmail_mime::{Attachment, ContentType, MessageBuilder};
//!
//! let report = Attachment::new(
//!     b"%PDF-1.4".to_vec(),
//!     ContentType::new("application", "pdf"),
//!     "report.pdf",
//! );
//!
//! let message = MessageBuilder::new()
//!     .from("sender@example.com")
//!     .to("recipient@example.com")
//!     .subject("Monthly report")
//!     .text_body("Please find the report attached.")
//!     .attach(report)
//!     .build()?;
//!
//! let wire = message.to_bytes()?;
//! assert!(wire.ends_with(b"--\r\n"));
//! # Ok::<(), snailmail_mime::Error>(())
//! ```
//!
//! Lines are CRLF-terminated throughout. Dot-stuffing for SMTP `DATA` is
//! left to the transport.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod attachment;
mod builder;
mod content_type;
mod error;
mod header;
mod message;

pub mod encoding;

pub use attachment::Attachment;
pub use builder::MessageBuilder;
pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::Headers;
pub use message::{Message, Part, TransferEncoding};
