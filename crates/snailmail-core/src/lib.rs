//! # snailmail-core
//!
//! Bulk mailing: one personalised copy of a message per recipient, sent
//! over a single authenticated SMTP session with a randomized pause
//! between sends.
//!
//! This crate provides:
//! - Attachment loading with content-type inference
//! - Recipient list parsing
//! - Per-recipient message composition
//! - Send pacing
//! - The SMTP session driver
//!
//! ```no_run
//! use snailmail_core::{
//!     MailSession, NoopObserver, Password, RecipientList, SessionConfig, make_mails,
//! };
//!
//! # async fn demo() -> snailmail_core::Result<()> {
//! let recipients = RecipientList::parse("a@example.com\nb@example.com\n");
//! let mails = make_mails("me@example.com", &recipients, "Hi", "Hello.", Vec::new())?;
//!
//! let config = SessionConfig::new("smtp.example.com", 587, "me", Password::new("secret"));
//! let report = MailSession::new(config).run(&mails, &mut NoopObserver).await?;
//! println!("Sent {} of {} messages.", report.delivered.len(), mails.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod attachment;
pub mod compose;
mod error;
pub mod input;
pub mod recipients;
pub mod scheduler;
pub mod session;

pub use attachment::{guess_content_type, load_attachment, load_attachments};
pub use compose::{MailMessage, make_mail, make_mails};
pub use error::{Error, Result};
pub use input::{InputProvider, ScriptedInput};
pub use recipients::RecipientList;
pub use scheduler::SendScheduler;
pub use session::{
    Connector, MailSession, NoopObserver, Password, SendObserver, SendReport, SessionConfig,
    TcpConnector,
};
pub use snailmail_mime::Attachment;
