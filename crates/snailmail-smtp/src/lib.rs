//! # snailmail-smtp
//!
//! Just enough SMTP submission (RFC 5321) to push a batch of messages through
//! one authenticated session.
//!
//! The client is a type-state machine. Each step of the handshake consumes
//! the client and returns it in the next state, so a message cannot be sent
//! before `STARTTLS` and `AUTH` have succeeded:
//!
//! ```text
//! Connected --ehlo()--> Connected --starttls()--> Secured --login()--> Authenticated
//!                                                                        |  send_mail() repeats
//! quit() is available in every state
//! ```
//!
//! Once authenticated, [`Client::send_mail`] runs one `MAIL FROM`,
//! `RCPT TO`, `DATA` transaction per call. A refused transaction is reset
//! with `RSET` and the session stays usable; [`Error::is_connection_error`]
//! says when it does not.
//!
//! The byte stream is abstracted behind [`Transport`], so tests can drive the
//! client over an in-memory stream.
//!
//! ```ignore
//! use snailmail_smtp::{Address, Client};
//! use snailmail_smtp::connection::connect;
//!
//! # async fn demo() -> snailmail_smtp::Result<()> {
//! let client = Client::from_stream(connect("smtp.example.com", 587).await?).await?;
//! let client = client.ehlo("localhost").await?;
//! let client = client.starttls("smtp.example.com").await?;
//! let mut client = client.login("me@example.com", "secret").await?;
//!
//! let from = Address::new("me@example.com")?;
//! for to in ["a@example.com", "b@example.com"] {
//!     client
//!         .send_mail(&from, &Address::new(to)?, b"Subject: Hi\r\n\r\nHello\r\n")
//!         .await?;
//! }
//! client.quit().await
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use connection::{
    Authenticated, Client, Connected, Secured, ServerInfo, SmtpStream, Transport,
};
pub use error::{Error, Result};
pub use types::{Address, AuthMechanism, Extension, Reply, ReplyClass, ReplyCode};
