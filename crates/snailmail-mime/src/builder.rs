//! Fluent construction of outgoing messages.

use crate::attachment::Attachment;
use crate::content_type::ContentType;
use crate::encoding::encode_rfc2047;
use crate::error::{Error, Result};
use crate::header::Headers;
use crate::message::{Message, Part};
use chrono::{DateTime, FixedOffset, Local};
use rand::Rng;
use rand::distributions::Alphanumeric;

const BOUNDARY_PREFIX: &str = "=_snailmail_";
const BOUNDARY_RANDOM_LEN: usize = 24;

/// Builds a `multipart/mixed` message: one text part followed by the
/// attachments in the order they were added.
///
/// # Example
///
/// ```
/// use snailmail_mime::MessageBuilder;
///
/// let message = MessageBuilder::new()
///     .from("me@example.com")
///     .to("you@example.com")
///     .subject("Hi")
///     .text_body("Hello.")
///     .build()?;
///
/// assert_eq!(message.to(), Some("you@example.com"));
/// # Ok::<(), snailmail_mime::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    from: Option<String>,
    to: Option<String>,
    subject: String,
    text: String,
    attachments: Vec<Attachment>,
    date: Option<DateTime<FixedOffset>>,
    boundary: Option<String>,
}

impl MessageBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sender address.
    #[must_use]
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Sets the recipient address.
    #[must_use]
    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    /// Sets the subject. Non-ASCII text is RFC 2047 encoded on build.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the plain-text body.
    #[must_use]
    pub fn text_body(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Appends an attachment.
    #[must_use]
    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Appends several attachments, keeping their order.
    #[must_use]
    pub fn attach_all(mut self, attachments: impl IntoIterator<Item = Attachment>) -> Self {
        self.attachments.extend(attachments);
        self
    }

    /// Overrides the `Date` header (defaults to now).
    #[must_use]
    pub const fn date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.date = Some(date);
        self
    }

    /// Uses a fixed multipart boundary instead of a random one.
    #[must_use]
    pub fn boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = Some(boundary.into());
        self
    }

    /// Builds the message.
    ///
    /// # Errors
    ///
    /// Returns an error if the sender or recipient is missing, a header
    /// value contains a line break, or a fixed boundary occurs inside a part.
    pub fn build(self) -> Result<Message> {
        let from = self
            .from
            .ok_or_else(|| Error::MissingHeader("From"))?;
        let to = self
            .to
            .ok_or_else(|| Error::MissingHeader("To"))?;

        let mut parts = Vec::with_capacity(self.attachments.len() + 1);
        parts.push(Part::text(&self.text)?);
        for attachment in &self.attachments {
            parts.push(Part::attachment(attachment)?);
        }

        let boundary = match self.boundary {
            Some(boundary) if collides(&boundary, &parts) => {
                return Err(Error::Boundary(format!(
                    "{boundary:?} occurs in message body"
                )));
            }
            Some(boundary) => boundary,
            None => loop {
                let candidate = random_boundary();
                if !collides(&candidate, &parts) {
                    break candidate;
                }
            },
        };

        let date = self
            .date
            .unwrap_or_else(|| Local::now().fixed_offset());

        let mut headers = Headers::new();
        headers.add("From", from)?;
        headers.add("To", to)?;
        headers.add("Subject", encode_rfc2047(&self.subject, "utf-8"))?;
        headers.add("Date", date.to_rfc2822())?;
        headers.add("MIME-Version", "1.0")?;
        headers.add(
            "Content-Type",
            ContentType::multipart_mixed(boundary).to_string(),
        )?;

        Ok(Message::multipart(headers, parts))
    }
}

fn random_boundary() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(BOUNDARY_RANDOM_LEN)
        .map(char::from)
        .collect();
    format!("{BOUNDARY_PREFIX}{suffix}")
}

fn collides(boundary: &str, parts: &[Part]) -> bool {
    let needle = boundary.as_bytes();
    if needle.is_empty() {
        return true;
    }
    parts
        .iter()
        .any(|part| part.body.windows(needle.len()).any(|w| w == needle))
}
