//! MIME message structure and rendering.

use crate::attachment::Attachment;
use crate::content_type::ContentType;
use crate::encoding::{decode_base64, encode_base64_wrapped};
use crate::error::{Error, Result};
use crate::header::Headers;
use std::fmt;

/// Longest line SMTP guarantees to carry, excluding CRLF (RFC 5321).
const MAX_SMTP_LINE: usize = 998;

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// 7-bit ASCII with short lines.
    SevenBit,
    /// Base64 encoding.
    Base64,
}

impl TransferEncoding {
    /// Parses transfer encoding from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("base64") {
            Self::Base64
        } else {
            Self::SevenBit
        }
    }

    /// Picks the encoding a text body can travel in unchanged.
    #[must_use]
    pub fn for_text(text: &str) -> Self {
        let fits = text.split('\n').all(|line| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            line.len() <= MAX_SMTP_LINE
                && line.bytes().all(|b| b == b'\t' || (b' '..=b'~').contains(&b))
        });
        if fits { Self::SevenBit } else { Self::Base64 }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::Base64 => write!(f, "base64"),
        }
    }
}

/// MIME message part.
///
/// `body` holds the part exactly as it goes on the wire, already
/// transfer-encoded with CRLF line endings.
#[derive(Debug, Clone)]
pub struct Part {
    /// Part headers.
    pub headers: Headers,
    /// Encoded part body.
    pub body: Vec<u8>,
}

impl Part {
    /// Creates a new part.
    #[must_use]
    pub const fn new(headers: Headers, body: Vec<u8>) -> Self {
        Self { headers, body }
    }

    /// Creates a `text/plain; charset=utf-8` part.
    ///
    /// # Errors
    ///
    /// Returns an error if a header cannot be set.
    pub fn text(text: &str) -> Result<Self> {
        let encoding = TransferEncoding::for_text(text);
        let mut headers = Headers::new();
        headers.add("Content-Type", ContentType::text_plain("utf-8").to_string())?;
        headers.add("Content-Transfer-Encoding", encoding.to_string())?;

        let body = match encoding {
            TransferEncoding::SevenBit => normalize_line_endings(text),
            TransferEncoding::Base64 => encode_base64_wrapped(text.as_bytes()),
        };

        Ok(Self::new(headers, body.into_bytes()))
    }

    /// Creates a base64 attachment part.
    ///
    /// # Errors
    ///
    /// Returns an error if the filename contains a line break.
    pub fn attachment(attachment: &Attachment) -> Result<Self> {
        let mut headers = Headers::new();
        headers.add("Content-Type", attachment.content_type().to_string())?;
        headers.add("MIME-Version", "1.0")?;
        headers.add(
            "Content-Disposition",
            format!("attachment; filename={}", attachment.filename()),
        )?;
        headers.add("Content-Transfer-Encoding", "base64")?;

        let body = encode_base64_wrapped(attachment.content());
        Ok(Self::new(headers, body.into_bytes()))
    }

    /// Gets the content type, defaulting to `text/plain`.
    ///
    /// # Errors
    ///
    /// Returns an error if content type header is invalid.
    pub fn content_type(&self) -> Result<ContentType> {
        self.headers.get("content-type").map_or_else(
            || Ok(ContentType::text_plain("us-ascii")),
            ContentType::parse,
        )
    }

    /// Gets the transfer encoding.
    #[must_use]
    pub fn transfer_encoding(&self) -> TransferEncoding {
        self.headers
            .get("content-transfer-encoding")
            .map_or(TransferEncoding::SevenBit, TransferEncoding::parse)
    }

    /// Decodes the body according to the transfer encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails.
    pub fn decode_body(&self) -> Result<Vec<u8>> {
        match self.transfer_encoding() {
            TransferEncoding::Base64 => decode_base64(&String::from_utf8_lossy(&self.body)),
            TransferEncoding::SevenBit => Ok(self.body.clone()),
        }
    }

    /// Gets the decoded body as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding or UTF-8 conversion fails.
    pub fn body_text(&self) -> Result<String> {
        let decoded = self.decode_body()?;
        String::from_utf8(decoded).map_err(Into::into)
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.headers.to_string().as_bytes());
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        // The CRLF before a delimiter belongs to the delimiter, not the body.
        out.extend_from_slice(b"\r\n");
    }
}

/// A `multipart/mixed` MIME message.
#[derive(Debug, Clone)]
pub struct Message {
    /// Top-level headers.
    pub headers: Headers,
    /// Body parts, in order.
    pub parts: Vec<Part>,
}

impl Message {
    /// Creates a multipart message.
    #[must_use]
    pub const fn multipart(headers: Headers, parts: Vec<Part>) -> Self {
        Self { headers, parts }
    }

    /// Gets the content type.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is missing or invalid.
    pub fn content_type(&self) -> Result<ContentType> {
        let value = self
            .headers
            .get("content-type")
            .ok_or_else(|| Error::MissingHeader("Content-Type"))?;
        ContentType::parse(value)
    }

    /// Gets the multipart boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if the content type has no boundary.
    pub fn boundary(&self) -> Result<String> {
        let content_type = self.content_type()?;
        content_type
            .boundary()
            .map(ToString::to_string)
            .ok_or_else(|| Error::MediaType("multipart without boundary".to_string()))
    }

    /// Gets the From header.
    #[must_use]
    pub fn from(&self) -> Option<&str> {
        self.headers.get("from")
    }

    /// Gets the To header.
    #[must_use]
    pub fn to(&self) -> Option<&str> {
        self.headers.get("to")
    }

    /// Gets the Subject header.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.headers.get("subject")
    }

    /// Gets the Date header.
    #[must_use]
    pub fn date(&self) -> Option<&str> {
        self.headers.get("date")
    }

    /// Returns the parts carrying `Content-Disposition: attachment`.
    pub fn attachments(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(|part| {
            part.headers
                .get("content-disposition")
                .is_some_and(|d| d.trim_start().to_ascii_lowercase().starts_with("attachment"))
        })
    }

    /// Renders the message to wire bytes with CRLF line endings.
    ///
    /// # Errors
    ///
    /// Returns an error if the message has no multipart boundary.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let boundary = self.boundary()?;
        let body_len: usize = self.parts.iter().map(|p| p.body.len() + 256).sum();
        let mut out = Vec::with_capacity(body_len + 512);

        out.extend_from_slice(self.headers.to_string().as_bytes());
        out.extend_from_slice(b"\r\n");
        for part in &self.parts {
            out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            part.write_to(&mut out);
        }
        out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        Ok(out)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bytes().map_err(|_| fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&bytes))
    }
}

/// Converts bare LF line endings to CRLF.
fn normalize_line_endings(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 32);
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push_str("\r\n");
        }
        out.push_str(line.strip_suffix('\r').unwrap_or(line));
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_transfer_encoding_parse() {
        assert_eq!(TransferEncoding::parse("7bit"), TransferEncoding::SevenBit);
        assert_eq!(TransferEncoding::parse(" BASE64 "), TransferEncoding::Base64);
    }

    #[test]
    fn test_transfer_encoding_for_text() {
        assert_eq!(TransferEncoding::for_text("Hello.\n"), TransferEncoding::SevenBit);
        assert_eq!(TransferEncoding::for_text("Grüße"), TransferEncoding::Base64);
        assert_eq!(
            TransferEncoding::for_text(&"x".repeat(999)),
            TransferEncoding::Base64
        );
        assert_eq!(TransferEncoding::for_text("a\rb"), TransferEncoding::Base64);
        assert_eq!(TransferEncoding::for_text("tab\there\r\n"), TransferEncoding::SevenBit);
    }

    #[test]
    fn test_text_part_seven_bit() {
        let part = Part::text("line one\nline two\n").unwrap();
        assert_eq!(part.transfer_encoding(), TransferEncoding::SevenBit);
        assert_eq!(part.body, b"line one\r\nline two\r\n");
        assert_eq!(part.content_type().unwrap().charset(), Some("utf-8"));
    }

    #[test]
    fn test_text_part_base64_round_trip() {
        let part = Part::text("Grüße aus Köln").unwrap();
        assert_eq!(part.transfer_encoding(), TransferEncoding::Base64);
        assert_eq!(part.body_text().unwrap(), "Grüße aus Köln");
    }

    #[test]
    fn test_attachment_part_headers() {
        let attachment = Attachment::new(
            Bytes::from_static(&[0, 1, 2, 255]),
            ContentType::octet_stream(),
            "blob.bin",
        );
        let part = Part::attachment(&attachment).unwrap();

        assert_eq!(
            part.headers.get("content-disposition"),
            Some("attachment; filename=blob.bin")
        );
        assert_eq!(part.headers.get("mime-version"), Some("1.0"));
        assert_eq!(part.decode_body().unwrap(), vec![0, 1, 2, 255]);
    }

    #[test]
    fn test_message_to_bytes_layout() {
        let mut headers = Headers::new();
        headers.add("From", "me@x.com").unwrap();
        headers
            .add("Content-Type", ContentType::multipart_mixed("BOUND").to_string())
            .unwrap();
        let message = Message::multipart(headers, vec![Part::text("Hello.").unwrap()]);

        let rendered = String::from_utf8(message.to_bytes().unwrap()).unwrap();
        assert_eq!(
            rendered,
            "From: me@x.com\r\n\
             Content-Type: multipart/mixed; boundary=BOUND\r\n\
             \r\n\
             --BOUND\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\
             Content-Transfer-Encoding: 7bit\r\n\
             \r\n\
             Hello.\r\n\
             --BOUND--\r\n"
        );
        assert_eq!(message.to_string(), rendered);
    }

    #[test]
    fn test_message_without_boundary_fails() {
        let message = Message::multipart(Headers::new(), Vec::new());
        assert!(message.to_bytes().is_err());
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\nb\r\nc"), "a\r\nb\r\nc");
    }
}
