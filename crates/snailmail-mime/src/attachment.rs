//! File attachments.

use crate::content_type::ContentType;
use bytes::Bytes;

/// An attachment ready to be placed in a message.
///
/// Cloning is cheap: the content is a shared, reference-counted buffer, so
/// one loaded file can go out with any number of messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    content: Bytes,
    content_type: ContentType,
    filename: String,
}

impl Attachment {
    /// Creates an attachment from raw content.
    #[must_use]
    pub fn new(
        content: impl Into<Bytes>,
        content_type: ContentType,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            content_type,
            filename: filename.into(),
        }
    }

    /// Raw (unencoded) content.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Shared handle to the content buffer.
    #[must_use]
    pub fn bytes(&self) -> Bytes {
        self.content.clone()
    }

    /// Full content type.
    #[must_use]
    pub const fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// Main MIME type, e.g. `application`.
    #[must_use]
    pub fn main_type(&self) -> &str {
        &self.content_type.main_type
    }

    /// MIME subtype, e.g. `pdf`.
    #[must_use]
    pub fn sub_type(&self) -> &str {
        &self.content_type.sub_type
    }

    /// Filename shown to the recipient.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Content length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Returns true for an empty file.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_content() {
        let attachment = Attachment::new(
            vec![1_u8, 2, 3],
            ContentType::new("application", "pdf"),
            "report.pdf",
        );
        let copy = attachment.clone();

        assert_eq!(copy.content().as_ptr(), attachment.content().as_ptr());
        assert_eq!(copy.main_type(), "application");
        assert_eq!(copy.sub_type(), "pdf");
        assert_eq!(copy.filename(), "report.pdf");
        assert_eq!(copy.len(), 3);
    }
}
