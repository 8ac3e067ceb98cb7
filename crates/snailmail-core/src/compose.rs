//! Per-recipient messages.

use crate::error::Result;
use crate::recipients::RecipientList;
use snailmail_mime::{Attachment, MessageBuilder};
use std::sync::Arc;

/// One outgoing message, already rendered for the wire.
///
/// Every message of a mailing shares the same sender, subject, body, and
/// attachments; only the recipient differs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    from: Arc<str>,
    to: String,
    subject: Arc<str>,
    body: Arc<str>,
    attachments: Arc<[Attachment]>,
    data: Vec<u8>,
}

impl MailMessage {
    /// Sender address.
    #[must_use]
    pub fn from(&self) -> &str {
        &self.from
    }

    /// Recipient address.
    #[must_use]
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Subject line.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Body text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Attachments in order.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// The complete message with CRLF line endings, ready for `DATA`.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn render(
        from: Arc<str>,
        to: &str,
        subject: Arc<str>,
        body: Arc<str>,
        attachments: Arc<[Attachment]>,
    ) -> Result<Self> {
        let data = MessageBuilder::new()
            .from(&*from)
            .to(to)
            .subject(&*subject)
            .text_body(&*body)
            .attach_all(attachments.iter().cloned())
            .build()?
            .to_bytes()?;

        Ok(Self {
            from,
            to: to.to_string(),
            subject,
            body,
            attachments,
            data,
        })
    }
}

/// Builds the message for one recipient.
///
/// # Errors
///
/// Returns [`Error::Mime`](crate::Error::Mime) if an address, the subject,
/// or an attachment filename cannot go in a header.
pub fn make_mail(
    sender: &str,
    recipient: &str,
    subject: &str,
    body: &str,
    attachments: &[Attachment],
) -> Result<MailMessage> {
    MailMessage::render(
        Arc::from(sender),
        recipient,
        Arc::from(subject),
        Arc::from(body),
        Arc::from(attachments),
    )
}

/// Builds one message per recipient, in list order.
///
/// Nothing is returned unless every message builds.
///
/// # Errors
///
/// Same as [`make_mail`], for the first message that fails.
pub fn make_mails(
    sender: &str,
    recipients: &RecipientList,
    subject: &str,
    body: &str,
    attachments: Vec<Attachment>,
) -> Result<Vec<MailMessage>> {
    let from: Arc<str> = Arc::from(sender);
    let subject: Arc<str> = Arc::from(subject);
    let body: Arc<str> = Arc::from(body);
    let attachments: Arc<[Attachment]> = Arc::from(attachments);

    recipients
        .iter()
        .map(|to| {
            MailMessage::render(
                Arc::clone(&from),
                to,
                Arc::clone(&subject),
                Arc::clone(&body),
                Arc::clone(&attachments),
            )
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::Error;
    use mail_parser::{MessageParser, MimeHeaders};
    use snailmail_mime::ContentType;

    fn pdf() -> Attachment {
        Attachment::new(
            b"%PDF".to_vec(),
            ContentType::new("application", "pdf"),
            "report.pdf",
        )
    }

    #[test]
    fn one_message_per_recipient_in_order() {
        let recipients = RecipientList::parse("a@x.com\nb@x.com\nc@x.com\n");
        let mails = make_mails("me@x.com", &recipients, "Hi", "Hello.", vec![pdf()]).unwrap();

        let to: Vec<&str> = mails.iter().map(MailMessage::to).collect();
        assert_eq!(to, ["a@x.com", "b@x.com", "c@x.com"]);
        assert!(mails.iter().all(|m| m.from() == "me@x.com" && m.subject() == "Hi"));
    }

    #[test]
    fn messages_share_body_and_attachments() {
        let recipients = RecipientList::parse("a@x.com\nb@x.com");
        let mails = make_mails("me@x.com", &recipients, "Hi", "Hello.", vec![pdf()]).unwrap();

        assert!(std::ptr::eq(mails[0].body(), mails[1].body()));
        assert!(std::ptr::eq(
            mails[0].attachments().as_ptr(),
            mails[1].attachments().as_ptr()
        ));
    }

    #[test]
    fn renders_text_and_attachment_parts() {
        let mail = make_mail("me@x.com", "a@x.com", "Hi", "Hello.", &[pdf()]).unwrap();
        let parsed = MessageParser::default().parse(mail.data()).unwrap();

        assert_eq!(parsed.subject(), Some("Hi"));
        assert_eq!(parsed.body_text(0).as_deref(), Some("Hello."));
        let attached: Vec<_> = parsed.attachments().collect();
        assert_eq!(attached.len(), 1);
        assert_eq!(attached[0].attachment_name(), Some("report.pdf"));
        assert_eq!(attached[0].contents(), b"%PDF");
    }

    #[test]
    fn rendered_once_per_recipient() {
        let recipients = RecipientList::parse("a@x.com\nb@x.com");
        let mails = make_mails("me@x.com", &recipients, "Hi", "Hello.", Vec::new()).unwrap();

        let header = |mail: &MailMessage| {
            let data = String::from_utf8_lossy(mail.data()).into_owned();
            data.lines().find(|l| l.starts_with("To: ")).map(str::to_string)
        };
        assert_eq!(header(&mails[0]).as_deref(), Some("To: a@x.com"));
        assert_eq!(header(&mails[1]).as_deref(), Some("To: b@x.com"));
    }

    #[test]
    fn bad_recipient_fails_to_build() {
        let err = make_mail("me@x.com", "a@x.com\nBcc: b@y.com", "Hi", "Hello.", &[]).unwrap_err();
        assert!(matches!(err, Error::Mime(_)));
    }

    #[test]
    fn one_bad_attachment_name_fails_the_whole_mailing() {
        let evil = Attachment::new(
            b"x".to_vec(),
            ContentType::octet_stream(),
            "evil\nBcc: x@y.com.pdf",
        );
        let recipients = RecipientList::parse("a@x.com\nb@x.com");
        let err = make_mails("me@x.com", &recipients, "Hi", "Hello.", vec![evil]).unwrap_err();
        assert!(matches!(err, Error::Mime(_)));
    }
}
