//! EHLO keywords.

/// A capability line from an EHLO reply.
///
/// Only the keywords the client acts on get their own variant; the rest are
/// kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Extension {
    /// `STARTTLS`.
    StartTls,
    /// `AUTH` with the mechanisms this client can speak.
    Auth(Vec<AuthMechanism>),
    /// `SIZE`, with the limit when one is given.
    Size(Option<usize>),
    /// Any other keyword line.
    Other(String),
}

impl Extension {
    /// Parses one capability line. Keywords are case-insensitive.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            return Self::Other(String::new());
        };

        if keyword.eq_ignore_ascii_case("STARTTLS") {
            Self::StartTls
        } else if keyword.eq_ignore_ascii_case("AUTH") {
            Self::Auth(words.filter_map(AuthMechanism::parse).collect())
        } else if keyword.eq_ignore_ascii_case("SIZE") {
            Self::Size(words.next().and_then(|n| n.parse().ok()))
        } else {
            Self::Other(line.trim().to_string())
        }
    }
}

/// SASL mechanisms usable with a username and password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMechanism {
    /// RFC 4616.
    Plain,
    /// Two base64 prompts, username then password.
    Login,
}

impl AuthMechanism {
    /// `None` for mechanisms this client does not implement.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("PLAIN") {
            Some(Self::Plain)
        } else if name.eq_ignore_ascii_case("LOGIN") {
            Some(Self::Login)
        } else {
            None
        }
    }

    /// Name as sent in `AUTH`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "PLAIN",
            Self::Login => "LOGIN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_ignore_case() {
        assert_eq!(Extension::parse("starttls"), Extension::StartTls);
        assert_eq!(Extension::parse("StartTLS"), Extension::StartTls);
    }

    #[test]
    fn auth_keeps_known_mechanisms_in_order() {
        assert_eq!(
            Extension::parse("AUTH CRAM-MD5 login XOAUTH2 PLAIN"),
            Extension::Auth(vec![AuthMechanism::Login, AuthMechanism::Plain])
        );
        assert_eq!(Extension::parse("AUTH"), Extension::Auth(vec![]));
    }

    #[test]
    fn size_limit_is_optional() {
        assert_eq!(Extension::parse("SIZE 35882577"), Extension::Size(Some(35_882_577)));
        assert_eq!(Extension::parse("SIZE"), Extension::Size(None));
        assert_eq!(Extension::parse("SIZE lots"), Extension::Size(None));
    }

    #[test]
    fn unknown_lines_are_kept() {
        assert_eq!(
            Extension::parse("8BITMIME"),
            Extension::Other("8BITMIME".into())
        );
        assert_eq!(
            Extension::parse(" ENHANCEDSTATUSCODES "),
            Extension::Other("ENHANCEDSTATUSCODES".into())
        );
    }

    #[test]
    fn mechanism_names() {
        assert_eq!(AuthMechanism::parse("plain"), Some(AuthMechanism::Plain));
        assert_eq!(AuthMechanism::parse("GSSAPI"), None);
        assert_eq!(AuthMechanism::Login.as_str(), "LOGIN");
    }
}
