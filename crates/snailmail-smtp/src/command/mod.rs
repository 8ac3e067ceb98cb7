//! Client commands and DATA framing.

use std::fmt;

use crate::types::{Address, AuthMechanism};

/// One command line sent by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `HELO`, used only when the server refuses `EHLO`.
    Helo {
        /// Name the client announces.
        hostname: String,
    },
    /// `EHLO`.
    Ehlo {
        /// Name the client announces.
        hostname: String,
    },
    /// `STARTTLS`.
    StartTls,
    /// `AUTH`, optionally with an initial response.
    Auth {
        /// Mechanism to start.
        mechanism: AuthMechanism,
        /// Base64 initial response sent on the same line.
        initial_response: Option<String>,
    },
    /// Bare base64 line answering a `334` challenge.
    AuthResponse(String),
    /// `MAIL FROM`.
    MailFrom {
        /// Reverse path.
        from: Address,
        /// Declared message size, sent only when the server has `SIZE`.
        size: Option<usize>,
    },
    /// `RCPT TO`.
    RcptTo {
        /// Forward path.
        to: Address,
    },
    /// `DATA`.
    Data,
    /// `RSET`.
    Rset,
    /// `QUIT`.
    Quit,
}

impl Command {
    /// The command terminated by CRLF, ready for the wire.
    #[must_use]
    pub fn to_line(&self) -> String {
        format!("{self}\r\n")
    }

    /// Whether the line carries credentials and must not be logged.
    #[must_use]
    pub const fn is_sensitive(&self) -> bool {
        matches!(self, Self::Auth { .. } | Self::AuthResponse(_))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Helo { hostname } => write!(f, "HELO {hostname}"),
            Self::Ehlo { hostname } => write!(f, "EHLO {hostname}"),
            Self::StartTls => f.write_str("STARTTLS"),
            Self::Auth {
                mechanism,
                initial_response: Some(response),
            } => write!(f, "AUTH {} {response}", mechanism.as_str()),
            Self::Auth {
                mechanism,
                initial_response: None,
            } => write!(f, "AUTH {}", mechanism.as_str()),
            Self::AuthResponse(response) => f.write_str(response),
            Self::MailFrom { from, size: None } => write!(f, "MAIL FROM:<{from}>"),
            Self::MailFrom {
                from,
                size: Some(size),
            } => write!(f, "MAIL FROM:<{from}> SIZE={size}"),
            Self::RcptTo { to } => write!(f, "RCPT TO:<{to}>"),
            Self::Data => f.write_str("DATA"),
            Self::Rset => f.write_str("RSET"),
            Self::Quit => f.write_str("QUIT"),
        }
    }
}

/// Prepares message content for the DATA phase.
///
/// Line endings are normalized to CRLF, lines starting with `.` are
/// byte-stuffed, and the terminating `.` line is appended.
#[must_use]
pub fn dot_stuff(message: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + message.len() / 64 + 8);
    let body = message.strip_suffix(b"\n").unwrap_or(message);

    for line in body.split(|&b| b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.first() == Some(&b'.') {
            out.push(b'.');
        }
        out.extend_from_slice(line);
        out.extend_from_slice(b"\r\n");
    }

    out.extend_from_slice(b".\r\n");
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::new(s).unwrap()
    }

    #[test]
    fn command_lines() {
        let cases = [
            (
                Command::Ehlo {
                    hostname: "localhost".into(),
                },
                "EHLO localhost\r\n",
            ),
            (
                Command::Helo {
                    hostname: "localhost".into(),
                },
                "HELO localhost\r\n",
            ),
            (Command::StartTls, "STARTTLS\r\n"),
            (
                Command::MailFrom {
                    from: addr("me@x.com"),
                    size: None,
                },
                "MAIL FROM:<me@x.com>\r\n",
            ),
            (
                Command::MailFrom {
                    from: addr("me@x.com"),
                    size: Some(2048),
                },
                "MAIL FROM:<me@x.com> SIZE=2048\r\n",
            ),
            (
                Command::RcptTo { to: addr("a@x.com") },
                "RCPT TO:<a@x.com>\r\n",
            ),
            (Command::Data, "DATA\r\n"),
            (Command::Rset, "RSET\r\n"),
            (Command::Quit, "QUIT\r\n"),
        ];
        for (command, line) in cases {
            assert_eq!(command.to_line(), line);
            assert!(!command.is_sensitive());
        }
    }

    #[test]
    fn auth_lines_are_sensitive() {
        let plain = Command::Auth {
            mechanism: AuthMechanism::Plain,
            initial_response: Some("AG1lAHNlY3JldA==".into()),
        };
        assert_eq!(plain.to_line(), "AUTH PLAIN AG1lAHNlY3JldA==\r\n");
        assert!(plain.is_sensitive());

        let login = Command::Auth {
            mechanism: AuthMechanism::Login,
            initial_response: None,
        };
        assert_eq!(login.to_line(), "AUTH LOGIN\r\n");

        let answer = Command::AuthResponse("bWU=".into());
        assert_eq!(answer.to_line(), "bWU=\r\n");
        assert!(answer.is_sensitive());
    }

    #[test]
    fn dot_stuff_frames_body() {
        assert_eq!(dot_stuff(b"Hello."), b"Hello.\r\n.\r\n");
        assert_eq!(
            dot_stuff(b"To: a\nbare lf\r\nend\n"),
            b"To: a\r\nbare lf\r\nend\r\n.\r\n"
        );
    }

    #[test]
    fn dot_stuff_doubles_leading_dots() {
        assert_eq!(
            dot_stuff(b"a\r\n.\r\n..b\r\n"),
            b"a\r\n..\r\n...b\r\n.\r\n"
        );
    }
}
