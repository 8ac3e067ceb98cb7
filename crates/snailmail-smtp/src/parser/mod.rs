//! Reply parsing.
//!
//! A reply is one or more lines sharing a three-digit code. Every line but
//! the last has `-` after the code; the last has a space, or nothing at all
//! when the server sends a bare code.

use crate::error::{Error, Result};
use crate::types::{Reply, ReplyCode};

/// Assembles a reply from the lines read off the wire, CRLF already removed.
///
/// # Errors
///
/// Returns [`Error::Protocol`] when there are no lines, a line has no valid
/// code, or the lines disagree on the code.
pub fn parse_reply(lines: &[String]) -> Result<Reply> {
    let first = lines
        .first()
        .ok_or_else(|| Error::Protocol("empty reply".into()))?;
    let code = reply_code(first)?;

    let text = lines
        .iter()
        .map(|line| {
            if reply_code(line)? == code {
                Ok(line.get(4..).unwrap_or_default().to_string())
            } else {
                Err(Error::Protocol(format!("reply code changed mid-reply: {line:?}")))
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Reply::new(code, text))
}

/// Whether `line` ends its reply.
#[must_use]
pub fn is_last_reply_line(line: &str) -> bool {
    match line.as_bytes().get(3) {
        Some(separator) => *separator == b' ',
        None => line.len() == 3,
    }
}

fn reply_code(line: &str) -> Result<ReplyCode> {
    line.get(..3)
        .filter(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse().ok())
        .map(ReplyCode::new)
        .ok_or_else(|| Error::Protocol(format!("no reply code in {line:?}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn single_line() {
        let reply = parse_reply(&lines(&["250 2.1.0 Ok"])).unwrap();
        assert_eq!(reply.code, ReplyCode::OK);
        assert_eq!(reply.lines, ["2.1.0 Ok"]);
    }

    #[test]
    fn multi_line_ehlo() {
        let reply = parse_reply(&lines(&[
            "250-mx.example.com",
            "250-STARTTLS",
            "250 AUTH PLAIN LOGIN",
        ]))
        .unwrap();
        assert_eq!(reply.lines, ["mx.example.com", "STARTTLS", "AUTH PLAIN LOGIN"]);
    }

    #[test]
    fn bare_code() {
        let reply = parse_reply(&lines(&["354"])).unwrap();
        assert_eq!(reply.code, ReplyCode::START_DATA);
        assert_eq!(reply.lines, [""]);
    }

    #[test]
    fn malformed_replies() {
        assert!(parse_reply(&[]).is_err());
        assert!(parse_reply(&lines(&["25"])).is_err());
        assert!(parse_reply(&lines(&["OK."])).is_err());
        assert!(parse_reply(&lines(&["+25 huh"])).is_err());
        assert!(parse_reply(&lines(&["250-one", "550 two"])).is_err());
    }

    #[test]
    fn last_line_detection() {
        assert!(is_last_reply_line("221 Bye"));
        assert!(is_last_reply_line("221"));
        assert!(!is_last_reply_line("250-PIPELINING"));
        assert!(!is_last_reply_line("22"));
    }
}
