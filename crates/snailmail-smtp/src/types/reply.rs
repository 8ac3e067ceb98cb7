//! Server replies.

use std::fmt;

/// The outcome class given by a reply code's first digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyClass {
    /// `2xx`: the command succeeded.
    Completed,
    /// `3xx`: the server waits for more input.
    Intermediate,
    /// `4xx`: try again later.
    Transient,
    /// `5xx`: do not retry.
    Permanent,
    /// Anything outside `200..600`.
    Unknown,
}

/// Three-digit reply code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReplyCode(u16);

impl ReplyCode {
    /// `220` greeting.
    pub const SERVICE_READY: Self = Self(220);
    /// `221` answer to QUIT.
    pub const CLOSING: Self = Self(221);
    /// `250` command accepted.
    pub const OK: Self = Self(250);
    /// `334` AUTH challenge.
    pub const AUTH_CONTINUE: Self = Self(334);
    /// `354` go ahead with the message.
    pub const START_DATA: Self = Self(354);
    /// `421` server is shutting the channel.
    pub const SERVICE_UNAVAILABLE: Self = Self(421);

    /// Wraps a raw code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// The raw code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Classifies the code by its first digit.
    #[must_use]
    pub const fn class(self) -> ReplyClass {
        match self.0 / 100 {
            2 => ReplyClass::Completed,
            3 => ReplyClass::Intermediate,
            4 => ReplyClass::Transient,
            5 => ReplyClass::Permanent,
            _ => ReplyClass::Unknown,
        }
    }
}

impl fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One complete reply, possibly spread over several lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Reply code shared by every line.
    pub code: ReplyCode,
    /// Text after the code on each line.
    pub lines: Vec<String>,
}

impl Reply {
    /// Builds a reply from its parsed parts.
    #[must_use]
    pub const fn new(code: ReplyCode, lines: Vec<String>) -> Self {
        Self { code, lines }
    }

    /// Class of the reply code.
    #[must_use]
    pub const fn class(&self) -> ReplyClass {
        self.code.class()
    }

    /// `2xx`.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.class(), ReplyClass::Completed)
    }

    /// All lines joined by a single space, for error reports.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_follow_first_digit() {
        assert_eq!(ReplyCode::OK.class(), ReplyClass::Completed);
        assert_eq!(ReplyCode::START_DATA.class(), ReplyClass::Intermediate);
        assert_eq!(ReplyCode::SERVICE_UNAVAILABLE.class(), ReplyClass::Transient);
        assert_eq!(ReplyCode::new(550).class(), ReplyClass::Permanent);
        assert_eq!(ReplyCode::new(199).class(), ReplyClass::Unknown);
        assert_eq!(ReplyCode::new(600).class(), ReplyClass::Unknown);
    }

    #[test]
    fn only_2xx_is_success() {
        assert!(Reply::new(ReplyCode::CLOSING, vec![]).is_success());
        assert!(!Reply::new(ReplyCode::AUTH_CONTINUE, vec![]).is_success());
        assert!(!Reply::new(ReplyCode::new(452), vec![]).is_success());
    }

    #[test]
    fn text_joins_lines() {
        let reply = Reply::new(
            ReplyCode::new(550),
            vec!["5.1.1 mailbox unavailable".into(), " try later ".into()],
        );
        assert_eq!(reply.text(), "5.1.1 mailbox unavailable try later");
        assert_eq!(Reply::new(ReplyCode::new(354), vec![String::new()]).text(), "");
    }

    #[test]
    fn code_displays_as_digits() {
        assert_eq!(ReplyCode::SERVICE_READY.to_string(), "220");
    }
}
