//! Envelope addresses.

use std::fmt;

use crate::error::{Error, Result};

/// A bare `local@domain` mailbox as written between `<` and `>` in
/// `MAIL FROM` and `RCPT TO`.
///
/// Construction rejects anything that could break out of the command line,
/// so a value of this type is always safe to put on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Parses a mailbox, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] for an empty value, a value without
    /// exactly one `@` between non-empty halves, or one containing
    /// whitespace, control characters or angle brackets.
    pub fn new(addr: impl AsRef<str>) -> Result<Self> {
        let addr = addr.as_ref().trim();
        if addr.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }
        if let Some(bad) = addr
            .chars()
            .find(|&c| c.is_whitespace() || c.is_control() || matches!(c, '<' | '>'))
        {
            return Err(Error::InvalidAddress(format!(
                "{addr:?} contains {bad:?}"
            )));
        }

        match addr.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(addr.to_string()))
            }
            _ => Err(Error::InvalidAddress(format!(
                "{addr:?} is not of the form local@domain"
            ))),
        }
    }

    /// The address text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything after the `@`.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
