//! Operator input.
//!
//! Everything the tool asks for interactively goes through
//! [`InputProvider`], so the terminal can be swapped for canned answers.

use std::collections::VecDeque;
use std::io;

/// Source of answers to interactive prompts.
pub trait InputProvider {
    /// Shows `prompt` and returns one line without its line ending.
    ///
    /// # Errors
    ///
    /// Returns an error if input is closed or unreadable.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;

    /// Like [`InputProvider::read_line`], but the answer is not echoed.
    ///
    /// # Errors
    ///
    /// Returns an error if input is closed or unreadable.
    fn read_secret(&mut self, prompt: &str) -> io::Result<String>;
}

/// Pre-recorded answers, handed out in order.
///
/// Records every prompt it was shown.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    answers: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    /// Creates a provider that answers with `answers` in order.
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts shown so far.
    #[must_use]
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    fn next(&mut self, prompt: &str) -> io::Result<String> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("no answer for prompt {prompt:?}"),
            )
        })
    }
}

impl InputProvider for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self.next(prompt)
    }

    fn read_secret(&mut self, prompt: &str) -> io::Result<String> {
        self.next(prompt)
    }
}
