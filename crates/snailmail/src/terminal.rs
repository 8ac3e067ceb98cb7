//! Terminal prompts and progress output.

use snailmail_core::{InputProvider, SendObserver};
use std::io::{self, BufRead, Write};

/// Prompts on stdout, reads answers from stdin.
#[derive(Debug, Default)]
pub struct TerminalInput;

impl InputProvider for TerminalInput {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "standard input closed",
            ));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn read_secret(&mut self, prompt: &str) -> io::Result<String> {
        rpassword::prompt_password(prompt)
    }
}

/// Prints one status line per recipient.
#[derive(Debug)]
pub struct ConsoleObserver<W> {
    out: W,
}

impl<W: Write> ConsoleObserver<W> {
    /// Writes progress to `out`.
    pub const fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> SendObserver for ConsoleObserver<W> {
    fn on_sending(&mut self, recipient: &str) {
        let _ = write!(self.out, "Sending mail to {recipient}.");
        let _ = self.out.flush();
    }

    fn on_sent(&mut self, _recipient: &str) {
        let _ = writeln!(self.out);
    }

    fn on_rejected(&mut self, _recipient: &str, reason: &str) {
        let _ = writeln!(self.out, " Rejected: {reason}");
    }

    fn on_sleeping(&mut self, seconds: u64) {
        let _ = writeln!(self.out, "Sleeping for {seconds} seconds.");
    }
}
