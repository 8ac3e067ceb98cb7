//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;

/// Send the same mail, one copy per recipient, over a single SMTP session.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "snailmail", version)]
pub struct Cli {
    /// File with one recipient address per line
    #[arg(value_name = "RECIPIENT_FILE")]
    pub recipient_file: PathBuf,

    /// Text file used verbatim as the mail body
    #[arg(value_name = "BODY_FILE")]
    pub body_file: PathBuf,

    /// From address of the mail
    #[arg(short = 'f', long, env = "SNAILMAIL_SENDER")]
    pub sender: Option<String>,

    /// Subject of the mail
    #[arg(short, long)]
    pub subject: Option<String>,

    /// Files to attach (repeatable). Recipients see only the file name, not its directory
    #[arg(short, long = "attachment", value_name = "PATH", num_args = 1..)]
    pub attachments: Vec<PathBuf>,

    /// Mail host to send through
    #[arg(short, long, env = "SNAILMAIL_MAILHOST")]
    pub mailhost: Option<String>,

    /// Port on the mail host (usually 587)
    #[arg(short, long, env = "SNAILMAIL_PORT")]
    pub port: Option<u16>,

    /// Username for the mail server
    #[arg(short, long, env = "SNAILMAIL_USERNAME")]
    pub username: Option<String>,

    /// Base of the random wait between mails in seconds; 0 disables it [default: 10]
    #[arg(short, long, allow_negative_numbers = true)]
    pub wait: Option<i64>,

    /// Preview the first mail and trace the SMTP dialogue
    #[arg(short, long)]
    pub debug: bool,

    /// Settings file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
