//! Gathering everything a run needs before the session opens.

use crate::cli::Cli;
use crate::settings::Settings;
use snailmail_core::session::DEFAULT_HELO_NAME;
use snailmail_core::{
    Error, InputProvider, MailMessage, Password, RecipientList, SendReport, SessionConfig,
    load_attachments, make_mails,
};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Wait base used when neither flag nor settings give one.
pub const DEFAULT_WAIT: i64 = 10;

/// Ready-to-send mailing.
#[derive(Debug)]
pub struct Plan {
    /// One message per recipient, in order.
    pub mails: Vec<MailMessage>,
    /// Session settings, credentials included.
    pub config: SessionConfig,
}

/// What the operator decided.
#[derive(Debug)]
pub enum Prepared {
    /// Declined at the debug preview; nothing is sent.
    Aborted,
    /// Go ahead and send.
    Send(Plan),
}

/// Reads the input files, asks for anything missing, and builds the
/// messages.
///
/// Prompts come in this order: sender, subject, the debug preview gate,
/// username, password, mailhost, port.
///
/// # Errors
///
/// Fails on unreadable files, closed input or output, an empty recipient
/// list, a message that cannot be built, or an invalid port.
///
/// An empty value or port 0 from a flag or the settings counts as not
/// given.
pub async fn prepare<I, W>(
    cli: &Cli,
    settings: &Settings,
    input: &mut I,
    out: &mut W,
) -> snailmail_core::Result<Prepared>
where
    I: InputProvider,
    W: Write,
{
    let body = read_text(&cli.body_file).await?;
    let recipients = RecipientList::from_file(&cli.recipient_file).await?;
    if recipients.is_empty() {
        return Err(Error::Config(format!(
            "no recipients in {}",
            cli.recipient_file.display()
        )));
    }

    let sender = answer(
        input,
        given(cli.sender.as_deref(), settings.sender.as_deref()),
        "From: ",
    )?;
    let subject = answer(input, given(cli.subject.as_deref(), None), "Subject: ")?;

    let attachments = load_attachments(&cli.attachments).await?;
    let mails = make_mails(&sender, &recipients, &subject, &body, attachments)?;
    info!(count = mails.len(), "messages prepared");

    if cli.debug {
        if let Some(first) = mails.first() {
            writeln!(out, "{}", String::from_utf8_lossy(first.data()))
                .and_then(|()| out.flush())
                .map_err(Error::Input)?;
        }
        let reply = input.read_line("Abort? [y/N] ").map_err(Error::Input)?;
        if reply.trim().eq_ignore_ascii_case("y") {
            debug!("aborted at preview");
            return Ok(Prepared::Aborted);
        }
    }

    let username = answer(
        input,
        given(cli.username.as_deref(), settings.username.as_deref()),
        "Username: ",
    )?;
    let password = Password::new(input.read_secret("Password: ").map_err(Error::Input)?);
    let mailhost = answer(
        input,
        given(cli.mailhost.as_deref(), settings.mailhost.as_deref()),
        "Mailhost: ",
    )?;
    let port = match cli.port.filter(|&p| p > 0).or(settings.port.filter(|&p| p > 0)) {
        Some(port) => port,
        None => parse_port(
            &input
                .read_line("Port (try 587 if you don't know better): ")
                .map_err(Error::Input)?,
        )?,
    };

    let config = SessionConfig::new(mailhost, port, username, password)
        .with_wait(cli.wait.or(settings.wait).unwrap_or(DEFAULT_WAIT))
        .with_helo_name(
            settings
                .helo_name
                .clone()
                .unwrap_or_else(|| DEFAULT_HELO_NAME.to_string()),
        )
        .with_debug(cli.debug);

    Ok(Prepared::Send(Plan { mails, config }))
}

/// Final report for the operator.
pub fn summary(report: &SendReport, total: usize) -> String {
    let mut text = format!("Sent {} of {total} messages.", report.delivered.len());
    for (recipient, reason) in &report.failed {
        text.push_str(&format!("\n  {recipient}: {reason}"));
    }
    text
}

async fn read_text(path: &Path) -> snailmail_core::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::file_access(path, e))
}

/// First non-blank value of flag and setting.
fn given<'a>(flag: Option<&'a str>, setting: Option<&'a str>) -> Option<&'a str> {
    [flag, setting]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
}

fn answer<I: InputProvider>(
    input: &mut I,
    given: Option<&str>,
    prompt: &str,
) -> snailmail_core::Result<String> {
    match given {
        Some(value) => Ok(value.to_string()),
        None => input
            .read_line(prompt)
            .map(|line| line.trim().to_string())
            .map_err(Error::Input),
    }
}

fn parse_port(text: &str) -> snailmail_core::Result<u16> {
    let text = text.trim();
    match text.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(Error::Config(format!("invalid port {text:?}"))),
    }
}
