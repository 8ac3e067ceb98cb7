//! Delivery of a whole mailing over one SMTP session.
//!
//! [`MailSession`] opens a single connection, upgrades it with STARTTLS,
//! authenticates, then sends every message in order with a randomized pause
//! between sends. A refused message is recorded and the loop moves on; a
//! broken connection ends the run. The connection is closed with `QUIT` on
//! every exit path once the session is authenticated.

use crate::compose::MailMessage;
use crate::error::{Error, Result};
use crate::scheduler::SendScheduler;
use rand::Rng;
use rand::rngs::StdRng;
use snailmail_smtp::{Address, Authenticated, Client, SmtpStream, Transport};
use std::fmt;
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// EHLO name used when none is configured.
pub const DEFAULT_HELO_NAME: &str = "localhost";

/// Upper bound on the closing `QUIT` exchange.
const QUIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens the byte stream a session runs over.
pub trait Connector {
    /// Stream type produced.
    type Stream: Transport;

    /// Connects to `host:port`.
    fn connect(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = io::Result<Self::Stream>> + Send;
}

/// Plain TCP connector.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, host: &str, port: u16) -> io::Result<TcpStream> {
        TcpStream::connect((host, port)).await
    }
}

/// A password whose `Debug` output is redacted.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Wraps a secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the secret.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Connection and pacing settings for one run.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Mail server host name.
    pub host: String,
    /// Mail server port (usually 587).
    pub port: u16,
    /// Login name.
    pub username: String,
    /// Login password.
    pub password: Password,
    /// Log server capabilities after the handshake.
    pub debug: bool,
    /// Base of the delay between sends, in seconds.
    pub wait_base: i64,
    /// Name announced in EHLO.
    pub helo_name: String,
}

impl SessionConfig {
    /// Creates a configuration with the default wait of 10 seconds.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: Password,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password,
            debug: false,
            wait_base: 10,
            helo_name: DEFAULT_HELO_NAME.to_string(),
        }
    }

    /// Sets the base delay between sends.
    #[must_use]
    pub const fn with_wait(mut self, seconds: i64) -> Self {
        self.wait_base = seconds;
        self
    }

    /// Sets the EHLO name.
    #[must_use]
    pub fn with_helo_name(mut self, name: impl Into<String>) -> Self {
        self.helo_name = name.into();
        self
    }

    /// Enables debug output.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendReport {
    /// Recipients the server accepted, in send order.
    pub delivered: Vec<String>,
    /// Refused recipients with the reason, in send order.
    pub failed: Vec<(String, String)>,
}

impl SendReport {
    /// Number of messages attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }

    /// True when every message was accepted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Progress callbacks for a run.
///
/// All methods default to doing nothing.
pub trait SendObserver {
    /// A message is about to be sent.
    fn on_sending(&mut self, recipient: &str) {
        let _ = recipient;
    }

    /// The server accepted the message.
    fn on_sent(&mut self, recipient: &str) {
        let _ = recipient;
    }

    /// The server or the address check refused the message.
    fn on_rejected(&mut self, recipient: &str, reason: &str) {
        let _ = (recipient, reason);
    }

    /// The loop is about to pause before the next send.
    fn on_sleeping(&mut self, seconds: u64) {
        let _ = seconds;
    }
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SendObserver for NoopObserver {}

/// One SMTP session delivering a list of messages.
#[derive(Debug)]
pub struct MailSession<C = TcpConnector, R = StdRng> {
    config: SessionConfig,
    connector: C,
    scheduler: SendScheduler<R>,
}

impl MailSession {
    /// Creates a session over TCP with an entropy-seeded scheduler.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let scheduler = SendScheduler::new(config.wait_base);
        Self {
            config,
            connector: TcpConnector,
            scheduler,
        }
    }
}

impl<C: Connector, R: Rng> MailSession<C, R> {
    /// Creates a session with a custom connector and scheduler.
    pub const fn with_parts(config: SessionConfig, connector: C, scheduler: SendScheduler<R>) -> Self {
        Self {
            config,
            connector,
            scheduler,
        }
    }

    /// Session settings.
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Sends every message, stopping early on Ctrl-C.
    ///
    /// # Errors
    ///
    /// See [`MailSession::run_until`].
    pub async fn run<O: SendObserver>(
        &mut self,
        messages: &[MailMessage],
        observer: &mut O,
    ) -> Result<SendReport> {
        let interrupt = async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "cannot listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        };
        self.run_until(messages, observer, interrupt).await
    }

    /// Sends every message unless `shutdown` completes first.
    ///
    /// Refused messages are collected in the report. An empty message list
    /// opens no connection.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the sender address is unusable
    /// - [`Error::Connect`], [`Error::Tls`], [`Error::Auth`] if the session
    ///   cannot be established
    /// - [`Error::Session`] if the connection breaks while sending
    /// - [`Error::Interrupted`] if `shutdown` fires
    pub async fn run_until<O, F>(
        &mut self,
        messages: &[MailMessage],
        observer: &mut O,
        shutdown: F,
    ) -> Result<SendReport>
    where
        O: SendObserver,
        F: Future<Output = ()>,
    {
        let Some(first) = messages.first() else {
            return Ok(SendReport::default());
        };
        Address::new(first.from())
            .map_err(|e| Error::Config(format!("invalid sender {:?}: {e}", first.from())))?;

        let mut client = self.establish().await?;

        let outcome = tokio::select! {
            result = self.send_all(&mut client, messages, observer) => result,
            () = shutdown => {
                warn!("interrupted, closing connection");
                Err(Error::Interrupted)
            }
        };

        close(client).await;
        outcome
    }

    async fn establish(&self) -> Result<Client<Authenticated, C::Stream>> {
        let config = &self.config;
        info!(host = %config.host, port = config.port, "connecting");

        let stream = self
            .connector
            .connect(&config.host, config.port)
            .await
            .map_err(|e| Error::Connect(format!("{}:{}: {e}", config.host, config.port)))?;

        let client = Client::from_stream(SmtpStream::new(stream))
            .await
            .map_err(|e| Error::Connect(e.to_string()))?
            .ehlo(&config.helo_name)
            .await
            .map_err(|e| Error::Connect(e.to_string()))?;

        let client = client
            .starttls(&config.host)
            .await
            .map_err(|e| Error::Tls(e.to_string()))?;

        if config.debug {
            info!(
                server = %client.server_info().hostname,
                extensions = ?client.server_info().extensions,
                "server capabilities"
            );
        }

        let client = client
            .login(&config.username, config.password.expose())
            .await
            .map_err(|e| Error::Auth(e.to_string()))?;

        debug!(user = %config.username, "session ready");
        Ok(client)
    }

    async fn send_all<O: SendObserver>(
        &mut self,
        client: &mut Client<Authenticated, C::Stream>,
        messages: &[MailMessage],
        observer: &mut O,
    ) -> Result<SendReport> {
        let mut report = SendReport::default();
        let last = messages.len().saturating_sub(1);

        for (index, message) in messages.iter().enumerate() {
            observer.on_sending(message.to());

            match deliver(client, message).await {
                Ok(()) => {
                    info!(recipient = message.to(), "message accepted");
                    observer.on_sent(message.to());
                    report.delivered.push(message.to().to_string());
                }
                Err(Error::RecipientError { recipient, reason }) => {
                    warn!(recipient = %recipient, %reason, "message refused");
                    observer.on_rejected(&recipient, &reason);
                    report.failed.push((recipient, reason));
                }
                Err(err) => return Err(err),
            }

            if index < last {
                let seconds = self.scheduler.next_delay_seconds();
                if seconds > 0 {
                    observer.on_sleeping(seconds);
                    debug!(seconds, "pausing before next send");
                    tokio::time::sleep(Duration::from_secs(seconds)).await;
                }
            }
        }

        Ok(report)
    }
}

/// Sends one message; only connection failures are fatal.
async fn deliver<T: Transport>(
    client: &mut Client<Authenticated, T>,
    message: &MailMessage,
) -> Result<()> {
    let refused = |reason: String| Error::RecipientError {
        recipient: message.to().to_string(),
        reason,
    };

    let from = Address::new(message.from()).map_err(|e| refused(e.to_string()))?;
    let to = Address::new(message.to()).map_err(|e| refused(e.to_string()))?;

    client.send_mail(&from, &to, message.data()).await.map_err(|e| {
        if e.is_connection_error() {
            Error::Session(e.to_string())
        } else {
            refused(e.to_string())
        }
    })
}

async fn close<T: Transport>(client: Client<Authenticated, T>) {
    match tokio::time::timeout(QUIT_TIMEOUT, client.quit()).await {
        Ok(Ok(())) => debug!("session closed"),
        Ok(Err(err)) => warn!(error = %err, "QUIT failed"),
        Err(_) => warn!("QUIT timed out"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_debug_is_redacted() {
        let config = SessionConfig::new("smtp.x.com", 587, "me", Password::new("hunter2"));
        let shown = format!("{config:?}");
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("<redacted>"));
    }

    #[test]
    fn config_defaults() {
        let config = SessionConfig::new("smtp.x.com", 587, "me", Password::default());
        assert_eq!(config.wait_base, 10);
        assert_eq!(config.helo_name, DEFAULT_HELO_NAME);
        assert!(!config.debug);
    }

    #[test]
    fn report_counts() {
        let report = SendReport {
            delivered: vec!["a@x.com".into()],
            failed: vec![("b@x.com".into(), "550 no".into())],
        };
        assert_eq!(report.attempted(), 2);
        assert!(!report.is_complete());
    }
}
