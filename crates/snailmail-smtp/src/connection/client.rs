//! Type-state SMTP client.

use super::{ServerInfo, SmtpStream, Transport};
use crate::command::{Command, dot_stuff};
use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::types::{Address, AuthMechanism, Reply, ReplyClass, ReplyCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::marker::PhantomData;
use tokio::net::TcpStream;
use tracing::{debug, trace};

/// Type-state marker for a connection that has been greeted.
#[derive(Debug)]
pub struct Connected;

/// Type-state marker for a connection upgraded with STARTTLS.
#[derive(Debug)]
pub struct Secured;

/// Type-state marker for an authenticated session.
#[derive(Debug)]
pub struct Authenticated;

/// SMTP client with type-state pattern.
#[derive(Debug)]
pub struct Client<State, T: Transport = TcpStream> {
    stream: SmtpStream<T>,
    server_info: ServerInfo,
    client_hostname: String,
    _state: PhantomData<State>,
}

impl<T: Transport> Client<Connected, T> {
    /// Creates a client from a stream and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the greeting fails or if the server returns an error.
    pub async fn from_stream(mut stream: SmtpStream<T>) -> Result<Self> {
        let greeting = Self::read_reply(&mut stream).await?;
        if !greeting.is_success() {
            return Err(Error::from_reply(&greeting));
        }

        // Extract hostname from greeting (first word after code)
        let hostname = greeting
            .lines
            .first()
            .and_then(|msg| msg.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();

        debug!(server = %hostname, "SMTP greeting received");

        Ok(Self {
            stream,
            server_info: ServerInfo {
                hostname,
                ..ServerInfo::default()
            },
            client_hostname: String::new(),
            _state: PhantomData,
        })
    }

    /// Sends EHLO and discovers server capabilities.
    ///
    /// Falls back to HELO when the server rejects EHLO with a permanent
    /// error; the extension set is then empty.
    ///
    /// # Errors
    ///
    /// Returns an error if both greetings fail.
    pub async fn ehlo(mut self, client_hostname: &str) -> Result<Self> {
        self.client_hostname = client_hostname.to_string();

        let reply = self
            .send_command(Command::Ehlo {
                hostname: self.client_hostname.clone(),
            })
            .await?;

        if reply.is_success() {
            self.server_info.set_extensions(&reply.lines);
            return Ok(self);
        }

        if reply.class() != ReplyClass::Permanent {
            return Err(Error::from_reply(&reply));
        }

        debug!("EHLO rejected, falling back to HELO");
        let reply = self
            .send_command(Command::Helo {
                hostname: self.client_hostname.clone(),
            })
            .await?;

        if !reply.is_success() {
            return Err(Error::from_reply(&reply));
        }

        self.server_info.extensions.clear();
        Ok(self)
    }

    /// Upgrades the connection to TLS using STARTTLS.
    ///
    /// Capabilities are re-negotiated with a second EHLO over the encrypted
    /// channel, since the pre-TLS list must not be trusted.
    ///
    /// # Errors
    ///
    /// Returns an error if STARTTLS is not supported or if the upgrade fails.
    pub async fn starttls(mut self, hostname: &str) -> Result<Client<Secured, T>> {
        if !self.server_info.supports_starttls() {
            return Err(Error::NotSupported("STARTTLS".into()));
        }

        let reply = self.send_command(Command::StartTls).await?;
        if !reply.is_success() {
            return Err(Error::from_reply(&reply));
        }

        self.stream = self.stream.upgrade_to_tls(hostname).await?;
        debug!(server = %hostname, "TLS established");

        let reply = self
            .send_command(Command::Ehlo {
                hostname: self.client_hostname.clone(),
            })
            .await?;

        if !reply.is_success() {
            return Err(Error::from_reply(&reply));
        }

        self.server_info.set_extensions(&reply.lines);
        Ok(self.into_state())
    }
}

impl<T: Transport> Client<Secured, T> {
    /// Authenticates with the best mechanism the server advertises.
    ///
    /// PLAIN is preferred over LOGIN.
    ///
    /// # Errors
    ///
    /// Returns an error if no supported mechanism is advertised or if the
    /// server rejects the credentials.
    pub async fn login(self, username: &str, password: &str) -> Result<Client<Authenticated, T>> {
        let mechanisms = self.server_info.auth_mechanisms();

        if mechanisms.contains(&AuthMechanism::Plain) {
            self.auth_plain(username, password).await
        } else if mechanisms.contains(&AuthMechanism::Login) {
            self.auth_login(username, password).await
        } else {
            Err(Error::NotSupported(
                "a supported AUTH mechanism (PLAIN or LOGIN)".into(),
            ))
        }
    }

    /// Authenticates using PLAIN mechanism.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails.
    pub async fn auth_plain(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<Authenticated, T>> {
        // Build PLAIN response: \0username\0password
        let credentials = format!("\0{username}\0{password}");
        let encoded = STANDARD.encode(credentials.as_bytes());

        let cmd = Command::Auth {
            mechanism: AuthMechanism::Plain,
            initial_response: Some(encoded),
        };

        let reply = self.send_command(cmd).await?;
        if !reply.is_success() {
            return Err(Error::from_reply(&reply));
        }

        debug!(mechanism = "PLAIN", "authenticated");
        Ok(self.into_state())
    }

    /// Authenticates using LOGIN mechanism.
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not prompt as expected or rejects
    /// the credentials.
    pub async fn auth_login(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<Authenticated, T>> {
        let cmd = Command::Auth {
            mechanism: AuthMechanism::Login,
            initial_response: None,
        };

        let reply = self.send_command(cmd).await?;
        if reply.code != ReplyCode::AUTH_CONTINUE {
            return Err(Error::from_reply(&reply));
        }

        let reply = self
            .send_command(Command::AuthResponse(STANDARD.encode(username)))
            .await?;
        if reply.code != ReplyCode::AUTH_CONTINUE {
            return Err(Error::from_reply(&reply));
        }

        let reply = self
            .send_command(Command::AuthResponse(STANDARD.encode(password)))
            .await?;
        if !reply.is_success() {
            return Err(Error::from_reply(&reply));
        }

        debug!(mechanism = "LOGIN", "authenticated");
        Ok(self.into_state())
    }
}

impl<T: Transport> Client<Authenticated, T> {
    /// Runs one complete mail transaction: MAIL FROM, RCPT TO, DATA.
    ///
    /// The message should be RFC 5322 formatted. Line endings are normalized
    /// to CRLF and leading dots are stuffed.
    ///
    /// When the server refuses the transaction, RSET is issued so the
    /// session can carry on with the next one. Use
    /// [`Error::is_connection_error`] to tell the two failure kinds apart.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the transaction or the
    /// connection fails.
    pub async fn send_mail(&mut self, from: &Address, to: &Address, message: &[u8]) -> Result<()> {
        if let Some(limit) = self.server_info.max_message_size() {
            if message.len() > limit {
                return Err(Error::MessageTooLarge {
                    size: message.len(),
                    limit,
                });
            }
        }

        let size = self.server_info.supports_size().then_some(message.len());
        let reply = self
            .send_command(Command::MailFrom {
                from: from.clone(),
                size,
            })
            .await?;
        if !reply.is_success() {
            return Err(self.abort_transaction(&reply).await);
        }

        let reply = self.send_command(Command::RcptTo { to: to.clone() }).await?;
        if !reply.is_success() {
            return Err(self.abort_transaction(&reply).await);
        }

        let reply = self.send_command(Command::Data).await?;
        if reply.code != ReplyCode::START_DATA {
            return Err(self.abort_transaction(&reply).await);
        }

        trace!(bytes = message.len(), "C: <message data>");
        self.stream.write_all(&dot_stuff(message)).await?;

        // After end-of-data the transaction is over whatever the outcome.
        let reply = Self::read_reply(&mut self.stream).await?;
        if !reply.is_success() {
            return Err(Error::from_reply(&reply));
        }

        Ok(())
    }

    /// Converts a negative reply into an error, resetting the transaction.
    async fn abort_transaction(&mut self, reply: &Reply) -> Error {
        let err = Error::from_reply(reply);
        if err.is_connection_error() {
            return err;
        }

        match self.send_command(Command::Rset).await {
            Ok(rset) if rset.is_success() => err,
            Ok(rset) => Error::InvalidState(format!(
                "RSET rejected ({}) after: {err}",
                rset.code
            )),
            Err(rset_err) => rset_err,
        }
    }
}

// Common implementation for all states
impl<S, T: Transport> Client<S, T> {
    /// Returns the server information.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Returns true once the connection runs over TLS.
    #[must_use]
    pub const fn is_encrypted(&self) -> bool {
        self.stream.is_encrypted()
    }

    fn into_state<N>(self) -> Client<N, T> {
        Client {
            stream: self.stream,
            server_info: self.server_info,
            client_hostname: self.client_hostname,
            _state: PhantomData,
        }
    }

    async fn send_command(&mut self, cmd: Command) -> Result<Reply> {
        if cmd.is_sensitive() {
            trace!("C: <credentials redacted>");
        } else {
            trace!("C: {cmd}");
        }
        self.stream.write_all(cmd.to_line().as_bytes()).await?;
        Self::read_reply(&mut self.stream).await
    }

    async fn read_reply(stream: &mut SmtpStream<T>) -> Result<Reply> {
        let mut lines = Vec::new();
        loop {
            let line = stream.read_line().await?;
            if line.is_empty() {
                continue;
            }
            trace!("S: {line}");

            let is_last = is_last_reply_line(&line);
            lines.push(line);

            if is_last {
                break;
            }
        }

        parse_reply(&lines)
    }

    /// Sends QUIT and closes the connection (available in any state).
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT command fails.
    pub async fn quit(mut self) -> Result<()> {
        let reply = self.send_command(Command::Quit).await?;

        if !reply.is_success() && reply.code != ReplyCode::CLOSING {
            return Err(Error::from_reply(&reply));
        }

        if let Err(err) = self.stream.shutdown().await {
            debug!(error = %err, "stream shutdown after QUIT failed");
        }

        Ok(())
    }
}
