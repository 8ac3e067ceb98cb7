//! Low-level SMTP stream handling.

use crate::error::{Error, Result};
use rustls::pki_types::ServerName;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_rustls::{
    TlsConnector,
    rustls::{ClientConfig, RootCertStore},
};

/// A byte stream an SMTP session runs over, upgradable with STARTTLS.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send + Sized {
    /// Stream type once the TLS handshake has completed.
    type Secure: AsyncRead + AsyncWrite + Unpin + Send;

    /// Performs the TLS handshake over this stream.
    fn upgrade(self, hostname: &str) -> impl Future<Output = Result<Self::Secure>> + Send;
}

impl Transport for TcpStream {
    type Secure = tokio_rustls::client::TlsStream<TcpStream>;

    async fn upgrade(self, hostname: &str) -> Result<Self::Secure> {
        let connector = create_tls_connector();
        let server_name = ServerName::try_from(hostname.to_string())
            .map_err(|_| Error::Protocol(format!("Invalid hostname: {hostname}")))?;

        connector
            .connect(server_name, self)
            .await
            .map_err(Error::Tls)
    }
}

/// SMTP stream (plain or TLS).
pub enum SmtpStream<T: Transport = TcpStream> {
    /// Plain connection.
    Plain(BufReader<T>),
    /// TLS-encrypted connection.
    Tls(Box<BufReader<T::Secure>>),
}

impl<T: Transport> fmt::Debug for SmtpStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("SmtpStream::Plain"),
            Self::Tls(_) => f.write_str("SmtpStream::Tls"),
        }
    }
}

impl<T: Transport> SmtpStream<T> {
    /// Wraps an established connection.
    pub fn new(inner: T) -> Self {
        Self::Plain(BufReader::new(inner))
    }

    /// Returns true once the stream has been upgraded to TLS.
    #[must_use]
    pub const fn is_encrypted(&self) -> bool {
        matches!(self, Self::Tls(_))
    }

    /// Reads a line from the stream, without the line terminator.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the peer closed the connection.
    pub async fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = match self {
            Self::Plain(reader) => reader.read_line(&mut line).await?,
            Self::Tls(reader) => reader.read_line(&mut line).await?,
        };
        if read == 0 {
            return Err(Error::ConnectionClosed);
        }
        Ok(line.trim_end().to_string())
    }

    /// Writes data to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        match self {
            Self::Plain(reader) => {
                reader.get_mut().write_all(data).await?;
                reader.get_mut().flush().await?;
            }
            Self::Tls(reader) => {
                reader.get_mut().write_all(data).await?;
                reader.get_mut().flush().await?;
            }
        }
        Ok(())
    }

    /// Shuts down the write half, sending TLS `close_notify` if encrypted.
    ///
    /// # Errors
    ///
    /// Returns an error if the shutdown fails.
    pub async fn shutdown(&mut self) -> Result<()> {
        match self {
            Self::Plain(reader) => reader.get_mut().shutdown().await?,
            Self::Tls(reader) => reader.get_mut().shutdown().await?,
        }
        Ok(())
    }

    /// Upgrades a plain stream to TLS.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is already encrypted, if the server
    /// sent data ahead of the handshake, or if the TLS handshake fails.
    pub async fn upgrade_to_tls(self, hostname: &str) -> Result<Self> {
        let reader = match self {
            Self::Plain(reader) => reader,
            Self::Tls(_) => return Err(Error::Protocol("Already using TLS".into())),
        };

        // Plaintext bytes buffered past the STARTTLS reply would otherwise
        // be treated as if they arrived over the encrypted channel.
        if !reader.buffer().is_empty() {
            return Err(Error::Protocol(
                "Unexpected data received before TLS handshake".into(),
            ));
        }

        let secure = reader.into_inner().upgrade(hostname).await?;
        Ok(Self::Tls(Box::new(BufReader::new(secure))))
    }
}

/// Connects to an SMTP server over plain TCP.
///
/// # Errors
///
/// Returns an error if the connection fails.
pub async fn connect(hostname: &str, port: u16) -> Result<SmtpStream> {
    let stream = TcpStream::connect((hostname, port)).await?;
    Ok(SmtpStream::new(stream))
}

/// Creates a TLS connector with the webpki root certificates.
fn create_tls_connector() -> TlsConnector {
    let root_store = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
}
