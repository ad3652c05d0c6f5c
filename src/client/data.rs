//! Data-channel negotiation (EPSV/PASV/PORT) and the transfer stream
//!
//! Passive mode asks the server for a port (EPSV, falling back to PASV)
//! and connects out; active mode listens on a random high port announced
//! with PORT and accepts exactly one connection. Either way the resulting
//! stream is single-use and carries the session's data-transfer permit.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::pin::Pin;
use std::task::{Context, Poll};

use rand::Rng;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::OwnedSemaphorePermit;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::connection::{resolve, tls_acceptor, tls_client_handshake};
use super::FtpClient;
use crate::commands::FtpCommand;
use crate::config::Encryption;
use crate::error::{FtpError, Result};
use crate::response::{codes, FtpResponse};
use crate::stream::MaybeTlsStream;

/// Replies that may open a file transfer
pub(super) const TRANSFER_ACCEPT: &[u16] = &[
    codes::DATA_ALREADY_OPEN,
    codes::OPENING_DATA,
    codes::CLOSING_DATA,
];

/// Replies that may open a LIST transfer
pub(super) const LIST_ACCEPT: &[u16] = &[codes::DATA_ALREADY_OPEN, codes::OPENING_DATA];

/// Replies that may open an MLSD transfer
pub(super) const MLSD_ACCEPT: &[u16] = &[
    codes::DATA_ALREADY_OPEN,
    codes::OPENING_DATA,
    codes::CLOSING_DATA,
];

/// Attempts at binding a random active-mode port before giving up
const MAX_BIND_ATTEMPTS: usize = 8;

/// A one-shot transfer byte stream
///
/// Holds the session's single data-transfer permit; dropping the stream
/// releases it. Prefer [`FtpClient::close_data_stream`] over dropping: a
/// dropped stream leaves the transfer-completion reply unread on the
/// control channel (the next command drains it as stale input).
pub struct DataStream {
    inner: MaybeTlsStream,
    /// Whether the server still owes a completion reply (the transfer was
    /// opened with a 1xx preliminary code)
    completion_pending: bool,
    _permit: OwnedSemaphorePermit,
}

impl DataStream {
    fn new(inner: MaybeTlsStream, completion_pending: bool, permit: OwnedSemaphorePermit) -> Self {
        Self {
            inner,
            completion_pending,
            _permit: permit,
        }
    }

    pub(super) fn completion_pending(&self) -> bool {
        self.completion_pending
    }
}

impl AsyncRead for DataStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for DataStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}

impl FtpClient {
    /// Negotiate a data connection and issue `command` on the control
    /// channel, accepting the reply codes in `accept`
    pub(super) async fn open_data_channel(
        &mut self,
        command: FtpCommand,
        accept: &[u16],
        permit: OwnedSemaphorePermit,
    ) -> Result<DataStream> {
        if self.config.use_passive {
            self.open_passive_data_channel(command, accept, permit).await
        } else {
            self.open_active_data_channel(command, accept, permit).await
        }
    }

    async fn open_passive_data_channel(
        &mut self,
        command: FtpCommand,
        accept: &[u16],
        permit: OwnedSemaphorePermit,
    ) -> Result<DataStream> {
        let port = self.negotiate_passive_port().await?;

        // the advertised host is ignored; reconnect to the configured one
        let addr = resolve(&self.config.host, port, self.config.ip_version).await?;
        debug!("opening passive data connection to {addr}");
        let tcp = timeout(self.config.read_timeout(), TcpStream::connect(addr))
            .await
            .map_err(|_| FtpError::Timeout)??;
        tcp.set_nodelay(true)?;

        let response = self.command(command).await?;
        if !accept.contains(&response.code) {
            return Err(FtpError::unexpected(response));
        }
        let completion_pending = response.is_preliminary();

        let stream = if self.is_encrypted() {
            tls_client_handshake(&self.config, tcp).await?
        } else {
            MaybeTlsStream::Plain(tcp)
        };

        Ok(DataStream::new(stream, completion_pending, permit))
    }

    /// EPSV first; on anything but 229 fall back to PASV
    async fn negotiate_passive_port(&mut self) -> Result<u16> {
        let response = self.command(FtpCommand::Epsv).await?;
        if response.code == codes::ENTERING_EXTENDED_PASSIVE {
            return match response.extended_passive_port() {
                Some(port) => Ok(port),
                None => Err(FtpError::InvalidResponse(response.message)),
            };
        }
        debug!("EPSV unavailable ({}), falling back to PASV", response.code);

        let response = self
            .expect(FtpCommand::Pasv, &[codes::ENTERING_PASSIVE])
            .await?;
        match response.passive_endpoint() {
            Some((_, port)) => Ok(port),
            None => Err(FtpError::InvalidResponse(response.message)),
        }
    }

    async fn open_active_data_channel(
        &mut self,
        command: FtpCommand,
        accept: &[u16],
        permit: OwnedSemaphorePermit,
    ) -> Result<DataStream> {
        let local_ip = match self.local_addr {
            Some(SocketAddr::V4(v4)) => *v4.ip(),
            Some(SocketAddr::V6(_)) => {
                return Err(FtpError::Config(
                    "active mode requires an IPv4 control connection".to_string(),
                ))
            }
            None => return Err(FtpError::NotConnected),
        };

        let (listener, p1, p2) = bind_active_listener(local_ip).await?;
        let octets = local_ip.octets();
        let endpoint = format!(
            "{},{},{},{},{},{}",
            octets[0], octets[1], octets[2], octets[3], p1, p2
        );
        self.expect_success(FtpCommand::Port(endpoint)).await?;

        let response = self.command(command).await?;
        if !accept.contains(&response.code) {
            return Err(FtpError::unexpected(response));
        }
        let completion_pending = response.is_preliminary();

        let (tcp, peer) = timeout(self.config.read_timeout(), listener.accept())
            .await
            .map_err(|_| FtpError::Timeout)??;
        debug!("accepted active data connection from {peer}");
        tcp.set_nodelay(true)?;

        let stream = if self.config.encryption == Encryption::Explicit {
            let acceptor = tls_acceptor(&self.config)?;
            let tls = timeout(self.config.read_timeout(), acceptor.accept(tcp))
                .await
                .map_err(|_| FtpError::Timeout)?
                .map_err(|e| FtpError::Tls(format!("TLS handshake failed: {e}")))?;
            MaybeTlsStream::ServerTls(Box::new(tls))
        } else {
            MaybeTlsStream::Plain(tcp)
        };

        Ok(DataStream::new(stream, completion_pending, permit))
    }

    /// Close a transfer stream and consume the completion reply
    ///
    /// The completion read runs under `disconnect_timeout_ms` when
    /// configured. Close-path failures are logged, never surfaced.
    pub async fn close_data_stream(&mut self, stream: DataStream) {
        let completion_pending = stream.completion_pending();
        let mut stream = stream;
        if let Err(e) = stream.shutdown().await {
            warn!("data stream shutdown failed: {e}");
        }
        drop(stream);

        if !completion_pending {
            return;
        }
        let timeout_duration = self.config.disconnect_timeout();
        let Some(channel) = self.control.as_mut() else {
            return;
        };
        match channel.read_response_with_timeout(timeout_duration).await {
            Ok(response) if response.is_success() => {
                debug!("transfer complete: {} {}", response.code, response.message);
            }
            Ok(response) => {
                warn!(
                    "unexpected transfer completion: {} {}",
                    response.code, response.message
                );
            }
            Err(e) => warn!("failed to read transfer completion: {e}"),
        }
    }

    /// Strict completion read used by listings: the reply must be success
    pub(super) async fn read_transfer_completion(&mut self) -> Result<FtpResponse> {
        let channel = self.control.as_mut().ok_or(FtpError::NotConnected)?;
        let response = channel.read_response().await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(FtpError::unexpected(response))
        }
    }
}

/// Bind a listener on a random port `(r1 << 8) | r2` with `r1 ∈ [5, 200)`
/// and `r2 ∈ [0, 200)`, retrying with fresh randoms a bounded number of
/// times
async fn bind_active_listener(ip: Ipv4Addr) -> Result<(TcpListener, u8, u8)> {
    for _ in 0..MAX_BIND_ATTEMPTS {
        let p1: u8 = rand::thread_rng().gen_range(5..200);
        let p2: u8 = rand::thread_rng().gen_range(0..200);
        let port = (u16::from(p1) << 8) | u16::from(p2);
        match TcpListener::bind((ip, port)).await {
            Ok(listener) => return Ok((listener, p1, p2)),
            Err(e) => debug!("active-mode port {port} unavailable: {e}"),
        }
    }
    Err(FtpError::Io(io::Error::new(
        io::ErrorKind::AddrInUse,
        "no bindable active-mode port",
    )))
}
