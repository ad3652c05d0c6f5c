//! Byte-stream abstraction over plain TCP and TLS sockets

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::{client, server};

/// A control or data connection, plain or TLS-wrapped
///
/// The server variant carries active-mode data sockets accepted under
/// explicit TLS, where this client plays the TLS server role.
pub(crate) enum MaybeTlsStream {
    Plain(TcpStream),
    ClientTls(Box<client::TlsStream<TcpStream>>),
    ServerTls(Box<server::TlsStream<TcpStream>>),
}

impl MaybeTlsStream {
    /// The underlying TCP socket, for readiness probes and local-address
    /// queries
    pub(crate) fn tcp_ref(&self) -> &TcpStream {
        match self {
            MaybeTlsStream::Plain(stream) => stream,
            MaybeTlsStream::ClientTls(stream) => stream.get_ref().0,
            MaybeTlsStream::ServerTls(stream) => stream.get_ref().0,
        }
    }

    pub(crate) fn is_tls(&self) -> bool {
        !matches!(self, MaybeTlsStream::Plain(_))
    }
}

impl AsyncRead for MaybeTlsStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            MaybeTlsStream::ClientTls(stream) => Pin::new(stream).poll_read(cx, buf),
            MaybeTlsStream::ServerTls(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for MaybeTlsStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            MaybeTlsStream::ClientTls(stream) => Pin::new(stream).poll_write(cx, buf),
            MaybeTlsStream::ServerTls(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(stream) => Pin::new(stream).poll_flush(cx),
            MaybeTlsStream::ClientTls(stream) => Pin::new(stream).poll_flush(cx),
            MaybeTlsStream::ServerTls(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            MaybeTlsStream::ClientTls(stream) => Pin::new(stream).poll_shutdown(cx),
            MaybeTlsStream::ServerTls(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}
