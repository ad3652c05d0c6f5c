//! Control-channel I/O: framed command send and reply parsing
//!
//! One command/response round-trip at a time: the channel is owned
//! exclusively by the client, every submission writes the command line and
//! then parses exactly one reply, so replies pair with their commands in
//! FIFO order. The completion reply of a finished data transfer is read
//! through [`ControlChannel::read_response_with_timeout`] without sending
//! anything.

use std::task::{Context, Poll, Waker};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, ReadBuf};
use tokio::time::timeout;
use tracing::{trace, warn};

use crate::commands::FtpCommand;
use crate::error::{FtpError, Result};
use crate::response::{check_reply_code, parse_terminal_line, FtpResponse};
use crate::stream::MaybeTlsStream;

/// Cap on reply lines, against servers that never send a terminal line
const MAX_RESPONSE_LINES: usize = 128;

/// How long to wait for each stale reply when draining leftover input
const STALE_DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// The persistent command/response connection
pub(super) struct ControlChannel {
    stream: BufReader<MaybeTlsStream>,
    read_timeout: Duration,
}

impl ControlChannel {
    pub(super) fn new(stream: MaybeTlsStream, read_timeout: Duration) -> Self {
        Self {
            stream: BufReader::new(stream),
            read_timeout,
        }
    }

    /// Whether TLS has been activated on this channel
    pub(super) fn is_tls(&self) -> bool {
        self.stream.get_ref().is_tls()
    }

    /// Recover the underlying stream, e.g. for the explicit-TLS upgrade
    ///
    /// Any buffered input is dropped; callers only do this at points where
    /// the server is waiting on us (after the `AUTH TLS` acceptance).
    pub(super) fn into_stream(self) -> MaybeTlsStream {
        if !self.stream.buffer().is_empty() {
            warn!("discarding {} buffered bytes on stream handover", self.stream.buffer().len());
        }
        self.stream.into_inner()
    }

    /// Poll the socket without blocking: the peer has closed when the read
    /// side is readable with zero available bytes.
    pub(super) fn is_connected(&self) -> bool {
        let mut buf = [0u8; 1];
        let mut read_buf = ReadBuf::new(&mut buf);
        let mut cx = Context::from_waker(Waker::noop());
        match self
            .stream
            .get_ref()
            .tcp_ref()
            .poll_peek(&mut cx, &mut read_buf)
        {
            Poll::Ready(Ok(0)) => false,
            Poll::Ready(Err(_)) => false,
            _ => true,
        }
    }

    /// True when input is waiting that no command asked for
    fn has_pending_input(&self) -> bool {
        if !self.stream.buffer().is_empty() {
            return true;
        }
        let mut buf = [0u8; 1];
        let mut read_buf = ReadBuf::new(&mut buf);
        let mut cx = Context::from_waker(Waker::noop());
        matches!(
            self.stream
                .get_ref()
                .tcp_ref()
                .poll_peek(&mut cx, &mut read_buf),
            Poll::Ready(Ok(n)) if n > 0
        )
    }

    /// Consume replies left over from an aborted transfer so the next
    /// command pairs with its own reply
    pub(super) async fn drain_stale_input(&mut self) {
        while self.has_pending_input() {
            match timeout(STALE_DRAIN_TIMEOUT, self.read_response_inner()).await {
                Ok(Ok(response)) => {
                    warn!(
                        "discarding stale response: {} {}",
                        response.code, response.message
                    );
                }
                Ok(Err(_)) | Err(_) => break,
            }
        }
    }

    /// Send one command and read its reply
    pub(super) async fn send(&mut self, command: &FtpCommand) -> Result<FtpResponse> {
        self.drain_stale_input().await;
        self.write_command(command).await?;
        self.read_response().await
    }

    async fn write_command(&mut self, command: &FtpCommand) -> Result<()> {
        trace!("--> {}", command.redacted());
        let line = format!("{command}\r\n");
        let write_timeout = self.read_timeout;
        let write = async {
            self.stream.get_mut().write_all(line.as_bytes()).await?;
            self.stream.get_mut().flush().await
        };
        timeout(write_timeout, write)
            .await
            .map_err(|_| FtpError::Timeout)??;
        Ok(())
    }

    /// Read one reply under the configured timeout
    pub(super) async fn read_response(&mut self) -> Result<FtpResponse> {
        self.read_response_with_timeout(self.read_timeout).await
    }

    /// Read one reply under a caller-supplied timeout (the data-stream
    /// close path installs its shorter disconnect timeout here)
    pub(super) async fn read_response_with_timeout(
        &mut self,
        timeout_duration: Duration,
    ) -> Result<FtpResponse> {
        timeout(timeout_duration, self.read_response_inner())
            .await
            .map_err(|_| FtpError::Timeout)?
    }

    /// Accumulate reply lines until the terminal `DDD SP message` line
    async fn read_response_inner(&mut self) -> Result<FtpResponse> {
        let mut lines = Vec::new();
        loop {
            let mut line_bytes = Vec::with_capacity(512);
            let n = self.stream.read_until(b'\n', &mut line_bytes).await?;
            if n == 0 {
                return Err(FtpError::ConnectionClosed);
            }

            let line = String::from_utf8_lossy(&line_bytes);
            let line = line.trim_end_matches(['\r', '\n']);
            trace!("<-- {line}");

            if let Some((code, message)) = parse_terminal_line(line) {
                check_reply_code(code, line)?;
                lines.push(line.to_string());
                return Ok(FtpResponse {
                    code,
                    message,
                    lines,
                });
            }

            lines.push(line.to_string());
            if lines.len() >= MAX_RESPONSE_LINES {
                return Err(FtpError::InvalidResponse(
                    "reply exceeded maximum line count".to_string(),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt as _;
    use tokio::net::{TcpListener, TcpStream};

    async fn channel_with_input(input: &'static [u8]) -> ControlChannel {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(input).await.unwrap();
            // keep the socket open so reads observe the payload, not EOF
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });
        let stream = TcpStream::connect(addr).await.unwrap();
        ControlChannel::new(MaybeTlsStream::Plain(stream), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_read_single_line_response() {
        let mut channel = channel_with_input(b"220 service ready\r\n").await;
        let response = channel.read_response().await.unwrap();
        assert_eq!(response.code, 220);
        assert_eq!(response.message, "service ready");
        assert_eq!(response.lines, vec!["220 service ready"]);
    }

    #[tokio::test]
    async fn test_read_multi_line_response() {
        let mut channel =
            channel_with_input(b"211-Features:\r\n UTF8\r\n MLST size*;modify*;\r\n211 End\r\n")
                .await;
        let response = channel.read_response().await.unwrap();
        assert_eq!(response.code, 211);
        assert_eq!(response.message, "End");
        assert_eq!(
            response.lines,
            vec!["211-Features:", " UTF8", " MLST size*;modify*;", "211 End"]
        );
    }

    #[tokio::test]
    async fn test_consecutive_responses_stay_in_order() {
        let mut channel = channel_with_input(b"200 first\r\n226 second\r\n").await;
        assert_eq!(channel.read_response().await.unwrap().code, 200);
        assert_eq!(channel.read_response().await.unwrap().code, 226);
    }

    #[tokio::test]
    async fn test_invalid_reply_code_rejected() {
        let mut channel = channel_with_input(b"999 no such code class\r\n").await;
        assert!(matches!(
            channel.read_response().await,
            Err(FtpError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_drain_stale_input() {
        let mut channel = channel_with_input(b"226 orphan completion\r\n220 real reply\r\n").await;
        // wait for the payload to arrive so the probe sees it
        tokio::time::sleep(Duration::from_millis(50)).await;
        channel.drain_stale_input().await;
        assert!(!channel.has_pending_input());
    }
}
