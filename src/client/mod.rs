//! Async FTP client: session lifecycle and command orchestration

mod connection;
mod data;
mod directory;
mod io;
mod session;
mod state;
mod transfer;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::commands::FtpCommand;
use crate::config::FtpConfig;
use crate::error::{FtpError, Result};
use crate::features::Features;
use crate::response::FtpResponse;
use io::ControlChannel;

pub use data::DataStream;
pub use state::{Encoding, ListingStrategy};

/// Async FTP client
///
/// Create one with [`FtpClient::new`] and open the session with
/// [`login`](Self::login). All operations serialise through the single
/// control connection; at most one data transfer runs at a time.
///
/// # Example
///
/// ```no_run
/// use ftp_rs::{FtpClient, FtpConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = FtpConfig::with_credentials("ftp.example.com", "user", "pass");
/// let mut client = FtpClient::new(config);
/// client.login().await?;
/// client.change_working_directory("/pub").await?;
/// for node in client.list_files().await? {
///     println!("{}", node.name);
/// }
/// client.logout().await;
/// # Ok(())
/// # }
/// ```
#[must_use]
pub struct FtpClient {
    /// Server and session configuration
    config: Arc<FtpConfig>,
    /// Control connection; `None` before login and after logout
    control: Option<ControlChannel>,
    /// Whether USER/PASS completed
    authenticated: bool,
    /// Canonical absolute working directory
    working_directory: String,
    /// Feature set negotiated via FEAT
    features: Features,
    /// Control-channel text encoding
    encoding: Encoding,
    /// Listing strategy chosen at login
    listing_strategy: ListingStrategy,
    /// Local endpoint of the control socket, for PORT mode
    local_addr: Option<SocketAddr>,
    /// At most one concurrent data transfer per session
    data_semaphore: Arc<Semaphore>,
}

impl FtpClient {
    /// Create a client for `config`; does not connect
    pub fn new(config: FtpConfig) -> Self {
        Self {
            config: Arc::new(config),
            control: None,
            authenticated: false,
            working_directory: "/".to_string(),
            features: Features::new(),
            encoding: Encoding::Ascii,
            listing_strategy: ListingStrategy::List,
            local_addr: None,
            data_semaphore: Arc::new(Semaphore::new(1)),
        }
    }

    /// The configuration this client was created with
    pub fn config(&self) -> &FtpConfig {
        &self.config
    }

    /// Whether the control socket is open and the peer has not closed it
    pub fn is_connected(&self) -> bool {
        self.control
            .as_ref()
            .is_some_and(ControlChannel::is_connected)
    }

    /// Whether login completed on this session
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Whether TLS is active on the control channel
    pub fn is_encrypted(&self) -> bool {
        self.control.as_ref().is_some_and(ControlChannel::is_tls)
    }

    /// The session's current working directory
    pub fn working_directory(&self) -> &str {
        &self.working_directory
    }

    /// Features the server advertised at login
    pub fn features(&self) -> &Features {
        &self.features
    }

    /// Negotiated control-channel encoding
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Listing strategy chosen at login
    pub fn listing_strategy(&self) -> ListingStrategy {
        self.listing_strategy
    }

    /// Send a command envelope and return the raw reply
    ///
    /// Escape hatch for verbs without a dedicated method; no reply-code
    /// checking is applied.
    pub async fn send_command(&mut self, command: FtpCommand) -> Result<FtpResponse> {
        self.command(command).await
    }

    /// Send a pre-serialised command line and return the raw reply
    pub async fn send_raw_command(&mut self, line: &str) -> Result<FtpResponse> {
        self.command(FtpCommand::Raw(line.to_string())).await
    }

    pub(super) async fn command(&mut self, command: FtpCommand) -> Result<FtpResponse> {
        let channel = self.control.as_mut().ok_or(FtpError::NotConnected)?;
        channel.send(&command).await
    }

    /// Send and require one of `accept`, surfacing the server text otherwise
    pub(super) async fn expect(
        &mut self,
        command: FtpCommand,
        accept: &[u16],
    ) -> Result<FtpResponse> {
        let response = self.command(command).await?;
        if accept.contains(&response.code) {
            Ok(response)
        } else {
            Err(FtpError::unexpected(response))
        }
    }

    /// Send and require a 2xx/3xx reply
    pub(super) async fn expect_success(&mut self, command: FtpCommand) -> Result<FtpResponse> {
        let response = self.command(command).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(FtpError::unexpected(response))
        }
    }

    pub(super) fn require_auth(&self) -> Result<()> {
        if !self.authenticated {
            return Err(FtpError::NotAuthenticated);
        }
        Ok(())
    }

    /// Claim the single data-transfer slot; waits while a transfer is open
    pub(super) async fn acquire_data_permit(&self) -> Result<OwnedSemaphorePermit> {
        self.data_semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| FtpError::ConnectionClosed)
    }
}

impl Drop for FtpClient {
    fn drop(&mut self) {
        debug!("FtpClient dropped");
    }
}
