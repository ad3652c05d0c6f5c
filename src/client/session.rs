//! Session lifecycle: login handshake, feature negotiation, logout

use tracing::{debug, warn};

use super::state::{Encoding, ListingStrategy};
use super::FtpClient;
use crate::commands::FtpCommand;
use crate::config::{self, TransferMode};
use crate::error::{FtpError, Result};
use crate::features::Features;
use crate::response::codes;

impl FtpClient {
    /// Connect and authenticate
    ///
    /// Runs the full login sequence: connect (with TLS as configured) and
    /// read the welcome, USER/PASS, channel protection (`PBSZ 0` /
    /// `PROT P`) on encrypted sessions, FEAT negotiation, UTF-8
    /// enablement, TYPE selection, and entry into the configured base
    /// directory (created if missing). An existing session is logged out
    /// first.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - [`FtpError::AuthFailed`] - the server rejected the credentials
    /// - [`FtpError::Protocol`] - an unexpected reply during the handshake
    /// - [`FtpError::Io`] / [`FtpError::Tls`] / [`FtpError::Timeout`] -
    ///   transport failures
    ///
    /// When the handshake fails after connecting, the connection is closed
    /// before the error is returned.
    pub async fn login(&mut self) -> Result<()> {
        if self.is_connected() {
            self.logout().await;
        }
        self.connect_control().await?;

        match self.login_handshake().await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.logout().await;
                Err(e)
            }
        }
    }

    async fn login_handshake(&mut self) -> Result<()> {
        let username = self.config.effective_username().to_string();
        debug!("logging in as {username}");

        let response = self.command(FtpCommand::User(username)).await?;
        match response.code {
            codes::LOGGED_IN => {}
            codes::SEND_PASSWORD | codes::SEND_ACCOUNT => {
                let password = self.config.password.clone();
                let response = self.command(FtpCommand::Pass(password)).await?;
                if response.code != codes::LOGGED_IN {
                    return Err(FtpError::AuthFailed(response.message));
                }
            }
            _ => return Err(FtpError::AuthFailed(response.message)),
        }
        self.authenticated = true;

        if self.is_encrypted() {
            self.expect_success(FtpCommand::Pbsz("0".to_string())).await?;
            self.expect_success(FtpCommand::Prot("P".to_string())).await?;
        }

        self.features = self.negotiate_features().await?;
        self.listing_strategy = if self.features.supports("MLSD") {
            ListingStrategy::Mlsd
        } else {
            ListingStrategy::List
        };

        if self.features.supports("UTF8") && self.encoding == Encoding::Ascii {
            self.encoding = Encoding::Utf8;
            // advisory; some servers reject OPTS yet still honour UTF-8
            let response = self.command(FtpCommand::Opts("UTF8 ON".to_string())).await?;
            if !response.is_success() {
                debug!("OPTS UTF8 ON rejected: {} {}", response.code, response.message);
            }
        }

        let type_argument = self.config.type_argument();
        self.expect_success(FtpCommand::Type(type_argument)).await?;

        let base = self.config.base_directory.clone();
        if base != "/" {
            self.ensure_directory(&base).await?;
            self.change_working_directory(&base).await?;
        }

        debug!("login complete, working directory {}", self.working_directory);
        Ok(())
    }

    async fn negotiate_features(&mut self) -> Result<Features> {
        let response = self.command(FtpCommand::Feat).await?;
        if response.is_success() {
            let features = Features::from_feat_reply(&response);
            debug!("server advertises {} features", features.lines().len());
            Ok(features)
        } else if matches!(
            response.code,
            codes::COMMAND_SYNTAX_ERROR | codes::COMMAND_NOT_IMPLEMENTED
        ) {
            debug!("server does not implement FEAT");
            Ok(Features::new())
        } else {
            Err(FtpError::unexpected(response))
        }
    }

    /// End the session
    ///
    /// Drains stale input, sends QUIT when the peer is still there, and
    /// closes the control socket. Failures are logged, never surfaced.
    pub async fn logout(&mut self) {
        if let Some(mut channel) = self.control.take() {
            channel.drain_stale_input().await;
            if channel.is_connected() {
                if let Err(e) = channel.send(&FtpCommand::Quit).await {
                    warn!("QUIT failed: {e}");
                }
            }
        }
        self.authenticated = false;
        self.local_addr = None;
        self.working_directory = "/".to_string();
        self.features = Features::new();
        self.encoding = Encoding::Ascii;
        self.listing_strategy = ListingStrategy::List;
    }

    /// Select the transfer type (`TYPE`), e.g. binary before a download
    pub async fn set_transfer_mode(
        &mut self,
        mode: TransferMode,
        second_type: Option<char>,
    ) -> Result<()> {
        self.require_auth()?;
        let argument = config::type_argument(mode, second_type);
        self.expect_success(FtpCommand::Type(argument)).await?;
        Ok(())
    }

    /// Announce the client name (`CLNT`); rejection is tolerated
    pub async fn set_client_name(&mut self, name: &str) -> Result<()> {
        let response = self.command(FtpCommand::Clnt(name.to_string())).await?;
        if !response.is_success() {
            debug!("CLNT rejected: {} {}", response.code, response.message);
        }
        Ok(())
    }
}
