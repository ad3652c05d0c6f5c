//! File operations: streaming transfers, rename, delete, size

use tracing::debug;

use super::data::{DataStream, TRANSFER_ACCEPT};
use super::FtpClient;
use crate::commands::FtpCommand;
use crate::error::{FtpError, Result};
use crate::response::codes;

impl FtpClient {
    /// Open a download stream for `name` (`RETR`)
    ///
    /// Read the returned stream to EOF, then hand it back through
    /// [`close_data_stream`](Self::close_data_stream) so the transfer
    /// completion reply is consumed.
    pub async fn open_read(&mut self, name: &str) -> Result<DataStream> {
        self.require_auth()?;
        debug!("retrieving {name}");
        let permit = self.acquire_data_permit().await?;
        self.open_data_channel(FtpCommand::Retr(name.to_string()), TRANSFER_ACCEPT, permit)
            .await
    }

    /// Open an upload stream for `name` (`STOR`), creating missing parent
    /// directories first
    ///
    /// Write the payload, then hand the stream back through
    /// [`close_data_stream`](Self::close_data_stream); the server only
    /// finalises the file once the data connection closes.
    pub async fn open_write(&mut self, name: &str) -> Result<DataStream> {
        self.require_auth()?;
        debug!("storing {name}");

        if let Some((parent, _)) = name.rsplit_once('/') {
            if !parent.is_empty() {
                self.ensure_directory(parent).await?;
            }
        }

        let permit = self.acquire_data_permit().await?;
        self.open_data_channel(FtpCommand::Stor(name.to_string()), TRANSFER_ACCEPT, permit)
            .await
    }

    /// Rename `from` to `to` (`RNFR`/`RNTO`)
    pub async fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        self.require_auth()?;
        self.expect(
            FtpCommand::Rnfr(from.to_string()),
            &[codes::FILE_COMMAND_PENDING],
        )
        .await?;
        self.expect(
            FtpCommand::Rnto(to.to_string()),
            &[codes::FILE_ACTION_OK, codes::CLOSING_DATA],
        )
        .await?;
        Ok(())
    }

    /// Delete the file `name` (`DELE`)
    pub async fn delete_file(&mut self, name: &str) -> Result<()> {
        self.require_auth()?;
        self.expect_success(FtpCommand::Dele(name.to_string())).await?;
        Ok(())
    }

    /// Size of `name` in bytes (`SIZE`)
    pub async fn get_file_size(&mut self, name: &str) -> Result<u64> {
        self.require_auth()?;
        let response = self
            .expect(FtpCommand::Size(name.to_string()), &[codes::FILE_STATUS])
            .await?;
        response
            .message
            .trim()
            .parse()
            .map_err(|_| FtpError::InvalidResponse(response.message))
    }
}
