//! Directory operations: navigation, creation, deletion, and listings

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::time::timeout;
use tracing::{debug, warn};

use super::data::{LIST_ACCEPT, MLSD_ACCEPT};
use super::state::{ListFilter, ListingStrategy};
use super::{DataStream, FtpClient};
use crate::commands::FtpCommand;
use crate::error::{FtpError, Result};
use crate::listing::{parse_mlsd_line, ListFormat, NodeInformation, NodeKind};
use crate::response::codes;

impl FtpClient {
    /// Change the working directory and re-read it from the server
    ///
    /// After the `CWD` succeeds, `PWD` is issued and
    /// [`working_directory`](Self::working_directory) takes the path
    /// quoted in its reply.
    pub async fn change_working_directory(&mut self, dir: &str) -> Result<()> {
        self.require_auth()?;
        if dir.is_empty() || dir == "." {
            return Err(FtpError::InvalidPath(dir.to_string()));
        }

        self.expect_success(FtpCommand::Cwd(dir.to_string())).await?;

        let response = self.expect_success(FtpCommand::Pwd).await?;
        match response.quoted_directory() {
            Some(path) => {
                debug!("working directory now {path}");
                self.working_directory = path;
                Ok(())
            }
            None => Err(FtpError::InvalidResponse(response.message)),
        }
    }

    /// Create a directory, including missing parents
    ///
    /// A single-segment path is a plain `MKD`. Deeper paths are walked
    /// segment by segment: `CWD` probes each one and a 550 triggers
    /// `MKD` + `CWD`. The working directory is restored afterwards.
    pub async fn create_directory(&mut self, path: &str) -> Result<()> {
        self.require_auth()?;
        let segments: Vec<String> = split_segments(path);
        if segments.is_empty() {
            return Err(FtpError::InvalidPath(path.to_string()));
        }

        let absolute = path.starts_with('/');
        let original = self.working_directory.clone();
        if absolute {
            self.cwd_raw("/").await?;
        }

        if segments.len() == 1 {
            self.expect_success(FtpCommand::Mkd(segments[0].clone())).await?;
        } else {
            for segment in &segments {
                self.step_into_or_create(segment).await?;
            }
        }

        if absolute || segments.len() > 1 {
            self.cwd_raw(&original).await?;
        }
        Ok(())
    }

    /// Walk into `path`, creating every missing segment, and restore the
    /// working directory; used to ensure upload parents exist
    pub(super) async fn ensure_directory(&mut self, path: &str) -> Result<()> {
        let segments = split_segments(path);
        if segments.is_empty() {
            return Ok(());
        }

        let original = self.working_directory.clone();
        if path.starts_with('/') {
            self.cwd_raw("/").await?;
        }
        for segment in &segments {
            self.step_into_or_create(segment).await?;
        }
        self.cwd_raw(&original).await
    }

    async fn step_into_or_create(&mut self, segment: &str) -> Result<()> {
        let response = self.command(FtpCommand::Cwd(segment.to_string())).await?;
        if response.code == codes::ACTION_NOT_TAKEN {
            self.expect_success(FtpCommand::Mkd(segment.to_string())).await?;
            self.expect_success(FtpCommand::Cwd(segment.to_string())).await?;
        } else if !response.is_success() {
            return Err(FtpError::unexpected(response));
        }
        Ok(())
    }

    async fn cwd_raw(&mut self, dir: &str) -> Result<()> {
        self.expect_success(FtpCommand::Cwd(dir.to_string())).await?;
        Ok(())
    }

    /// Delete a directory, recursing into it when the server reports it
    /// non-empty (550); deleting `/` is a no-op
    pub async fn delete_directory(&mut self, path: &str) -> Result<()> {
        self.require_auth()?;
        if path == "/" {
            return Ok(());
        }
        self.delete_directory_inner(path).await
    }

    async fn delete_directory_inner(&mut self, path: &str) -> Result<()> {
        let response = self.command(FtpCommand::Rmd(path.to_string())).await?;
        match response.code {
            codes::COMMAND_OK | codes::FILE_ACTION_OK => Ok(()),
            codes::ACTION_NOT_TAKEN => {
                debug!("{path} not empty, clearing it first");
                self.cwd_raw(path).await?;
                for node in self.list_all().await? {
                    match node.kind {
                        NodeKind::File | NodeKind::Symlink => {
                            self.delete_file(&node.name).await?;
                        }
                        NodeKind::Directory => {
                            Box::pin(self.delete_directory_inner(&node.name)).await?;
                        }
                    }
                }
                self.cwd_raw("..").await?;

                let response = self.command(FtpCommand::Rmd(path.to_string())).await?;
                if response.is_success() {
                    Ok(())
                } else {
                    Err(FtpError::unexpected(response))
                }
            }
            _ => Err(FtpError::unexpected(response)),
        }
    }

    /// List every entry of the working directory
    pub async fn list_all(&mut self) -> Result<Vec<NodeInformation>> {
        self.list_nodes(ListFilter::All).await
    }

    /// List the files of the working directory
    pub async fn list_files(&mut self) -> Result<Vec<NodeInformation>> {
        self.list_nodes(ListFilter::Files).await
    }

    /// List the subdirectories of the working directory
    pub async fn list_directories(&mut self) -> Result<Vec<NodeInformation>> {
        self.list_nodes(ListFilter::Directories).await
    }

    async fn list_nodes(&mut self, filter: ListFilter) -> Result<Vec<NodeInformation>> {
        self.require_auth()?;
        let strategy = self.listing_strategy;
        let permit = self.acquire_data_permit().await?;

        let (command, accept) = match strategy {
            ListingStrategy::Mlsd => (FtpCommand::Mlsd, MLSD_ACCEPT),
            ListingStrategy::List => (FtpCommand::List, LIST_ACCEPT),
        };
        let mut stream = self.open_data_channel(command, accept, permit).await?;

        let lines = timeout(self.config.read_timeout(), read_listing_lines(&mut stream))
            .await
            .map_err(|_| FtpError::Timeout)??;

        let completion_pending = stream.completion_pending();
        if let Err(e) = stream.shutdown().await {
            warn!("listing stream shutdown failed: {e}");
        }
        drop(stream);
        if completion_pending {
            self.read_transfer_completion().await?;
        }

        Ok(collect_nodes(strategy, filter, &lines))
    }
}

/// Drain the data stream line by line until EOF
async fn read_listing_lines(stream: &mut DataStream) -> Result<Vec<String>> {
    let mut reader = BufReader::new(stream);
    let mut lines = Vec::new();
    loop {
        let mut line_bytes = Vec::with_capacity(512);
        let n = reader.read_until(b'\n', &mut line_bytes).await?;
        if n == 0 {
            return Ok(lines);
        }
        let line = String::from_utf8_lossy(&line_bytes);
        let line = line.trim_end_matches(['\r', '\n']);
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }
}

fn collect_nodes(
    strategy: ListingStrategy,
    filter: ListFilter,
    lines: &[String],
) -> Vec<NodeInformation> {
    match strategy {
        // MLSD filters on the raw facts before parsing
        ListingStrategy::Mlsd => lines
            .iter()
            .filter(|line| match filter {
                ListFilter::All => true,
                ListFilter::Files => line.contains("type=file"),
                ListFilter::Directories => line.contains("type=dir"),
            })
            .filter_map(|line| parse_mlsd_line(line))
            .collect(),
        // LIST probes the format off the first line, then filters on the
        // parsed kind
        ListingStrategy::List => {
            let Some(format) = lines.first().and_then(|line| ListFormat::detect(line)) else {
                return Vec::new();
            };
            lines
                .iter()
                .filter_map(|line| format.parse(line))
                .filter(|node| match filter {
                    ListFilter::All => true,
                    ListFilter::Files => node.kind == NodeKind::File,
                    ListFilter::Directories => node.kind == NodeKind::Directory,
                })
                .collect()
        }
    }
}

fn split_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}
