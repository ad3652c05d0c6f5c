//! FTP error types

use thiserror::Error;

/// FTP protocol and connection errors
#[derive(Error, Debug)]
pub enum FtpError {
    /// IO error during network operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS error during secure connection
    #[error("TLS error: {0}")]
    Tls(String),

    /// Connection or response timeout
    #[error("Connection timeout")]
    Timeout,

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// FTP protocol error with response code
    #[error("FTP error {code}: {message}")]
    Protocol {
        /// FTP reply code (e.g., 500, 530, 550)
        code: u16,
        /// Error message from server
        message: String,
    },

    /// Operation requires an open control connection
    #[error("Not connected")]
    NotConnected,

    /// Operation requires a logged-in session
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Login failed
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Connection closed unexpectedly
    #[error("Connection closed")]
    ConnectionClosed,

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Path argument rejected before reaching the server
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl FtpError {
    pub(crate) fn unexpected(response: crate::response::FtpResponse) -> Self {
        FtpError::Protocol {
            code: response.code,
            message: response.message,
        }
    }
}

/// Result type alias using FtpError
pub type Result<T> = std::result::Result<T, FtpError>;
