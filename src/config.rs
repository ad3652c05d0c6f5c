//! FTP client configuration

use std::time::Duration;

use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};

/// Control-channel encryption mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Encryption {
    /// Plain TCP, no TLS
    #[default]
    None,
    /// TLS from the first byte, before the welcome banner (port 990)
    Implicit,
    /// TLS negotiated after the banner via `AUTH TLS`
    Explicit,
}

/// Transfer type sent with the `TYPE` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransferMode {
    /// ASCII text transfer (`TYPE A`)
    #[default]
    Ascii,
    /// Binary / image transfer (`TYPE I`)
    Binary,
}

impl TransferMode {
    /// The type character used on the wire
    pub fn as_char(self) -> char {
        match self {
            TransferMode::Ascii => 'A',
            TransferMode::Binary => 'I',
        }
    }
}

/// Address family preference for resolved endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IpVersion {
    V4,
    V6,
    /// First resolved address of either family
    #[default]
    Any,
}

/// TLS protocol versions offered during the handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TlsVersion {
    Tls12,
    Tls13,
}

/// Client certificate chain and private key (DER)
///
/// Used for client authentication on outgoing TLS connections, and as the
/// server identity when accepting TLS on active-mode data sockets.
#[derive(Debug)]
pub struct ClientCertificate {
    pub chain: Vec<CertificateDer<'static>>,
    pub key: PrivateKeyDer<'static>,
}

impl Clone for ClientCertificate {
    fn clone(&self) -> Self {
        Self {
            chain: self.chain.clone(),
            key: self.key.clone_key(),
        }
    }
}

/// FTP server and session configuration
///
/// Immutable once handed to the client. Only `host` is required; every
/// other field has a protocol-appropriate default.
///
/// # Example
///
/// ```
/// use ftp_rs::{Encryption, FtpConfig};
///
/// let mut config = FtpConfig::with_credentials("ftp.example.com", "user", "pass");
/// config.encryption = Encryption::Explicit;
/// config.base_directory = "/upload".to_string();
/// ```
#[must_use]
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FtpConfig {
    /// Server hostname or address
    pub host: String,

    /// Control port; defaults to 21, or 990 with implicit TLS
    #[cfg_attr(feature = "serde", serde(default))]
    pub port: Option<u16>,

    /// Login user; empty means anonymous
    #[cfg_attr(feature = "serde", serde(default))]
    pub username: String,

    /// Login password; empty for anonymous
    #[cfg_attr(feature = "serde", serde(default))]
    pub password: String,

    /// Directory entered (and created if missing) after login
    #[cfg_attr(feature = "serde", serde(default = "default_base_directory"))]
    pub base_directory: String,

    /// Negotiate data connections passively (EPSV/PASV) instead of PORT
    #[cfg_attr(feature = "serde", serde(default = "default_use_passive"))]
    pub use_passive: bool,

    /// Control-channel encryption mode
    #[cfg_attr(feature = "serde", serde(default))]
    pub encryption: Encryption,

    /// Accept any server certificate (testing only)
    #[cfg_attr(feature = "serde", serde(default))]
    pub ignore_certificate_errors: bool,

    /// Certificate presented for client auth and for server-role TLS on
    /// active-mode data sockets
    #[cfg_attr(feature = "serde", serde(skip))]
    pub client_certificate: Option<ClientCertificate>,

    /// TLS versions to offer; `None` uses the rustls defaults
    #[cfg_attr(feature = "serde", serde(default))]
    pub tls_versions: Option<Vec<TlsVersion>>,

    /// Address family preference when resolving hosts
    #[cfg_attr(feature = "serde", serde(default))]
    pub ip_version: IpVersion,

    /// Socket read/write timeout in seconds
    #[cfg_attr(feature = "serde", serde(default = "default_timeout_seconds"))]
    pub timeout_seconds: u64,

    /// Override for the transfer-completion read when closing a data stream
    #[cfg_attr(feature = "serde", serde(default))]
    pub disconnect_timeout_ms: Option<u64>,

    /// Transfer type selected at login
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode: TransferMode,

    /// Optional second TYPE character (e.g. `N` in `TYPE A N`)
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode_second_type: Option<char>,
}

#[cfg(feature = "serde")]
fn default_base_directory() -> String {
    "/".to_string()
}

#[cfg(feature = "serde")]
fn default_use_passive() -> bool {
    true
}

#[cfg(feature = "serde")]
fn default_timeout_seconds() -> u64 {
    30
}

impl FtpConfig {
    /// Anonymous session configuration for `host`
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            username: String::new(),
            password: String::new(),
            base_directory: "/".to_string(),
            use_passive: true,
            encryption: Encryption::None,
            ignore_certificate_errors: false,
            client_certificate: None,
            tls_versions: None,
            ip_version: IpVersion::Any,
            timeout_seconds: 30,
            disconnect_timeout_ms: None,
            mode: TransferMode::Ascii,
            mode_second_type: None,
        }
    }

    /// Configuration with username/password credentials
    pub fn with_credentials(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let mut config = Self::new(host);
        config.username = username.into();
        config.password = password.into();
        config
    }

    /// Credentialed configuration upgrading to TLS via `AUTH TLS`
    pub fn explicit_tls(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let mut config = Self::with_credentials(host, username, password);
        config.encryption = Encryption::Explicit;
        config
    }

    /// Credentialed configuration with TLS from the first byte (port 990)
    pub fn implicit_tls(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let mut config = Self::with_credentials(host, username, password);
        config.encryption = Encryption::Implicit;
        config
    }

    /// Effective control port
    pub fn control_port(&self) -> u16 {
        self.port.unwrap_or(match self.encryption {
            Encryption::Implicit => 990,
            _ => 21,
        })
    }

    /// Login name, substituting `anonymous` for an empty username
    pub(crate) fn effective_username(&self) -> &str {
        if self.username.is_empty() {
            "anonymous"
        } else {
            &self.username
        }
    }

    /// Socket read/write timeout
    pub(crate) fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Timeout for the completion read at data-stream close, falling back
    /// to the regular read timeout
    pub(crate) fn disconnect_timeout(&self) -> Duration {
        self.disconnect_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.read_timeout())
    }

    /// The `TYPE` argument derived from `mode` and `mode_second_type`
    pub(crate) fn type_argument(&self) -> String {
        type_argument(self.mode, self.mode_second_type)
    }
}

/// The `TYPE` argument for a transfer mode and optional second type
/// character
pub(crate) fn type_argument(mode: TransferMode, second_type: Option<char>) -> String {
    match second_type {
        Some(second) => format!("{} {}", mode.as_char(), second),
        None => mode.as_char().to_string(),
    }
}
