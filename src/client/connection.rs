//! Control-connection establishment: resolution, TCP, and TLS activation
//!
//! Implicit TLS handshakes before the welcome banner; explicit TLS reads
//! the banner in the clear, sends `AUTH TLS`, then upgrades the stream.
//! Once activated, TLS is permanent for the channel's lifetime.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;
use tokio_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use tokio_rustls::rustls::crypto::{ring, CryptoProvider};
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use tokio_rustls::rustls::{
    self, ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme,
};
use tokio_rustls::{TlsAcceptor, TlsConnector};
use tracing::{debug, warn};

use super::io::ControlChannel;
use super::FtpClient;
use crate::commands::FtpCommand;
use crate::config::{Encryption, FtpConfig, IpVersion, TlsVersion};
use crate::error::{FtpError, Result};
use crate::response::codes;
use crate::stream::MaybeTlsStream;

/// Certificate verifier that accepts anything, for
/// `ignore_certificate_errors`
///
/// **Security Warning:** disables all certificate validation; connections
/// are open to man-in-the-middle attacks. Only for testing or trusted
/// networks.
#[derive(Debug)]
struct DangerousAcceptAnyCertificate;

impl ServerCertVerifier for DangerousAcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
            SignatureScheme::ED448,
        ]
    }
}

impl FtpClient {
    /// Open the control connection and read the welcome banner, activating
    /// TLS as configured
    pub(super) async fn connect_control(&mut self) -> Result<()> {
        let config = Arc::clone(&self.config);
        if config.host.is_empty() {
            return Err(FtpError::Config("host is required".to_string()));
        }

        let addr = resolve(&config.host, config.control_port(), config.ip_version).await?;
        debug!("connecting to FTP server {addr}");

        let tcp = timeout(config.read_timeout(), TcpStream::connect(addr))
            .await
            .map_err(|_| FtpError::Timeout)??;
        tcp.set_nodelay(true)?;
        let local_addr = tcp.local_addr()?;

        let read_timeout = config.read_timeout();
        let mut channel = match config.encryption {
            Encryption::Implicit => {
                let stream = tls_client_handshake(&config, tcp).await?;
                ControlChannel::new(stream, read_timeout)
            }
            Encryption::None | Encryption::Explicit => {
                ControlChannel::new(MaybeTlsStream::Plain(tcp), read_timeout)
            }
        };

        let welcome = channel.read_response().await?;
        if welcome.code != codes::SERVICE_READY {
            return Err(FtpError::unexpected(welcome));
        }
        debug!("server ready: {}", welcome.message);

        if config.encryption == Encryption::Explicit {
            let response = channel.send(&FtpCommand::Auth("TLS".to_string())).await?;
            if !response.is_success() {
                return Err(FtpError::unexpected(response));
            }
            let MaybeTlsStream::Plain(tcp) = channel.into_stream() else {
                return Err(FtpError::Tls("control channel already encrypted".to_string()));
            };
            let stream = tls_client_handshake(&config, tcp).await?;
            channel = ControlChannel::new(stream, read_timeout);
        }

        self.control = Some(channel);
        self.local_addr = Some(local_addr);
        Ok(())
    }
}

/// Resolve `host:port` honouring the address-family preference
pub(super) async fn resolve(host: &str, port: u16, ip_version: IpVersion) -> Result<SocketAddr> {
    let mut addrs = lookup_host((host, port)).await?;
    let selected = match ip_version {
        IpVersion::V4 => addrs.find(SocketAddr::is_ipv4),
        IpVersion::V6 => addrs.find(SocketAddr::is_ipv6),
        IpVersion::Any => addrs.next(),
    };
    selected.ok_or_else(|| FtpError::Config(format!("no suitable address for {host}")))
}

/// Upgrade a TCP stream to TLS in the client role (SNI = configured host)
pub(super) async fn tls_client_handshake(
    config: &FtpConfig,
    tcp: TcpStream,
) -> Result<MaybeTlsStream> {
    let connector = tls_connector(config)?;
    let server_name = ServerName::try_from(config.host.clone())
        .map_err(|e| FtpError::Tls(format!("invalid server name: {e}")))?;

    let stream = timeout(config.read_timeout(), connector.connect(server_name, tcp))
        .await
        .map_err(|_| FtpError::Timeout)?
        .map_err(|e| FtpError::Tls(format!("TLS handshake failed: {e}")))?;

    Ok(MaybeTlsStream::ClientTls(Box::new(stream)))
}

fn tls_connector(config: &FtpConfig) -> Result<TlsConnector> {
    let _ = CryptoProvider::install_default(ring::default_provider());

    let builder = match &config.tls_versions {
        Some(versions) => {
            ClientConfig::builder_with_protocol_versions(&protocol_versions(versions))
        }
        None => ClientConfig::builder(),
    };

    let builder = if config.ignore_certificate_errors {
        warn!("TLS certificate validation disabled - connection vulnerable to MITM attacks");
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(DangerousAcceptAnyCertificate))
    } else {
        let mut root_store = RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        builder.with_root_certificates(root_store)
    };

    let tls_config = match &config.client_certificate {
        Some(cert) => builder
            .with_client_auth_cert(cert.chain.clone(), cert.key.clone_key())
            .map_err(|e| FtpError::Tls(format!("invalid client certificate: {e}")))?,
        None => builder.with_no_client_auth(),
    };

    Ok(TlsConnector::from(Arc::new(tls_config)))
}

/// Acceptor for the server role played on active-mode data sockets under
/// explicit TLS; the first configured certificate is the server identity
pub(super) fn tls_acceptor(config: &FtpConfig) -> Result<TlsAcceptor> {
    let _ = CryptoProvider::install_default(ring::default_provider());

    let cert = config.client_certificate.as_ref().ok_or_else(|| {
        FtpError::Config("TLS on active-mode data sockets requires a client certificate".to_string())
    })?;

    let server_config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(cert.chain.clone(), cert.key.clone_key())
        .map_err(|e| FtpError::Tls(format!("invalid certificate: {e}")))?;

    Ok(TlsAcceptor::from(Arc::new(server_config)))
}

fn protocol_versions(versions: &[TlsVersion]) -> Vec<&'static rustls::SupportedProtocolVersion> {
    versions
        .iter()
        .map(|version| match version {
            TlsVersion::Tls12 => &rustls::version::TLS12,
            TlsVersion::Tls13 => &rustls::version::TLS13,
        })
        .collect()
}
