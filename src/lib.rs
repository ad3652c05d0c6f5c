#![doc = include_str!("../README.md")]

mod client;
/// FTP command envelopes and wire serialisation
pub mod commands;
mod config;
mod error;
mod features;
/// Directory-listing line parsers (Unix, DOS, MLSD)
pub mod listing;
mod response;
mod stream;

pub use client::{DataStream, Encoding, FtpClient, ListingStrategy};
pub use commands::FtpCommand;
pub use config::{
    ClientCertificate, Encryption, FtpConfig, IpVersion, TlsVersion, TransferMode,
};
pub use error::{FtpError, Result};
pub use features::Features;
pub use listing::{NodeInformation, NodeKind};
pub use response::{codes, parse_terminal_line, FtpResponse};
