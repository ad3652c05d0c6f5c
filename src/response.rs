//! FTP response types and reply codes

use std::net::Ipv4Addr;

use crate::error::{FtpError, Result};

/// FTP server response
///
/// Carries the three-digit reply code and message of the terminal line, plus
/// every line of the reply in the order received (multi-line replies keep
/// their `DDD-` continuation lines verbatim, with CR/LF stripped).
#[derive(Debug, Clone)]
pub struct FtpResponse {
    /// 3-digit FTP reply code from the terminal line
    pub code: u16,
    /// Message text of the terminal line
    pub message: String,
    /// All received lines, terminal line included
    pub lines: Vec<String>,
}

impl FtpResponse {
    /// Check if the reply indicates success (2xx or 3xx)
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.code)
    }

    /// Check if the reply is a positive preliminary reply (1xx)
    pub fn is_preliminary(&self) -> bool {
        (100..200).contains(&self.code)
    }

    /// Check if the reply indicates an error (4xx or 5xx)
    pub fn is_error(&self) -> bool {
        self.code >= 400
    }

    /// Extract the passive-mode endpoint from a `227 Entering Passive Mode
    /// (h1,h2,h3,h4,p1,p2)` reply. The port is `p1 * 256 + p2`.
    pub fn passive_endpoint(&self) -> Option<(Ipv4Addr, u16)> {
        let inner = parenthesized(&self.message)?;
        let fields: Vec<&str> = inner.split(',').collect();
        if fields.len() != 6 {
            return None;
        }
        let mut octets = [0u8; 6];
        for (i, field) in fields.iter().enumerate() {
            octets[i] = field.trim().parse().ok()?;
        }
        let ip = Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]);
        let port = u16::from(octets[4]) * 256 + u16::from(octets[5]);
        Some((ip, port))
    }

    /// Extract the port from a `229 Entering Extended Passive Mode (|||port|)`
    /// reply (RFC 2428 section 3).
    pub fn extended_passive_port(&self) -> Option<u16> {
        let inner = parenthesized(&self.message)?;
        let rest = inner.strip_prefix("|||")?;
        let digits = rest.strip_suffix('|')?;
        if digits.is_empty() {
            return None;
        }
        digits.parse().ok()
    }

    /// Extract the directory from a `257 "/path" ...` reply: the substring
    /// between the first pair of double quotes.
    pub fn quoted_directory(&self) -> Option<String> {
        let start = self.message.find('"')?;
        let rest = &self.message[start + 1..];
        let end = rest.find('"')?;
        Some(rest[..end].to_string())
    }
}

fn parenthesized(message: &str) -> Option<&str> {
    let start = message.find('(')?;
    let rest = &message[start + 1..];
    let end = rest.find(')')?;
    Some(&rest[..end])
}

/// Parse a reply line into code and message if it is a terminal line
/// (`DDD SP message`, or a bare `DDD`). Continuation lines (`DDD-...` or
/// free-form text) return `None`.
pub fn parse_terminal_line(line: &str) -> Option<(u16, String)> {
    let bytes = line.as_bytes();
    if bytes.len() < 3
        || !bytes[0].is_ascii_digit()
        || !bytes[1].is_ascii_digit()
        || !bytes[2].is_ascii_digit()
    {
        return None;
    }
    let code = u16::from(bytes[0] - b'0') * 100
        + u16::from(bytes[1] - b'0') * 10
        + u16::from(bytes[2] - b'0');
    match bytes.get(3) {
        None => Some((code, String::new())),
        Some(b' ') => Some((code, line[4..].to_string())),
        Some(_) => None,
    }
}

/// Validate a reply code read off the wire
pub(crate) fn check_reply_code(code: u16, line: &str) -> Result<u16> {
    if (100..600).contains(&code) {
        Ok(code)
    } else {
        Err(FtpError::InvalidResponse(line.chars().take(100).collect()))
    }
}

/// FTP reply codes (RFC 959, RFC 2228, RFC 2428)
#[allow(dead_code)]
pub mod codes {
    /// Data connection already open; transfer starting
    pub const DATA_ALREADY_OPEN: u16 = 125;
    /// File status okay; about to open data connection
    pub const OPENING_DATA: u16 = 150;
    /// Command okay
    pub const COMMAND_OK: u16 = 200;
    /// System status, or system help reply
    pub const SYSTEM_STATUS: u16 = 211;
    /// File status (SIZE reply)
    pub const FILE_STATUS: u16 = 213;
    /// Help message
    pub const SYSTEM_HELP_REPLY: u16 = 214;
    /// Service ready for new user (welcome banner)
    pub const SERVICE_READY: u16 = 220;
    /// Service closing control connection
    pub const CLOSING_CONTROL: u16 = 221;
    /// Closing data connection; transfer successful
    pub const CLOSING_DATA: u16 = 226;
    /// Entering Passive Mode (h1,h2,h3,h4,p1,p2)
    pub const ENTERING_PASSIVE: u16 = 227;
    /// Entering Extended Passive Mode (|||port|)
    pub const ENTERING_EXTENDED_PASSIVE: u16 = 229;
    /// User logged in, proceed
    pub const LOGGED_IN: u16 = 230;
    /// Security data exchange complete (AUTH TLS accepted, RFC 2228)
    pub const AUTH_PROCEED: u16 = 234;
    /// Requested file action okay, completed
    pub const FILE_ACTION_OK: u16 = 250;
    /// "PATHNAME" created (also PWD reply)
    pub const PATHNAME_CREATED: u16 = 257;
    /// User name okay, need password
    pub const SEND_PASSWORD: u16 = 331;
    /// Need account for login
    pub const SEND_ACCOUNT: u16 = 332;
    /// Requested file action pending further information (RNFR)
    pub const FILE_COMMAND_PENDING: u16 = 350;
    /// Service not available, closing control connection
    pub const SERVICE_NOT_AVAILABLE: u16 = 421;
    /// Requested file action not taken; file busy
    pub const FILE_BUSY: u16 = 450;
    /// Syntax error, command unrecognized
    pub const COMMAND_SYNTAX_ERROR: u16 = 500;
    /// Command not implemented
    pub const COMMAND_NOT_IMPLEMENTED: u16 = 502;
    /// Not logged in
    pub const NOT_LOGGED_IN: u16 = 530;
    /// Requested action not taken; file unavailable
    pub const ACTION_NOT_TAKEN: u16 = 550;
    /// Requested action not taken; file name not allowed
    pub const FILE_NAME_NOT_ALLOWED: u16 = 553;
}
