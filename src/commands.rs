//! FTP command envelopes and their wire serialisation

use std::fmt;

/// An FTP command to be sent on the control channel
///
/// `Display` produces the command line without the trailing CRLF; the
/// control channel appends it. `Raw` is the escape hatch for verbs this
/// enum does not model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FtpCommand {
    User(String),
    Pass(String),
    /// AUTH mechanism, e.g. `AUTH TLS`
    Auth(String),
    /// Protection buffer size, e.g. `PBSZ 0`
    Pbsz(String),
    /// Data channel protection level, e.g. `PROT P`
    Prot(String),
    Feat,
    Pwd,
    Cwd(String),
    Mkd(String),
    Rmd(String),
    Dele(String),
    Rnfr(String),
    Rnto(String),
    Size(String),
    /// Transfer type, e.g. `TYPE I` or `TYPE A N`
    Type(String),
    Pasv,
    Epsv,
    /// Active-mode endpoint, `PORT a1,a2,a3,a4,p1,p2`
    Port(String),
    Mlsd,
    List,
    Retr(String),
    Stor(String),
    Quit,
    Clnt(String),
    Opts(String),
    /// Pre-serialised command line, sent as-is
    Raw(String),
}

impl FtpCommand {
    /// Command line with sensitive arguments masked, for logging
    pub fn redacted(&self) -> String {
        match self {
            FtpCommand::Pass(_) => "PASS ****".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for FtpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FtpCommand::User(name) => write!(f, "USER {name}"),
            FtpCommand::Pass(password) => write!(f, "PASS {password}"),
            FtpCommand::Auth(mechanism) => write!(f, "AUTH {mechanism}"),
            FtpCommand::Pbsz(size) => write!(f, "PBSZ {size}"),
            FtpCommand::Prot(level) => write!(f, "PROT {level}"),
            FtpCommand::Feat => f.write_str("FEAT"),
            FtpCommand::Pwd => f.write_str("PWD"),
            FtpCommand::Cwd(dir) => write!(f, "CWD {dir}"),
            FtpCommand::Mkd(dir) => write!(f, "MKD {dir}"),
            FtpCommand::Rmd(dir) => write!(f, "RMD {dir}"),
            FtpCommand::Dele(name) => write!(f, "DELE {name}"),
            FtpCommand::Rnfr(from) => write!(f, "RNFR {from}"),
            FtpCommand::Rnto(to) => write!(f, "RNTO {to}"),
            FtpCommand::Size(name) => write!(f, "SIZE {name}"),
            FtpCommand::Type(mode) => write!(f, "TYPE {mode}"),
            FtpCommand::Pasv => f.write_str("PASV"),
            FtpCommand::Epsv => f.write_str("EPSV"),
            FtpCommand::Port(endpoint) => write!(f, "PORT {endpoint}"),
            FtpCommand::Mlsd => f.write_str("MLSD"),
            FtpCommand::List => f.write_str("LIST"),
            FtpCommand::Retr(name) => write!(f, "RETR {name}"),
            FtpCommand::Stor(name) => write!(f, "STOR {name}"),
            FtpCommand::Quit => f.write_str("QUIT"),
            FtpCommand::Clnt(name) => write!(f, "CLNT {name}"),
            FtpCommand::Opts(option) => write!(f, "OPTS {option}"),
            FtpCommand::Raw(line) => f.write_str(line),
        }
    }
}
