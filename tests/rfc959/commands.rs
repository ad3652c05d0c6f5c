//! RFC 959 Section 4.1 - FTP Commands
//!
//! Command lines are `VERB` or `VERB SP argument`; the CRLF terminator is
//! appended by the control channel.

use ftp_rs::FtpCommand;

#[test]
fn test_access_control_commands() {
    assert_eq!(
        FtpCommand::User("alice".to_string()).to_string(),
        "USER alice"
    );
    assert_eq!(FtpCommand::Pass("pw".to_string()).to_string(), "PASS pw");
    assert_eq!(FtpCommand::Cwd("/pub".to_string()).to_string(), "CWD /pub");
    assert_eq!(FtpCommand::Quit.to_string(), "QUIT");
}

#[test]
fn test_transfer_parameter_commands() {
    assert_eq!(FtpCommand::Type("I".to_string()).to_string(), "TYPE I");
    assert_eq!(FtpCommand::Pasv.to_string(), "PASV");
    assert_eq!(FtpCommand::Epsv.to_string(), "EPSV");
    assert_eq!(
        FtpCommand::Port("10,0,0,2,19,136".to_string()).to_string(),
        "PORT 10,0,0,2,19,136"
    );
}

#[test]
fn test_service_commands() {
    assert_eq!(
        FtpCommand::Retr("a.txt".to_string()).to_string(),
        "RETR a.txt"
    );
    assert_eq!(
        FtpCommand::Stor("b.bin".to_string()).to_string(),
        "STOR b.bin"
    );
    assert_eq!(FtpCommand::Dele("old".to_string()).to_string(), "DELE old");
    assert_eq!(FtpCommand::Mkd("new".to_string()).to_string(), "MKD new");
    assert_eq!(FtpCommand::Rmd("gone".to_string()).to_string(), "RMD gone");
    assert_eq!(FtpCommand::Rnfr("a".to_string()).to_string(), "RNFR a");
    assert_eq!(FtpCommand::Rnto("b".to_string()).to_string(), "RNTO b");
    assert_eq!(FtpCommand::Pwd.to_string(), "PWD");
    assert_eq!(FtpCommand::List.to_string(), "LIST");
}

#[test]
fn test_extension_commands() {
    assert_eq!(FtpCommand::Feat.to_string(), "FEAT");
    assert_eq!(FtpCommand::Mlsd.to_string(), "MLSD");
    assert_eq!(
        FtpCommand::Size("a.txt".to_string()).to_string(),
        "SIZE a.txt"
    );
    assert_eq!(
        FtpCommand::Auth("TLS".to_string()).to_string(),
        "AUTH TLS"
    );
    assert_eq!(FtpCommand::Pbsz("0".to_string()).to_string(), "PBSZ 0");
    assert_eq!(FtpCommand::Prot("P".to_string()).to_string(), "PROT P");
    assert_eq!(
        FtpCommand::Opts("UTF8 ON".to_string()).to_string(),
        "OPTS UTF8 ON"
    );
    assert_eq!(
        FtpCommand::Clnt("ftp-rs".to_string()).to_string(),
        "CLNT ftp-rs"
    );
}

#[test]
fn test_password_never_logged() {
    let cmd = FtpCommand::Pass("hunter2".to_string());
    assert!(!cmd.redacted().contains("hunter2"));
    assert_eq!(cmd.redacted(), "PASS ****");
}
