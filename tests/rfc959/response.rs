//! RFC 959 Section 4.2 - FTP Replies
//!
//! A reply is one or more lines; the last line is `DDD SP text`, and
//! multi-line replies open with `DDD-`. Success for this client means a
//! code in the 2xx or 3xx classes.

use ftp_rs::{parse_terminal_line, FtpResponse};

fn response(code: u16, message: &str, lines: &[&str]) -> FtpResponse {
    FtpResponse {
        code,
        message: message.to_string(),
        lines: lines.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn test_terminal_line_is_code_space_text() {
    let (code, message) = parse_terminal_line("230 Login successful").unwrap();
    assert_eq!(code, 230);
    assert_eq!(message, "Login successful");
}

#[test]
fn test_continuation_line_is_not_terminal() {
    // RFC 959 §4.2: intermediate lines of a multi-line reply use "DDD-"
    assert!(parse_terminal_line("211-Features:").is_none());
    assert!(parse_terminal_line("211-").is_none());
}

#[test]
fn test_free_form_data_line_is_not_terminal() {
    assert!(parse_terminal_line(" UTF8").is_none());
    assert!(parse_terminal_line("Features:").is_none());
    assert!(parse_terminal_line("").is_none());
}

#[test]
fn test_multi_line_reply_shape() {
    // a 211-…/211 pair is one response carrying every line
    let rsp = response(
        211,
        "end",
        &["211-status begin", " line one", " line two", "211 end"],
    );
    assert_eq!(rsp.lines.len(), 4);
    assert_eq!(rsp.lines.first().unwrap(), "211-status begin");
    assert_eq!(rsp.lines.last().unwrap(), "211 end");
    assert_eq!(rsp.message, "end");
}

#[test]
fn test_success_is_2xx_and_3xx() {
    assert!(response(200, "ok", &[]).is_success());
    assert!(response(230, "logged in", &[]).is_success());
    assert!(response(350, "pending", &[]).is_success());

    assert!(!response(150, "opening", &[]).is_success());
    assert!(!response(421, "unavailable", &[]).is_success());
    assert!(!response(530, "not logged in", &[]).is_success());
    assert!(!response(550, "no such file", &[]).is_success());
}

#[test]
fn test_preliminary_replies() {
    assert!(response(125, "already open", &[]).is_preliminary());
    assert!(response(150, "opening", &[]).is_preliminary());
    assert!(!response(226, "closing", &[]).is_preliminary());
}

#[test]
fn test_pwd_reply_quoted_directory() {
    // RFC 959 §4.2: 257 replies quote the created/current pathname
    let rsp = response(257, "\"/a/b\" is the current directory", &[]);
    assert_eq!(rsp.quoted_directory().as_deref(), Some("/a/b"));

    let rsp = response(257, "\"\" created", &[]);
    assert_eq!(rsp.quoted_directory().as_deref(), Some(""));

    let rsp = response(257, "created without quotes", &[]);
    assert!(rsp.quoted_directory().is_none());
}

#[test]
fn test_reply_code_constants() {
    use ftp_rs::codes;

    assert_eq!(codes::DATA_ALREADY_OPEN, 125);
    assert_eq!(codes::OPENING_DATA, 150);
    assert_eq!(codes::SERVICE_READY, 220);
    assert_eq!(codes::CLOSING_DATA, 226);
    assert_eq!(codes::ENTERING_PASSIVE, 227);
    assert_eq!(codes::ENTERING_EXTENDED_PASSIVE, 229);
    assert_eq!(codes::LOGGED_IN, 230);
    assert_eq!(codes::FILE_ACTION_OK, 250);
    assert_eq!(codes::PATHNAME_CREATED, 257);
    assert_eq!(codes::SEND_PASSWORD, 331);
    assert_eq!(codes::FILE_COMMAND_PENDING, 350);
    assert_eq!(codes::ACTION_NOT_TAKEN, 550);
}
