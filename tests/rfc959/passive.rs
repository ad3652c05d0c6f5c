//! RFC 959 Section 4.2 - Passive-mode reply parsing
//!
//! A 227 reply carries `(h1,h2,h3,h4,p1,p2)` where the data port is
//! `p1 * 256 + p2`.

use std::net::Ipv4Addr;

use ftp_rs::FtpResponse;

fn reply_227(message: &str) -> FtpResponse {
    FtpResponse {
        code: 227,
        message: message.to_string(),
        lines: vec![format!("227 {message}")],
    }
}

#[test]
fn test_pasv_port_arithmetic() {
    let rsp = reply_227("Entering Passive Mode (10,0,0,1,19,136)");
    let (ip, port) = rsp.passive_endpoint().unwrap();
    assert_eq!(ip, Ipv4Addr::new(10, 0, 0, 1));
    assert_eq!(port, 5000);
}

#[test]
fn test_pasv_port_extremes() {
    let (_, port) = reply_227("(0,0,0,0,0,0)").passive_endpoint().unwrap();
    assert_eq!(port, 0);

    let (_, port) = reply_227("(255,255,255,255,255,255)")
        .passive_endpoint()
        .unwrap();
    assert_eq!(port, 65535);
}

#[test]
fn test_pasv_tolerates_surrounding_text() {
    let rsp = reply_227("Entering Passive Mode (192,168,1,20,78,52).");
    let (ip, port) = rsp.passive_endpoint().unwrap();
    assert_eq!(ip, Ipv4Addr::new(192, 168, 1, 20));
    assert_eq!(port, 78 * 256 + 52);
}

#[test]
fn test_pasv_rejects_malformed_tuples() {
    assert!(reply_227("Entering Passive Mode").passive_endpoint().is_none());
    assert!(reply_227("(1,2,3,4,5)").passive_endpoint().is_none());
    assert!(reply_227("(1,2,3,4,5,6,7)").passive_endpoint().is_none());
    assert!(reply_227("(a,b,c,d,e,f)").passive_endpoint().is_none());
    assert!(reply_227("(300,0,0,1,19,136)").passive_endpoint().is_none());
}
