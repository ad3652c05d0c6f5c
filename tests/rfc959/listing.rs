//! LIST output parsing: Unix `ls -l` style and DOS/IIS style lines

use chrono::{Datelike, Timelike};
use ftp_rs::listing::{dos, unix};
use ftp_rs::NodeKind;

#[test]
fn test_unix_format_detection() {
    assert!(unix::matches("-rw-r--r-- 1 ftp ftp 42 Jan 1 12:00 a"));
    assert!(unix::matches("drwxr-xr-x 2 ftp ftp 4096 Jan 1 2024 d"));
    assert!(unix::matches("lrwxrwxrwx 1 ftp ftp 9 Jan 1 2024 l"));
    assert!(!unix::matches("total 16"));
    assert!(!unix::matches("01-23-24  02:15PM  1234 a.txt"));
}

#[test]
fn test_unix_file_fields() {
    let node = unix::parse("-rw-r--r--  1 owner group  52428800 Feb 14 2023 archive.tar.gz")
        .unwrap();
    assert_eq!(node.kind, NodeKind::File);
    assert_eq!(node.size, 52_428_800);
    assert_eq!(node.name, "archive.tar.gz");

    let modified = node.modified.unwrap();
    assert_eq!(modified.year(), 2023);
    assert_eq!(modified.month(), 2);
    assert_eq!(modified.day(), 14);
}

#[test]
fn test_unix_name_preserves_embedded_spaces() {
    let node = unix::parse("-rw-r--r-- 1 o g 1 Jan 1 2024 Annual Report (final).docx").unwrap();
    assert_eq!(node.name, "Annual Report (final).docx");
}

#[test]
fn test_unix_round_trip() {
    // parsing a node's raw line yields the node again
    let line = "drwxr-xr-x  4 ftp ftp  4096 Nov 30 2022 public html";
    let node = unix::parse(line).unwrap();
    assert_eq!(node.raw, line);
    assert_eq!(unix::parse(&node.raw).unwrap(), node);
}

#[test]
fn test_dos_format_detection() {
    assert!(dos::matches("01-23-24  02:15PM       <DIR>          www"));
    assert!(dos::matches("12-31-99  11:59PM             1024 y2k.txt"));
    assert!(!dos::matches("-rw-r--r-- 1 ftp ftp 42 Jan 1 12:00 a"));
}

#[test]
fn test_dos_file_and_directory_fields() {
    let file = dos::parse("01-23-24  02:15PM             1234 report.txt").unwrap();
    assert_eq!(file.kind, NodeKind::File);
    assert_eq!(file.size, 1234);
    assert_eq!(file.name, "report.txt");

    let stamp = file.modified.unwrap();
    assert_eq!(stamp.year(), 2024);
    assert_eq!(stamp.hour(), 14);
    assert_eq!(stamp.minute(), 15);

    let dir = dos::parse("01-23-24  09:00AM       <DIR>          Shared Documents").unwrap();
    assert_eq!(dir.kind, NodeKind::Directory);
    assert_eq!(dir.size, 0);
    assert_eq!(dir.name, "Shared Documents");
}
