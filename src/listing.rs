//! Directory-listing line parsers
//!
//! Three wire formats are understood: Unix `ls -l` style lines, DOS/IIS
//! style lines, and MLSD machine-readable facts (RFC 3659 section 7).
//! The Unix and DOS parsers each expose a cheap `matches` probe used to
//! detect the format from the first line of a LIST reply.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Kind of a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
    Symlink,
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInformation {
    /// Entry name, embedded spaces preserved
    pub name: String,
    /// Size in bytes; zero when the listing does not carry one
    pub size: u64,
    /// Modification time, when the listing carries a parseable one
    pub modified: Option<DateTime<Utc>>,
    /// Entry kind
    pub kind: NodeKind,
    /// The unparsed source line
    pub raw: String,
}

/// Unix `ls -l` style listing lines
///
/// `-rw-r--r--  1 owner group  1234 Jan  5 12:30 name with spaces`
pub mod unix {
    use super::*;

    /// Probe: Unix lines start with the entry-type character
    pub fn matches(line: &str) -> bool {
        matches!(line.as_bytes().first(), Some(b'-') | Some(b'd') | Some(b'l'))
    }

    /// Parse one line; `None` when the line does not fit the format
    pub fn parse(line: &str) -> Option<NodeInformation> {
        let kind = match line.as_bytes().first()? {
            b'-' => NodeKind::File,
            b'd' => NodeKind::Directory,
            b'l' => NodeKind::Symlink,
            _ => return None,
        };

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 9 {
            return None;
        }
        let size: u64 = tokens[4].parse().ok()?;
        let modified = parse_timestamp(tokens[5], tokens[6], tokens[7]);

        // the name is everything after the eighth token, spaces intact
        let name = remainder_after_tokens(line, 8)?;
        if name.is_empty() {
            return None;
        }

        Some(NodeInformation {
            name: name.to_string(),
            size,
            modified,
            kind,
            raw: line.to_string(),
        })
    }

    /// `Jan  5 12:30` (current year) or `Jan  5 2023`
    fn parse_timestamp(month: &str, day: &str, time_or_year: &str) -> Option<DateTime<Utc>> {
        let month = month_number(month)?;
        let day: u32 = day.parse().ok()?;

        let (year, time) = if let Some((hour, minute)) = time_or_year.split_once(':') {
            let hour: u32 = hour.parse().ok()?;
            let minute: u32 = minute.parse().ok()?;
            (Utc::now().year(), NaiveTime::from_hms_opt(hour, minute, 0)?)
        } else {
            let year: i32 = time_or_year.parse().ok()?;
            (year, NaiveTime::from_hms_opt(0, 0, 0)?)
        };

        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        Some(date.and_time(time).and_utc())
    }

    fn month_number(name: &str) -> Option<u32> {
        let month = match name.to_ascii_lowercase().as_str() {
            "jan" => 1,
            "feb" => 2,
            "mar" => 3,
            "apr" => 4,
            "may" => 5,
            "jun" => 6,
            "jul" => 7,
            "aug" => 8,
            "sep" => 9,
            "oct" => 10,
            "nov" => 11,
            "dec" => 12,
            _ => return None,
        };
        Some(month)
    }
}

/// DOS/IIS style listing lines
///
/// `01-23-24  02:15PM       <DIR>  subdir` /
/// `01-23-24  02:15PM         1234 report.txt`
pub mod dos {
    use super::*;

    /// Probe: DOS lines open with an `MM-DD-YY` stamp
    pub fn matches(line: &str) -> bool {
        let b = line.as_bytes();
        b.len() >= 8
            && b[0].is_ascii_digit()
            && b[1].is_ascii_digit()
            && b[2] == b'-'
            && b[3].is_ascii_digit()
            && b[4].is_ascii_digit()
            && b[5] == b'-'
            && b[6].is_ascii_digit()
            && b[7].is_ascii_digit()
    }

    /// Parse one line; `None` when the line does not fit the format
    pub fn parse(line: &str) -> Option<NodeInformation> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 4 {
            return None;
        }

        let (kind, size) = if tokens[2].eq_ignore_ascii_case("<DIR>") {
            (NodeKind::Directory, 0)
        } else {
            (NodeKind::File, tokens[2].parse().ok()?)
        };

        let stamp = format!("{} {}", tokens[0], tokens[1]);
        let modified = NaiveDateTime::parse_from_str(&stamp, "%m-%d-%y %I:%M%p")
            .ok()
            .map(|dt| dt.and_utc());

        let name = remainder_after_tokens(line, 3)?;
        if name.is_empty() {
            return None;
        }

        Some(NodeInformation {
            name: name.to_string(),
            size,
            modified,
            kind,
            raw: line.to_string(),
        })
    }
}

/// Parse one MLSD fact line: `key=value;...;key=value SP name`
///
/// Recognised facts are `type`, `size` and `modify`. `cdir` and `pdir`
/// entries describe the listed directory itself and yield `None`.
pub fn parse_mlsd_line(line: &str) -> Option<NodeInformation> {
    let (facts, name) = line.trim_start().split_once(' ')?;
    if name.is_empty() {
        return None;
    }

    let mut kind = NodeKind::File;
    let mut size = 0u64;
    let mut modified = None;

    for fact in facts.split(';') {
        if fact.is_empty() {
            continue;
        }
        let (key, value) = fact.split_once('=')?;
        match key.to_lowercase().as_str() {
            "type" => {
                kind = match value.to_lowercase().as_str() {
                    "file" => NodeKind::File,
                    "dir" => NodeKind::Directory,
                    "os.unix=symlink" => NodeKind::Symlink,
                    // the listed directory and its parent are not entries
                    "cdir" | "pdir" => return None,
                    _ => return None,
                };
            }
            "size" => size = value.parse().ok()?,
            "modify" => {
                modified = NaiveDateTime::parse_from_str(value, "%Y%m%d%H%M%S")
                    .ok()
                    .map(|dt| dt.and_utc());
            }
            _ => {}
        }
    }

    Some(NodeInformation {
        name: name.to_string(),
        size,
        modified,
        kind,
        raw: line.to_string(),
    })
}

/// Detected LIST output format, probed from the first non-empty line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListFormat {
    Unix,
    Dos,
}

impl ListFormat {
    pub(crate) fn detect(sample: &str) -> Option<Self> {
        if unix::matches(sample) {
            Some(ListFormat::Unix)
        } else if dos::matches(sample) {
            Some(ListFormat::Dos)
        } else {
            None
        }
    }

    pub(crate) fn parse(self, line: &str) -> Option<NodeInformation> {
        match self {
            ListFormat::Unix => unix::parse(line),
            ListFormat::Dos => dos::parse(line),
        }
    }
}

/// Byte offset of the text following the first `count` whitespace-separated
/// tokens, with the separating whitespace skipped.
fn remainder_after_tokens(line: &str, count: usize) -> Option<&str> {
    let mut rest = line;
    for _ in 0..count {
        rest = rest.trim_start();
        let end = rest.find(char::is_whitespace)?;
        rest = &rest[end..];
    }
    Some(rest.trim_start())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_unix_matches() {
        assert!(unix::matches("-rw-r--r-- 1 u g 3 Jan 1 12:00 a.txt"));
        assert!(unix::matches("drwxr-xr-x 2 u g 4096 Jan 1 2023 sub"));
        assert!(unix::matches("lrwxrwxrwx 1 u g 9 Jan 1 12:00 link"));
        assert!(!unix::matches("01-23-24  02:15PM  1234 a.txt"));
        assert!(!unix::matches("total 8"));
        assert!(!unix::matches(""));
    }

    #[test]
    fn test_unix_parse_file() {
        let line = "-rw-r--r--  1 ftp ftp  1234 Jun  5 2023 report.pdf";
        let node = unix::parse(line).unwrap();
        assert_eq!(node.name, "report.pdf");
        assert_eq!(node.size, 1234);
        assert_eq!(node.kind, NodeKind::File);
        assert_eq!(node.raw, line);

        let modified = node.modified.unwrap();
        assert_eq!(modified.year(), 2023);
        assert_eq!(modified.month(), 6);
        assert_eq!(modified.day(), 5);
    }

    #[test]
    fn test_unix_parse_recent_file_uses_current_year() {
        let node = unix::parse("-rw-r--r-- 1 ftp ftp 99 Mar 14 09:26 pi.txt").unwrap();
        let modified = node.modified.unwrap();
        assert_eq!(modified.year(), Utc::now().year());
        assert_eq!(modified.hour(), 9);
        assert_eq!(modified.minute(), 26);
    }

    #[test]
    fn test_unix_parse_name_with_spaces() {
        let node =
            unix::parse("-rw-r--r-- 1 owner group 42 Jan  5 12:30 name with spaces.txt").unwrap();
        assert_eq!(node.name, "name with spaces.txt");
    }

    #[test]
    fn test_unix_parse_directory_and_symlink() {
        let dir = unix::parse("drwxr-xr-x 2 ftp ftp 4096 Jan 1 2024 pub").unwrap();
        assert_eq!(dir.kind, NodeKind::Directory);

        let link = unix::parse("lrwxrwxrwx 1 ftp ftp 9 Jan 1 2024 current -> v2").unwrap();
        assert_eq!(link.kind, NodeKind::Symlink);
    }

    #[test]
    fn test_unix_parse_rejects_short_lines() {
        assert!(unix::parse("-rw-r--r-- 1 ftp ftp").is_none());
        assert!(unix::parse("drwx").is_none());
    }

    #[test]
    fn test_unix_round_trip() {
        let line = "-rw-r--r--  1 ftp ftp  1234 Jun  5 2023 report.pdf";
        let node = unix::parse(line).unwrap();
        assert_eq!(unix::parse(&node.raw).unwrap(), node);
    }

    #[test]
    fn test_dos_matches() {
        assert!(dos::matches("01-23-24  02:15PM       <DIR>  sub"));
        assert!(dos::matches("12-01-99  11:59PM  1024 old.txt"));
        assert!(!dos::matches("-rw-r--r-- 1 u g 3 Jan 1 12:00 a.txt"));
        assert!(!dos::matches("0123"));
    }

    #[test]
    fn test_dos_parse_file() {
        let node = dos::parse("01-23-24  02:15PM              1234 report.txt").unwrap();
        assert_eq!(node.name, "report.txt");
        assert_eq!(node.size, 1234);
        assert_eq!(node.kind, NodeKind::File);

        let modified = node.modified.unwrap();
        assert_eq!(modified.year(), 2024);
        assert_eq!(modified.month(), 1);
        assert_eq!(modified.day(), 23);
        assert_eq!(modified.hour(), 14);
        assert_eq!(modified.minute(), 15);
    }

    #[test]
    fn test_dos_parse_directory() {
        let node = dos::parse("01-23-24  02:15PM       <DIR>          my folder").unwrap();
        assert_eq!(node.name, "my folder");
        assert_eq!(node.size, 0);
        assert_eq!(node.kind, NodeKind::Directory);
    }

    #[test]
    fn test_mlsd_parse_file() {
        let node = parse_mlsd_line("type=file;size=3;modify=20240101120000; a.txt").unwrap();
        assert_eq!(node.name, "a.txt");
        assert_eq!(node.size, 3);
        assert_eq!(node.kind, NodeKind::File);

        let modified = node.modified.unwrap();
        assert_eq!(modified.year(), 2024);
        assert_eq!(modified.month(), 1);
        assert_eq!(modified.day(), 1);
        assert_eq!(modified.hour(), 12);
    }

    #[test]
    fn test_mlsd_parse_dir_and_symlink() {
        let node = parse_mlsd_line("type=dir;modify=20240101120001; sub").unwrap();
        assert_eq!(node.kind, NodeKind::Directory);
        assert_eq!(node.size, 0);

        let node = parse_mlsd_line("type=OS.unix=symlink;size=9; link").unwrap();
        assert_eq!(node.kind, NodeKind::Symlink);
    }

    #[test]
    fn test_mlsd_skips_cdir_and_pdir() {
        assert!(parse_mlsd_line("type=cdir;modify=20210525083610; /pub").is_none());
        assert!(parse_mlsd_line("type=pdir;modify=20210525083610; /").is_none());
    }

    #[test]
    fn test_mlsd_rejects_malformed() {
        assert!(parse_mlsd_line("no-facts-here").is_none());
        assert!(parse_mlsd_line("type=file;badfact a.txt").is_none());
    }

    #[test]
    fn test_list_format_detection() {
        assert_eq!(
            ListFormat::detect("-rw-r--r-- 1 u g 3 Jan 1 12:00 a.txt"),
            Some(ListFormat::Unix)
        );
        assert_eq!(
            ListFormat::detect("01-23-24  02:15PM  1234 a.txt"),
            Some(ListFormat::Dos)
        );
        assert_eq!(ListFormat::detect("total 8"), None);
    }
}
