//! FEAT feature-set parsing and queries (RFC 2389)
//!
//! The FEAT reply lists one optional server capability per line. Matching
//! is a case-insensitive substring test, so `MLST type*;size*;modify*;`
//! satisfies a query for `MLST`.

use crate::response::FtpResponse;

/// The set of optional features advertised by an FTP server
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct Features {
    lines: Vec<String>,
}

impl Features {
    /// Create an empty feature set
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract the feature lines from a FEAT reply
    ///
    /// The `211-Features:` opener and the `211 End` terminal line are
    /// dropped; the indented feature lines in between are kept trimmed.
    pub fn from_feat_reply(response: &FtpResponse) -> Self {
        let lines = response
            .lines
            .iter()
            .filter(|line| !line.as_bytes().first().is_some_and(u8::is_ascii_digit))
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        Self { lines }
    }

    /// Check whether any feature line contains `feature`, ignoring case
    pub fn supports(&self, feature: &str) -> bool {
        let needle = feature.to_uppercase();
        self.lines
            .iter()
            .any(|line| line.to_uppercase().contains(&needle))
    }

    /// All advertised feature lines
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// True when the server advertised nothing (or FEAT was rejected)
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
