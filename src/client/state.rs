//! Session state types for the FTP client

/// Control-channel text encoding
///
/// Sessions start in ASCII and are promoted to UTF-8 when the server
/// advertises the `UTF8` feature at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Ascii,
    Utf8,
}

/// Directory-listing strategy, chosen once per login from the FEAT set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingStrategy {
    /// Machine-readable listings (RFC 3659 MLSD)
    Mlsd,
    /// Plain LIST output, format-probed per listing (Unix or DOS style)
    #[default]
    List,
}

/// Filter applied to a directory listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ListFilter {
    All,
    Files,
    Directories,
}
