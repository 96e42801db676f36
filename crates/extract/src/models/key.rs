use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use crate::consts::LINK_MARKER;
use crate::error::{Error, ErrorKind};

/// One downloadable WinBox build.
///
/// The set is closed: the service only ever redirects to these five
/// platforms, and every lookup table below is an exhaustive `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKey {
    /// WinBox 4, Windows installer.
    Winbox4Windows,
    /// WinBox 4, macOS disk image.
    Winbox4Mac,
    /// WinBox 4, Linux archive.
    Winbox4Linux,
    /// WinBox 3, 64-bit Windows executable.
    Winbox3Windows,
    /// WinBox 3, 32-bit Windows executable.
    Winbox3Windows32,
}
impl ResourceKey {
    /// All keys, in the order they are presented to users.
    pub const ALL: [ResourceKey; 5] = [
        Self::Winbox4Windows,
        Self::Winbox4Mac,
        Self::Winbox4Linux,
        Self::Winbox3Windows,
        Self::Winbox3Windows32,
    ];

    /// Returns the stable identifier of the key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Winbox4Windows => "winbox4_windows",
            Self::Winbox4Mac => "winbox4_mac",
            Self::Winbox4Linux => "winbox4_linux",
            Self::Winbox3Windows => "winbox3_windows",
            Self::Winbox3Windows32 => "winbox3_windows_32",
        }
    }

    /// Returns the path of the redirect route serving this key.
    pub fn route(&self) -> &'static str {
        match self {
            Self::Winbox4Windows => "/winbox4/windows",
            Self::Winbox4Mac => "/winbox4/mac",
            Self::Winbox4Linux => "/winbox4/linux",
            Self::Winbox3Windows => "/winbox3/windows",
            Self::Winbox3Windows32 => "/winbox3/windows32",
        }
    }

    /// Returns the human-readable name of the build.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Winbox4Windows => "Winbox 4 (Windows)",
            Self::Winbox4Mac => "Winbox 4 (Mac)",
            Self::Winbox4Linux => "Winbox 4 (Linux)",
            Self::Winbox3Windows => "Winbox 3 x64 (Windows)",
            Self::Winbox3Windows32 => "Winbox 3 32-bit (Windows)",
        }
    }

    /// Classifies a link target, returning the key it downloads (if any).
    ///
    /// Matching is done on the lower-cased target. The rules are tried in
    /// order and the first match wins; the filename markers differ per
    /// platform so at most one rule applies to a real download link.
    pub fn from_link(href: &str) -> Option<Self> {
        let link = href.to_lowercase();
        if !link.contains(LINK_MARKER) {
            return None;
        }
        if link.contains("winbox_windows") {
            Some(Self::Winbox4Windows)
        } else if link.contains(".dmg") {
            Some(Self::Winbox4Mac)
        } else if link.contains("winbox_linux") {
            Some(Self::Winbox4Linux)
        } else if link.contains("winbox64") && link.contains(".exe") {
            Some(Self::Winbox3Windows)
        } else if link.contains("winbox.exe") {
            Some(Self::Winbox3Windows32)
        } else {
            None
        }
    }
}
impl FromStr for ResourceKey {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::from(ErrorKind::UnknownResource(s.to_string())))
    }
}
impl Display for ResourceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
