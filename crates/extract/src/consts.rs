use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

// Every anchor carrying a link target; empty targets are filtered afterwards.
selector!(ANCHOR_SELECTOR, "a[href]");

/// Case-insensitive guard: links without this marker are never classified.
pub(crate) const LINK_MARKER: &str = "winbox";

/// Index of the version segment when a download URL is split on `/`.
///
/// `https://mikrotik.com/routeros/winbox/4.0.1/winbox_windows64.exe`
/// splits into `["https:", "", "mikrotik.com", "routeros", "winbox", "4.0.1", …]`.
pub(crate) const VERSION_SEGMENT: usize = 5;
