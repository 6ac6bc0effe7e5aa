//! Text escaping for HTML output.

use std::borrow::Cow;
use std::fmt;

/// Which characters are substituted when escaping is enabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EscapeMode {
    /// Escape `<`, `>`, `&` and `"`.
    #[default]
    Full,
    /// Escape only `<` and `&`.
    Soft,
}

impl EscapeMode {
    pub fn from_soft(soft: bool) -> Self {
        if soft { Self::Soft } else { Self::Full }
    }

    fn substitute(self, byte: u8) -> Option<&'static str> {
        match (byte, self) {
            (b'<', _) => Some("&lt;"),
            (b'&', _) => Some("&amp;"),
            (b'>', Self::Full) => Some("&gt;"),
            (b'"', Self::Full) => Some("&quot;"),
            _ => None,
        }
    }
}

/// Write `content`, substituting special characters with entities.
///
/// Runs of ordinary characters are written as single slices. With
/// `enabled == false` the content is written unchanged.
pub fn escape_text(
    out: &mut dyn fmt::Write,
    content: &str,
    mode: EscapeMode,
    enabled: bool,
) -> fmt::Result {
    if !enabled {
        return out.write_str(content);
    }

    // Special characters are all ASCII, so byte offsets are char boundaries.
    let mut start = 0;
    for (i, &byte) in content.as_bytes().iter().enumerate() {
        if let Some(entity) = mode.substitute(byte) {
            out.write_str(&content[start..i])?;
            out.write_str(entity)?;
            start = i + 1;
        }
    }
    out.write_str(&content[start..])
}

/// Escape raw bytes, replacing invalid UTF-8 with U+FFFD first.
pub fn escape_text_lossy(
    out: &mut dyn fmt::Write,
    content: &[u8],
    mode: EscapeMode,
    enabled: bool,
) -> fmt::Result {
    let text = String::from_utf8_lossy(content);
    if matches!(text, Cow::Owned(_)) {
        tracing::debug!(len = content.len(), "Replaced invalid UTF-8 before escaping");
    }
    escape_text(out, &text, mode, enabled)
}

/// Escape into a new string.
pub fn escape_to_string(content: &str, mode: EscapeMode) -> String {
    let mut out = String::with_capacity(content.len());
    // Writing to a String cannot fail.
    let _ = escape_text(&mut out, content, mode, true);
    out
}
