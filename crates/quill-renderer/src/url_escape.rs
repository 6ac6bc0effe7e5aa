//! URL preparation and escaping for `href`/`src` attributes.
//!
//! A URL goes through three steps:
//! 1. Relative URLs are resolved against the configured base URL.
//! 2. The link rewriter, if any, maps the result.
//! 3. The result is escaped: a non-ASCII domain is converted to its ASCII
//!    (IDNA) form, unsafe ASCII characters are percent-encoded or turned into
//!    entities, and other non-ASCII characters are percent-encoded as UTF-8
//!    unless `non_ascii_no_escape` is set.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use percent_encoding::percent_encode_byte;
use url::{Host, Url};

/// Function applied to every URL after base resolution.
pub type LinkRewriter = dyn Fn(&str) -> String + Send + Sync;

#[derive(Clone, Copy)]
enum UrlChar {
    Safe,
    Percent,
    Entity(&'static str),
}

const URL_CHARS: [UrlChar; 128] = url_char_table();

const fn url_char_table() -> [UrlChar; 128] {
    let mut table = [UrlChar::Safe; 128];
    let mut i = 0;
    while i < 0x20 {
        table[i] = UrlChar::Percent;
        i += 1;
    }
    table[0x7F] = UrlChar::Percent;

    let unsafe_chars = b" \"<>\\[]^`{|}";
    let mut j = 0;
    while j < unsafe_chars.len() {
        table[unsafe_chars[j] as usize] = UrlChar::Percent;
        j += 1;
    }

    table[b'&' as usize] = UrlChar::Entity("&amp;");
    table[b'\'' as usize] = UrlChar::Entity("&#39;");
    table
}

/// Escapes URLs for output inside a double-quoted attribute.
#[derive(Clone, Default)]
pub struct UrlEscaper {
    base_url: Option<Url>,
    rewriter: Option<Arc<LinkRewriter>>,
    non_ascii_no_escape: bool,
}

impl UrlEscaper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative URLs against `base`.
    #[must_use]
    pub fn with_base_url(mut self, base: Option<Url>) -> Self {
        self.base_url = base;
        self
    }

    /// Map every URL through `rewriter` before escaping.
    #[must_use]
    pub fn with_rewriter(mut self, rewriter: Option<Arc<LinkRewriter>>) -> Self {
        self.rewriter = rewriter;
        self
    }

    /// Leave non-ASCII characters outside the domain unencoded.
    #[must_use]
    pub fn with_non_ascii_no_escape(mut self, enabled: bool) -> Self {
        self.non_ascii_no_escape = enabled;
        self
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Apply base resolution and the rewriter, without escaping.
    pub fn prepare<'a>(&self, url: &'a str) -> Cow<'a, str> {
        let mut prepared = Cow::Borrowed(url);
        if let Some(base) = &self.base_url
            && is_relative(url)
        {
            match base.join(url) {
                Ok(joined) => prepared = Cow::Owned(joined.into()),
                Err(e) => tracing::debug!(url, error = %e, "Could not resolve URL against base"),
            }
        }
        if let Some(rewriter) = &self.rewriter {
            prepared = Cow::Owned(rewriter(prepared.as_ref()));
        }
        prepared
    }

    /// Prepare and escape `url` into `out`.
    pub fn escape(&self, out: &mut dyn fmt::Write, url: &str) -> fmt::Result {
        let prepared = self.prepare(url);
        escape_url(out, &prepared, self.non_ascii_no_escape)
    }

    /// Prepare and escape a UTF-16 encoded URL.
    ///
    /// Unpaired surrogates are replaced with U+FFFD.
    pub fn escape_utf16(&self, out: &mut dyn fmt::Write, url: &[u16]) -> fmt::Result {
        let decoded: String = char::decode_utf16(url.iter().copied())
            .map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
        self.escape(out, &decoded)
    }
}

impl fmt::Debug for UrlEscaper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlEscaper")
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("rewriter", &self.rewriter.is_some())
            .field("non_ascii_no_escape", &self.non_ascii_no_escape)
            .finish()
    }
}

fn is_relative(url: &str) -> bool {
    matches!(Url::parse(url), Err(url::ParseError::RelativeUrlWithoutBase))
}

/// Escape an already prepared URL.
pub fn escape_url(out: &mut dyn fmt::Write, url: &str, non_ascii_no_escape: bool) -> fmt::Result {
    let mut rest = url;

    if let Some((domain_start, domain_end)) = domain_span(url) {
        let domain = &url[domain_start..domain_end];
        if !domain.is_ascii()
            && let Some(ascii) = to_ascii_domain(domain)
        {
            escape_run(out, &url[..domain_start], non_ascii_no_escape)?;
            escape_run(out, &ascii, non_ascii_no_escape)?;
            rest = &url[domain_end..];
        }
    }

    escape_run(out, rest, non_ascii_no_escape)
}

/// Byte range of the domain in `scheme://domain/...`.
fn domain_span(url: &str) -> Option<(usize, usize)> {
    let scheme_end = url.find("://")?;
    let scheme = &url[..scheme_end];
    if scheme.is_empty()
        || !scheme
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
    {
        return None;
    }
    let start = scheme_end + 3;
    let end = url[start..]
        .find(['/', '?', '#', ':'])
        .map_or(url.len(), |offset| start + offset);
    Some((start, end))
}

/// IDNA conversion of a domain, or `None` if it is not a valid domain.
fn to_ascii_domain(domain: &str) -> Option<String> {
    match Host::parse(domain) {
        Ok(Host::Domain(ascii)) => Some(ascii),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(domain, error = %e, "IDNA conversion failed, escaping domain as-is");
            None
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn escape_run(out: &mut dyn fmt::Write, text: &str, non_ascii_no_escape: bool) -> fmt::Result {
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        if ch.is_ascii() {
            let substitute = match URL_CHARS[ch as usize] {
                UrlChar::Safe => continue,
                UrlChar::Percent => percent_encode_byte(ch as u8),
                UrlChar::Entity(entity) => entity,
            };
            out.write_str(&text[start..i])?;
            out.write_str(substitute)?;
        } else if non_ascii_no_escape {
            continue;
        } else {
            out.write_str(&text[start..i])?;
            let mut buf = [0u8; 4];
            for &byte in ch.encode_utf8(&mut buf).as_bytes() {
                out.write_str(percent_encode_byte(byte))?;
            }
        }
        start = i + ch.len_utf8();
    }
    out.write_str(&text[start..])
}
