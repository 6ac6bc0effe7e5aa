//! Output format markers.
//!
//! A registry and its writers are parameterized by a format marker, so an
//! HTML writer can never be registered with a plain-text renderer.

/// Marker trait for an output format.
pub trait OutputFormat: Send + Sync + 'static {
    /// Short name used in log output.
    const NAME: &'static str;
}

/// HTML output.
#[derive(Clone, Copy, Debug, Default)]
pub struct Html;

impl OutputFormat for Html {
    const NAME: &'static str = "html";
}

/// Plain-text output.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainText;

impl OutputFormat for PlainText {
    const NAME: &'static str = "text";
}
