//! Tree renderer.
//!
//! [`Renderer`] walks a [`SyntaxTree`], dispatching each node to the first
//! registered writer that accepts its kind. Writers call back into the
//! renderer to emit output and to recurse into children.
//!
//! # Architecture
//!
//! The renderer borrows two things for its lifetime `'r`:
//! - the output sink (`&mut dyn fmt::Write`)
//! - the [`ObjectRendererRegistry`], shared with any other renderers
//!
//! Everything that changes during a render (nesting depth, position flags,
//! the last character written) lives on the renderer itself. The registry
//! and its writers are read-only while rendering, which is what lets one
//! registry serve many renderers on many threads.
//!
//! # Example
//!
//! ```
//! use quill_config::RendererOptions;
//! use quill_renderer::{Renderer, html};
//! use quill_syntax::{TreeBuilder, kinds};
//!
//! let mut builder = TreeBuilder::new();
//! let doc = builder.add_root(&kinds::DOCUMENT).unwrap();
//! let para = builder.add_child(doc, &kinds::PARAGRAPH).unwrap();
//! builder.add_text(para, &kinds::TEXT, "1 < 2").unwrap();
//! let tree = builder.build();
//!
//! let options = RendererOptions::default();
//! let registry = html::registry(&options);
//! let mut out = String::new();
//! Renderer::builder(&registry)
//!     .with_options(options)
//!     .build(&mut out)
//!     .unwrap()
//!     .render(&tree)
//!     .unwrap();
//! assert_eq!(out, "<p>1 &lt; 2</p>\n");
//! ```

use std::fmt::{self, Write as _};
use std::sync::Arc;

use quill_config::RendererOptions;
use quill_syntax::{NodeRef, SyntaxTree};

use crate::error::RenderError;
use crate::escape::{self, EscapeMode};
use crate::format::OutputFormat;
use crate::registry::ObjectRendererRegistry;
use crate::url_escape::{LinkRewriter, UrlEscaper};

/// Callback run before or after every node is written.
pub type WriteObserver<F> = dyn for<'a, 'r, 't> Fn(&'a mut Renderer<'r, F>, NodeRef<'t>) -> Result<(), RenderError>
    + Send
    + Sync;

/// How a renderer resolves writers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// Through the registry's shared dispatch cache.
    #[default]
    Cached,
    /// Linear registry scan on every node.
    Uncached,
}

/// Output sink that remembers the last character written.
struct Sink<'r> {
    inner: &'r mut dyn fmt::Write,
    last: Option<char>,
}

impl fmt::Write for Sink<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if let Some(last) = s.chars().next_back() {
            self.inner.write_str(s)?;
            self.last = Some(last);
        }
        Ok(())
    }
}

struct Observers<F: OutputFormat> {
    before: Option<Arc<WriteObserver<F>>>,
    after: Option<Arc<WriteObserver<F>>>,
}

impl<F: OutputFormat> Default for Observers<F> {
    fn default() -> Self {
        Self {
            before: None,
            after: None,
        }
    }
}

/// Builder for [`Renderer`].
pub struct RendererBuilder<'r, F: OutputFormat> {
    registry: &'r ObjectRendererRegistry<F>,
    options: RendererOptions,
    rewriter: Option<Arc<LinkRewriter>>,
    observers: Observers<F>,
    dispatch: DispatchMode,
}

impl<'r, F: OutputFormat> RendererBuilder<'r, F> {
    /// Replace the options (validated in [`build`](Self::build)).
    #[must_use]
    pub fn with_options(mut self, options: RendererOptions) -> Self {
        self.options = options;
        self
    }

    /// Map every URL after base resolution and before escaping.
    #[must_use]
    pub fn with_link_rewriter(mut self, rewriter: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.rewriter = Some(Arc::new(rewriter));
        self
    }

    /// Run `observer` before each node is dispatched.
    #[must_use]
    pub fn with_before_write<W>(mut self, observer: W) -> Self
    where
        W: for<'a, 'b, 't> Fn(&'a mut Renderer<'b, F>, NodeRef<'t>) -> Result<(), RenderError>
            + Send
            + Sync
            + 'static,
    {
        self.observers.before = Some(Arc::new(observer));
        self
    }

    /// Run `observer` after each node has been written.
    #[must_use]
    pub fn with_after_write<W>(mut self, observer: W) -> Self
    where
        W: for<'a, 'b, 't> Fn(&'a mut Renderer<'b, F>, NodeRef<'t>) -> Result<(), RenderError>
            + Send
            + Sync
            + 'static,
    {
        self.observers.after = Some(Arc::new(observer));
        self
    }

    #[must_use]
    pub fn with_dispatch_mode(mut self, mode: DispatchMode) -> Self {
        self.dispatch = mode;
        self
    }

    /// Create a renderer writing to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Options`] if the options fail validation.
    pub fn build(self, out: &'r mut dyn fmt::Write) -> Result<Renderer<'r, F>, RenderError> {
        self.options.validate()?;
        let urls = UrlEscaper::new()
            .with_base_url(self.options.parsed_base_url()?)
            .with_rewriter(self.rewriter)
            .with_non_ascii_no_escape(self.options.use_non_ascii_no_escape);

        Ok(Renderer {
            sink: Sink {
                inner: out,
                last: None,
            },
            registry: self.registry,
            observers: self.observers,
            urls,
            escape_mode: EscapeMode::from_soft(self.options.soft_escape_mode),
            enable_escape: self.options.enable_escape,
            implicit_paragraph: self.options.implicit_paragraph,
            dispatch: self.dispatch,
            max_depth: self.options.max_depth,
            depth: 0,
            first_in_container: true,
            last_in_container: true,
        })
    }
}

/// Renders nodes into an output sink.
pub struct Renderer<'r, F: OutputFormat> {
    sink: Sink<'r>,
    registry: &'r ObjectRendererRegistry<F>,
    observers: Observers<F>,
    urls: UrlEscaper,
    escape_mode: EscapeMode,
    enable_escape: bool,
    implicit_paragraph: bool,
    dispatch: DispatchMode,
    max_depth: usize,
    depth: usize,
    first_in_container: bool,
    last_in_container: bool,
}

impl<'r, F: OutputFormat> Renderer<'r, F> {
    pub fn builder(registry: &'r ObjectRendererRegistry<F>) -> RendererBuilder<'r, F> {
        RendererBuilder {
            registry,
            options: RendererOptions::default(),
            rewriter: None,
            observers: Observers::default(),
            dispatch: DispatchMode::default(),
        }
    }

    /// Renderer with default options.
    pub fn new(
        registry: &'r ObjectRendererRegistry<F>,
        out: &'r mut dyn fmt::Write,
    ) -> Result<Self, RenderError> {
        Self::builder(registry).build(out)
    }

    /// Render a whole tree, starting at its root.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::MissingArgument`] if the tree has no root, or
    /// any error raised while writing.
    pub fn render(&mut self, tree: &SyntaxTree) -> Result<(), RenderError> {
        let root = tree.root().ok_or(RenderError::MissingArgument("tree root"))?;
        tracing::trace!(format = F::NAME, nodes = tree.len(), "Rendering tree");
        self.write(root)
    }

    /// Dispatch one node. Does nothing for `None`.
    ///
    /// The first writer accepting the node's kind renders it. With no
    /// matching writer, a container's children are written in order and a
    /// leaf produces no output.
    pub fn write<'t>(&mut self, node: impl Into<Option<NodeRef<'t>>>) -> Result<(), RenderError> {
        let Some(node) = node.into() else {
            return Ok(());
        };

        if let Some(before) = self.observers.before.as_ref().map(Arc::clone) {
            before(self, node)?;
        }

        let registry = self.registry;
        let index = match self.dispatch {
            DispatchMode::Cached => registry.dispatch(node.kind()),
            DispatchMode::Uncached => registry.resolve(node.kind()),
        };
        match index.and_then(|index| registry.get(index)) {
            Some(writer) => writer.render(self, node)?,
            None if node.is_container() => self.write_children(node)?,
            None => {}
        }

        if let Some(after) = self.observers.after.as_ref().map(Arc::clone) {
            after(self, node)?;
        }
        Ok(())
    }

    /// Write each child of `container` in order.
    ///
    /// While a child is written, [`is_first_in_container`] and
    /// [`is_last_in_container`] describe its position. Both flags are
    /// restored afterwards, so a writer can consult them after recursing.
    ///
    /// [`is_first_in_container`]: Self::is_first_in_container
    /// [`is_last_in_container`]: Self::is_last_in_container
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NotAContainer`] for a leaf and
    /// [`RenderError::StructureTooDeep`] if entering `container` would
    /// exceed the nesting limit.
    pub fn write_children(&mut self, container: NodeRef<'_>) -> Result<(), RenderError> {
        if container.is_leaf() {
            return Err(RenderError::NotAContainer {
                kind: container.kind().name(),
            });
        }
        if self.depth >= self.max_depth {
            tracing::warn!(
                depth = self.depth + 1,
                max = self.max_depth,
                kind = container.kind().name(),
                "Nesting limit exceeded, aborting render"
            );
            return Err(RenderError::StructureTooDeep {
                depth: self.depth + 1,
                max: self.max_depth,
            });
        }

        let saved = (self.first_in_container, self.last_in_container);
        self.depth += 1;
        let result = self.write_child_list(container);
        self.depth -= 1;
        (self.first_in_container, self.last_in_container) = saved;
        result
    }

    fn write_child_list(&mut self, container: NodeRef<'_>) -> Result<(), RenderError> {
        let mut children = container.children().peekable();
        let mut first = true;
        while let Some(child) = children.next() {
            self.first_in_container = first;
            self.last_in_container = children.peek().is_none();
            first = false;
            self.write(child)?;
        }
        Ok(())
    }

    pub fn write_str(&mut self, s: &str) -> Result<(), RenderError> {
        self.sink.write_str(s)?;
        Ok(())
    }

    pub fn write_char(&mut self, c: char) -> Result<(), RenderError> {
        self.sink.write_char(c)?;
        Ok(())
    }

    /// Support for `write!(renderer, ...)`.
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), RenderError> {
        self.sink.write_fmt(args)?;
        Ok(())
    }

    /// Write `s` followed by a newline.
    pub fn write_line(&mut self, s: &str) -> Result<(), RenderError> {
        self.write_str(s)?;
        self.write_char('\n')
    }

    /// Start a new line unless output is empty or already ends with one.
    pub fn ensure_line(&mut self) -> Result<(), RenderError> {
        match self.sink.last {
            Some(last) if last != '\n' => self.write_char('\n'),
            _ => Ok(()),
        }
    }

    /// Write text, escaping per the configured mode.
    pub fn write_escaped(&mut self, text: &str) -> Result<(), RenderError> {
        escape::escape_text(&mut self.sink, text, self.escape_mode, self.enable_escape)?;
        Ok(())
    }

    /// Write bytes as text, replacing invalid UTF-8 before escaping.
    pub fn write_escaped_bytes(&mut self, bytes: &[u8]) -> Result<(), RenderError> {
        escape::escape_text_lossy(&mut self.sink, bytes, self.escape_mode, self.enable_escape)?;
        Ok(())
    }

    /// Write a URL: base-resolved, rewritten and escaped.
    pub fn write_escaped_url(&mut self, url: &str) -> Result<(), RenderError> {
        self.urls.escape(&mut self.sink, url)?;
        Ok(())
    }

    /// Write a UTF-16 encoded URL.
    pub fn write_escaped_url_utf16(&mut self, url: &[u16]) -> Result<(), RenderError> {
        self.urls.escape_utf16(&mut self.sink, url)?;
        Ok(())
    }

    /// Write a leaf's raw content, escaped.
    pub fn write_leaf_content(&mut self, node: NodeRef<'_>) -> Result<(), RenderError> {
        self.write_escaped(node.content())
    }

    /// Write a node's attributes as ` id=".." class=".." key=".."`.
    ///
    /// Values are always escaped in full mode so they stay inside their
    /// quotes.
    pub fn write_attributes(&mut self, node: NodeRef<'_>) -> Result<(), RenderError> {
        let Some(attributes) = node.attributes() else {
            return Ok(());
        };

        if let Some(id) = attributes.id() {
            self.write_str(" id=\"")?;
            self.write_escaped_attribute(id)?;
            self.write_char('"')?;
        }
        if !attributes.classes().is_empty() {
            self.write_str(" class=\"")?;
            for (i, class) in attributes.classes().iter().enumerate() {
                if i > 0 {
                    self.write_char(' ')?;
                }
                self.write_escaped_attribute(class)?;
            }
            self.write_char('"')?;
        }
        for (key, value) in attributes.properties() {
            if !is_attribute_name(key) {
                tracing::debug!(key, "Skipping invalid attribute name");
                continue;
            }
            self.write_char(' ')?;
            self.write_str(key)?;
            self.write_str("=\"")?;
            self.write_escaped_attribute(value)?;
            self.write_char('"')?;
        }
        Ok(())
    }

    /// Write text inside a double-quoted attribute value.
    ///
    /// Always escapes in full mode, whatever the configured mode, so the
    /// value cannot close its quotes.
    pub fn write_escaped_attribute(&mut self, value: &str) -> Result<(), RenderError> {
        escape::escape_text(&mut self.sink, value, EscapeMode::Full, self.enable_escape)?;
        Ok(())
    }

    /// Registry this renderer dispatches through.
    pub fn registry(&self) -> &'r ObjectRendererRegistry<F> {
        self.registry
    }

    /// Current container nesting depth (0 at the root).
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Whether the node being written is the first child of its container.
    pub fn is_first_in_container(&self) -> bool {
        self.first_in_container
    }

    /// Whether the node being written is the last child of its container.
    pub fn is_last_in_container(&self) -> bool {
        self.last_in_container
    }

    pub fn escape_mode(&self) -> EscapeMode {
        self.escape_mode
    }

    pub fn is_escape_enabled(&self) -> bool {
        self.enable_escape
    }

    /// Whether block separators are implied between consecutive paragraphs.
    pub fn implicit_paragraph(&self) -> bool {
        self.implicit_paragraph
    }

    pub fn dispatch_mode(&self) -> DispatchMode {
        self.dispatch
    }

    pub fn url_escaper(&self) -> &UrlEscaper {
        &self.urls
    }
}

/// Attribute names may not be empty and may not contain whitespace, quotes,
/// `<`, `>`, `/` or `=`.
fn is_attribute_name(key: &str) -> bool {
    !key.is_empty()
        && !key
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '>' | '/' | '=' | '<'))
}

/// Render `tree` to a new string.
///
/// # Errors
///
/// Returns any error from building the renderer or writing the tree.
pub fn render_to_string<F: OutputFormat>(
    registry: &ObjectRendererRegistry<F>,
    options: &RendererOptions,
    tree: &SyntaxTree,
) -> Result<String, RenderError> {
    let mut out = String::new();
    Renderer::builder(registry)
        .with_options(options.clone())
        .build(&mut out)?
        .render(tree)?;
    Ok(out)
}
