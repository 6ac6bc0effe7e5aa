//! Object writers and their try-writer chains.
//!
//! An [`ObjectWriter`] renders every node of its [`Family`]. Before its own
//! body runs, the writer offers the node to its [`TryWriterChain`]: an
//! ordered list of interceptors, the first of which to claim the node
//! replaces the default body for that node.

use std::borrow::Cow;
use std::fmt;

use quill_syntax::{NodeKind, NodeRef};

use crate::error::RenderError;
use crate::family::Family;
use crate::format::OutputFormat;
use crate::renderer::Renderer;

/// Body of a writer.
pub type WriteFn<F> = dyn for<'a, 'r, 't> Fn(&'a mut Renderer<'r, F>, NodeRef<'t>) -> Result<(), RenderError>
    + Send
    + Sync;

/// Interceptor in a try-writer chain. Returns `true` when it handled the node.
pub type TryWriteFn<F> = dyn for<'a, 'r, 't> Fn(&'a mut Renderer<'r, F>, NodeRef<'t>) -> Result<bool, RenderError>
    + Send
    + Sync;

/// Renders nodes of one family.
///
/// Writers are shared across threads once registered, so implementations
/// must not rely on per-render mutable state. Anything that changes during a
/// render belongs on the [`Renderer`].
pub trait ObjectWriter<F: OutputFormat>: Send + Sync {
    /// Family of node kinds this writer handles.
    fn family(&self) -> Family;

    /// Interceptors consulted before [`write`](Self::write).
    fn try_writers(&self) -> &TryWriterChain<F>;

    /// Mutable access for extensions adding interceptors.
    fn try_writers_mut(&mut self) -> &mut TryWriterChain<F>;

    /// Default body for a node this writer accepts.
    fn write(&self, renderer: &mut Renderer<'_, F>, node: NodeRef<'_>) -> Result<(), RenderError>;

    /// Whether this writer handles `kind`.
    fn accept(&self, kind: &NodeKind) -> bool {
        self.family().accepts(kind)
    }

    /// Run the try-writer chain, falling back to the default body.
    fn render(&self, renderer: &mut Renderer<'_, F>, node: NodeRef<'_>) -> Result<(), RenderError> {
        if self.try_writers().try_write(renderer, node)? {
            return Ok(());
        }
        self.write(renderer, node)
    }
}

struct TryWriter<F: OutputFormat> {
    name: Cow<'static, str>,
    func: Box<TryWriteFn<F>>,
}

/// Ordered, named list of interceptors.
///
/// Names identify entries so extensions can remove or reorder each other's
/// interceptors. Pushing a name that already exists moves it to the end.
pub struct TryWriterChain<F: OutputFormat> {
    entries: Vec<TryWriter<F>>,
}

impl<F: OutputFormat> TryWriterChain<F> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an interceptor, replacing any entry with the same name.
    pub fn push<W>(&mut self, name: impl Into<Cow<'static, str>>, func: W) -> &mut Self
    where
        W: for<'a, 'r, 't> Fn(&'a mut Renderer<'r, F>, NodeRef<'t>) -> Result<bool, RenderError>
            + Send
            + Sync
            + 'static,
    {
        let name = name.into();
        self.remove(&name);
        self.entries.push(TryWriter {
            name,
            func: Box::new(func),
        });
        self
    }

    /// Remove the named interceptor. Returns whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Move the named interceptor to the end of the chain.
    pub fn move_to_end(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(index) => {
                let entry = self.entries.remove(index);
                self.entries.push(entry);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Interceptor names in evaluation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Offer `node` to each interceptor in order.
    ///
    /// Stops at the first one that returns `true`; later interceptors are
    /// not consulted.
    pub fn try_write(
        &self,
        renderer: &mut Renderer<'_, F>,
        node: NodeRef<'_>,
    ) -> Result<bool, RenderError> {
        for entry in &self.entries {
            if (entry.func)(renderer, node)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.name == name)
    }
}

impl<F: OutputFormat> Default for TryWriterChain<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: OutputFormat> fmt::Debug for TryWriterChain<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Writer whose body is a function or closure.
///
/// All built-in writers are `FnWriter`s:
///
/// ```
/// use quill_renderer::{Family, FnWriter, Html};
/// use quill_syntax::kinds;
///
/// let writer = FnWriter::<Html>::new(Family::of(&kinds::THEMATIC_BREAK), |r, _node| {
///     r.ensure_line()?;
///     r.write_line("<hr />")
/// });
/// # drop(writer);
/// ```
pub struct FnWriter<F: OutputFormat> {
    family: Family,
    body: Box<WriteFn<F>>,
    try_writers: TryWriterChain<F>,
}

impl<F: OutputFormat> FnWriter<F> {
    pub fn new<W>(family: Family, body: W) -> Self
    where
        W: for<'a, 'r, 't> Fn(&'a mut Renderer<'r, F>, NodeRef<'t>) -> Result<(), RenderError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            family,
            body: Box::new(body),
            try_writers: TryWriterChain::new(),
        }
    }

    /// Add an interceptor (builder style).
    #[must_use]
    pub fn with_try_writer<W>(mut self, name: impl Into<Cow<'static, str>>, func: W) -> Self
    where
        W: for<'a, 'r, 't> Fn(&'a mut Renderer<'r, F>, NodeRef<'t>) -> Result<bool, RenderError>
            + Send
            + Sync
            + 'static,
    {
        self.try_writers.push(name, func);
        self
    }
}

impl<F: OutputFormat> ObjectWriter<F> for FnWriter<F> {
    fn family(&self) -> Family {
        self.family
    }

    fn try_writers(&self) -> &TryWriterChain<F> {
        &self.try_writers
    }

    fn try_writers_mut(&mut self) -> &mut TryWriterChain<F> {
        &mut self.try_writers
    }

    fn write(&self, renderer: &mut Renderer<'_, F>, node: NodeRef<'_>) -> Result<(), RenderError> {
        (self.body)(renderer, node)
    }
}

impl<F: OutputFormat> fmt::Debug for FnWriter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnWriter")
            .field("family", &self.family)
            .field("try_writers", &self.try_writers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::format::PlainText;

    fn never(_: &mut Renderer<'_, PlainText>, _: NodeRef<'_>) -> Result<bool, RenderError> {
        Ok(false)
    }

    fn chain(names: &[&'static str]) -> TryWriterChain<PlainText> {
        let mut chain = TryWriterChain::new();
        for name in names {
            chain.push(*name, never);
        }
        chain
    }

    fn names(chain: &TryWriterChain<PlainText>) -> Vec<&str> {
        chain.names().collect()
    }

    #[test]
    fn test_push_keeps_order() {
        let chain = chain(&["a", "b", "c"]);
        assert_eq!(names(&chain), vec!["a", "b", "c"]);
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_push_existing_name_moves_to_end() {
        let mut chain = chain(&["a", "b", "c"]);
        chain.push("a", never);
        assert_eq!(names(&chain), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_remove() {
        let mut chain = chain(&["a", "b"]);
        assert!(chain.remove("a"));
        assert!(!chain.remove("a"));
        assert!(!chain.contains("a"));
        assert_eq!(names(&chain), vec!["b"]);
    }

    #[test]
    fn test_move_to_end() {
        let mut chain = chain(&["a", "b", "c"]);
        assert!(chain.move_to_end("b"));
        assert!(!chain.move_to_end("missing"));
        assert_eq!(names(&chain), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_debug_lists_names() {
        let chain = chain(&["math"]);
        assert_eq!(format!("{chain:?}"), r#"["math"]"#);
    }
}
