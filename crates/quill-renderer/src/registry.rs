//! Ordered writer registry with a shared dispatch cache.

use std::fmt;

use quill_syntax::NodeKind;

use crate::cache::{DispatchCache, DispatchStats};
use crate::family::Family;
use crate::format::OutputFormat;
use crate::writer::ObjectWriter;

/// Ordered list of writers for one output format.
///
/// Registration order is priority order: for any kind, the first writer
/// whose family accepts it wins. Resolutions are memoized in a dispatch
/// cache that every renderer borrowing this registry shares, so a registry
/// is typically built once, wrapped in an `Arc`, and borrowed by renderers
/// on many threads. Mutation requires `&mut self` and clears the cache.
pub struct ObjectRendererRegistry<F: OutputFormat> {
    writers: Vec<Box<dyn ObjectWriter<F>>>,
    cache: DispatchCache,
}

impl<F: OutputFormat> ObjectRendererRegistry<F> {
    /// Create an empty registry with the default rebuild interval.
    #[must_use]
    pub fn new() -> Self {
        Self {
            writers: Vec::new(),
            cache: DispatchCache::default(),
        }
    }

    /// Set the number of dispatches between hot-path rebuilds.
    #[must_use]
    pub fn with_rebuild_interval(mut self, interval: usize) -> Self {
        self.cache = DispatchCache::new(interval);
        self
    }

    /// Append a writer (lowest priority so far).
    pub fn push(&mut self, writer: impl ObjectWriter<F> + 'static) -> &mut Self {
        self.push_boxed(Box::new(writer))
    }

    /// Append an already boxed writer.
    pub fn push_boxed(&mut self, writer: Box<dyn ObjectWriter<F>>) -> &mut Self {
        self.writers.push(writer);
        self.cache.clear();
        self
    }

    /// Insert a writer at `index`, shifting later writers down in priority.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, writer: impl ObjectWriter<F> + 'static) -> &mut Self {
        self.writers.insert(index, Box::new(writer));
        self.cache.clear();
        self
    }

    /// Append `writer` unless a writer with the same family is registered.
    ///
    /// Returns whether the writer was added.
    pub fn push_if_absent(&mut self, writer: impl ObjectWriter<F> + 'static) -> bool {
        if self.position_exact(writer.family()).is_some() {
            return false;
        }
        self.push(writer);
        true
    }

    /// Remove the first writer whose family equals `family`.
    pub fn remove(&mut self, family: Family) -> Option<Box<dyn ObjectWriter<F>>> {
        let index = self.position_exact(family)?;
        self.cache.clear();
        Some(self.writers.remove(index))
    }

    /// Writer registered for exactly `family`.
    ///
    /// Unlike dispatch, this does not consider broader families.
    pub fn find_exact(&self, family: Family) -> Option<&dyn ObjectWriter<F>> {
        self.position_exact(family).map(|index| &*self.writers[index])
    }

    /// Mutable variant of [`find_exact`](Self::find_exact), used by
    /// extensions to add interceptors to an existing writer.
    pub fn find_exact_mut(&mut self, family: Family) -> Option<&mut (dyn ObjectWriter<F> + 'static)> {
        let index = self.position_exact(family)?;
        Some(&mut *self.writers[index])
    }

    /// Writer at `index` in priority order.
    pub fn get(&self, index: usize) -> Option<&dyn ObjectWriter<F>> {
        self.writers.get(index).map(|writer| &**writer)
    }

    pub fn len(&self) -> usize {
        self.writers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }

    /// Writers in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn ObjectWriter<F>> {
        self.writers.iter().map(|writer| &**writer)
    }

    /// Index of the first writer accepting `kind`, by linear scan.
    pub fn resolve(&self, kind: &NodeKind) -> Option<usize> {
        let index = self.writers.iter().position(|writer| writer.accept(kind));
        tracing::trace!(
            format = F::NAME,
            kind = kind.name(),
            tag = %kind.tag(),
            writer = ?index,
            "Resolved writer by registry scan"
        );
        index
    }

    /// Index of the writer for `kind`, through the dispatch cache.
    pub fn dispatch(&self, kind: &NodeKind) -> Option<usize> {
        self.cache.lookup(kind.tag(), || self.resolve(kind))
    }

    /// Rebuild the hot dispatch path now instead of waiting for the interval.
    pub fn rebuild_dispatch_cache(&self) {
        self.cache.rebuild();
    }

    pub fn rebuild_interval(&self) -> usize {
        self.cache.rebuild_interval()
    }

    pub fn dispatch_stats(&self) -> DispatchStats {
        self.cache.stats()
    }

    fn position_exact(&self, family: Family) -> Option<usize> {
        self.writers
            .iter()
            .position(|writer| writer.family() == family)
    }
}

impl<F: OutputFormat> Default for ObjectRendererRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: OutputFormat> fmt::Debug for ObjectRendererRegistry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRendererRegistry")
            .field("format", &F::NAME)
            .field(
                "writers",
                &self.writers.iter().map(|w| w.family()).collect::<Vec<_>>(),
            )
            .field("cache", &self.cache.stats())
            .finish()
    }
}
