//! Dispatch cache: variant tag to writer index.
//!
//! Two levels:
//! - A full map holding every tag seen so far, guarded by an `RwLock` and
//!   filled lazily by registry scans.
//! - A small hot snapshot (`Arc<[HotEntry]>`) ordered by hit count, scanned
//!   linearly without taking the map lock. It is rebuilt from the full map
//!   once `rebuild_interval` dispatches have passed and at least one of them
//!   missed the snapshot.
//!
//! Resolution for a tag never changes while the cache lives: the registry
//! clears the cache whenever its writer list is mutated, and mutation
//! requires exclusive access.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use quill_config::DEFAULT_REBUILD_INTERVAL;
use quill_syntax::VariantTag;

/// Counters describing cache state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Tags present in the full map.
    pub entries: usize,
    /// Tags present in the hot snapshot.
    pub hot_entries: usize,
    /// Number of hot snapshot rebuilds.
    pub rebuilds: u64,
    /// Dispatches since the last rebuild.
    pub since_rebuild: usize,
}

#[derive(Debug)]
struct CacheEntry {
    /// Resolved writer, or `None` when no writer accepts the kind.
    writer: Option<usize>,
    hits: AtomicU64,
}

#[derive(Clone, Debug)]
struct HotEntry {
    tag: VariantTag,
    entry: Arc<CacheEntry>,
}

#[derive(Debug)]
pub(crate) struct DispatchCache {
    entries: RwLock<HashMap<VariantTag, Arc<CacheEntry>>>,
    hot: RwLock<Arc<[HotEntry]>>,
    since_rebuild: AtomicUsize,
    hot_miss: AtomicBool,
    rebuilds: AtomicU64,
    rebuild_interval: usize,
}

impl DispatchCache {
    pub(crate) fn new(rebuild_interval: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            hot: RwLock::new(Vec::new().into()),
            since_rebuild: AtomicUsize::new(0),
            hot_miss: AtomicBool::new(false),
            rebuilds: AtomicU64::new(0),
            rebuild_interval: rebuild_interval.max(1),
        }
    }

    pub(crate) fn rebuild_interval(&self) -> usize {
        self.rebuild_interval
    }

    /// Writer index for `tag`, calling `resolve` on first sight.
    ///
    /// `resolve` may run more than once when threads race on a new tag; the
    /// first insertion wins and every caller returns the stored value.
    ///
    /// # Panics
    ///
    /// Panics if a cache lock is poisoned.
    pub(crate) fn lookup(&self, tag: VariantTag, resolve: impl FnOnce() -> Option<usize>) -> Option<usize> {
        let writer = match self.lookup_hot(tag) {
            Some(writer) => writer,
            None => {
                self.hot_miss.store(true, Ordering::Relaxed);
                self.lookup_full(tag, resolve)
            }
        };
        self.tick();
        writer
    }

    fn lookup_hot(&self, tag: VariantTag) -> Option<Option<usize>> {
        let hot = Arc::clone(&self.hot.read().unwrap());
        let found = hot.iter().find(|hot| hot.tag == tag)?;
        found.entry.hits.fetch_add(1, Ordering::Relaxed);
        Some(found.entry.writer)
    }

    fn lookup_full(&self, tag: VariantTag, resolve: impl FnOnce() -> Option<usize>) -> Option<usize> {
        if let Some(entry) = self.entries.read().unwrap().get(&tag) {
            entry.hits.fetch_add(1, Ordering::Relaxed);
            return entry.writer;
        }

        let writer = resolve();
        let mut entries = self.entries.write().unwrap();
        let entry = entries.entry(tag).or_insert_with(|| {
            Arc::new(CacheEntry {
                writer,
                hits: AtomicU64::new(0),
            })
        });
        entry.hits.fetch_add(1, Ordering::Relaxed);
        entry.writer
    }

    fn tick(&self) {
        let count = self.since_rebuild.fetch_add(1, Ordering::Relaxed) + 1;
        // Only the thread that observes the crossing performs the rebuild.
        if count >= self.rebuild_interval
            && self.hot_miss.load(Ordering::Relaxed)
            && self.since_rebuild.swap(0, Ordering::AcqRel) >= self.rebuild_interval
        {
            self.hot_miss.store(false, Ordering::Relaxed);
            self.rebuild();
        }
    }

    /// Rebuild the hot snapshot from the full map, most-hit first.
    pub(crate) fn rebuild(&self) {
        let mut hot: Vec<HotEntry> = self
            .entries
            .read()
            .unwrap()
            .iter()
            .map(|(&tag, entry)| HotEntry {
                tag,
                entry: Arc::clone(entry),
            })
            .collect();
        hot.sort_by_cached_key(|hot| Reverse(hot.entry.hits.load(Ordering::Relaxed)));

        let len = hot.len();
        *self.hot.write().unwrap() = hot.into();
        let rebuilds = self.rebuilds.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(entries = len, rebuilds, "Rebuilt dispatch hot path");
    }

    /// Drop every cached resolution.
    pub(crate) fn clear(&mut self) {
        self.entries.get_mut().unwrap().clear();
        *self.hot.get_mut().unwrap() = Vec::new().into();
        *self.since_rebuild.get_mut() = 0;
        *self.hot_miss.get_mut() = false;
    }

    pub(crate) fn stats(&self) -> DispatchStats {
        DispatchStats {
            entries: self.entries.read().unwrap().len(),
            hot_entries: self.hot.read().unwrap().len(),
            rebuilds: self.rebuilds.load(Ordering::Relaxed),
            since_rebuild: self.since_rebuild.load(Ordering::Relaxed),
        }
    }

    #[cfg(test)]
    fn hot_tags(&self) -> Vec<VariantTag> {
        self.hot.read().unwrap().iter().map(|hot| hot.tag).collect()
    }
}

impl Default for DispatchCache {
    fn default() -> Self {
        Self::new(DEFAULT_REBUILD_INTERVAL)
    }
}
