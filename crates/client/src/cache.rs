//! Session-scoped in-memory book cache.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

use lru::LruCache;

use lectern_core::BookPayload;
use lectern_core::canon;

/// In-memory cache of parsed books for the current session.
///
/// Capacity equals the canon size, so within a single translation it never
/// actually evicts; the bound exists to make the memory ceiling explicit.
/// Owned by the loader context, so a translation switch (a new loader)
/// starts from an empty cache.
pub struct BookCache {
    inner: Mutex<LruCache<String, Arc<BookPayload>>>,
}

impl BookCache {
    pub fn new() -> Self {
        let capacity = NonZeroUsize::new(canon::book_count()).unwrap_or(NonZeroUsize::MIN);
        Self { inner: Mutex::new(LruCache::new(capacity)) }
    }

    pub fn get(&self, book_key: &str) -> Option<Arc<BookPayload>> {
        self.lock().get(book_key).cloned()
    }

    pub fn set(&self, book_key: String, payload: Arc<BookPayload>) {
        self.lock().put(book_key, payload);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, Arc<BookPayload>>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for BookCache {
    fn default() -> Self {
        Self::new()
    }
}
