//! The single path by which chapter data enters the system.
//!
//! `load_book` reconciles three sources in order: the in-memory book cache,
//! the network content file, and (when the network fails) the persistent
//! store's copy of chapter 1. Everything fetched is written through to the
//! persistent store one chapter at a time, best effort.
//!
//! A loader is scoped to one translation. Switching translations means
//! constructing a new loader over the same store; the store's keys are
//! translation-namespaced, so in-flight writes from an old loader land
//! harmlessly in the old namespace.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::OnceCell;

use lectern_core::{BookIndex, BookPayload, ChapterKey, ChapterStore, Error, Translation, canon};

use crate::cache::BookCache;
use crate::source::ContentSource;

/// Counters for the loader's observable side effects.
///
/// `persist_failures` makes best-effort cache-write failures visible to a
/// monitoring collaborator instead of leaving them as log lines only.
#[derive(Debug, Default)]
pub struct LoaderMetrics {
    index_fetches: AtomicU64,
    book_fetches: AtomicU64,
    persist_failures: AtomicU64,
}

impl LoaderMetrics {
    pub fn index_fetches(&self) -> u64 {
        self.index_fetches.load(Ordering::Relaxed)
    }

    pub fn book_fetches(&self) -> u64 {
        self.book_fetches.load(Ordering::Relaxed)
    }

    pub fn persist_failures(&self) -> u64 {
        self.persist_failures.load(Ordering::Relaxed)
    }
}

/// Translation-scoped loader context.
///
/// Owns the book index (fetched once, lazily) and the in-memory book cache;
/// shares the persistent store with the rest of the application.
pub struct BibleLoader<S> {
    source: S,
    store: ChapterStore,
    translation: Translation,
    index: OnceCell<BookIndex>,
    books: BookCache,
    metrics: LoaderMetrics,
}

impl<S: ContentSource> BibleLoader<S> {
    pub fn new(source: S, store: ChapterStore, translation: Translation) -> Self {
        Self {
            source,
            store,
            translation,
            index: OnceCell::new(),
            books: BookCache::new(),
            metrics: LoaderMetrics::default(),
        }
    }

    pub fn translation(&self) -> Translation {
        self.translation
    }

    pub fn store(&self) -> &ChapterStore {
        &self.store
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn metrics(&self) -> &LoaderMetrics {
        &self.metrics
    }

    /// The active translation's book index, fetched on first use.
    pub async fn index(&self) -> Result<&BookIndex, Error> {
        self.index
            .get_or_try_init(|| async {
                self.metrics.index_fetches.fetch_add(1, Ordering::Relaxed);
                self.source.fetch_index(self.translation).await
            })
            .await
    }

    /// Chapter count for a book, `None` when the book is not in the index.
    pub async fn chapter_count(&self, book: &str) -> Result<Option<u32>, Error> {
        let key = canon::normalize(book);
        Ok(self.index().await?.get(&key).map(|entry| entry.chapter_count))
    }

    /// Load a whole book through the cache chain.
    ///
    /// Returns `Ok(None)` when the book is not in the index — callers probe
    /// speculatively during progressive loading, so this is not an error.
    /// A fetch or payload failure falls back to the persisted chapter 1; if
    /// that is absent too, the original failure propagates.
    pub async fn load_book(&self, book: &str) -> Result<Option<Arc<BookPayload>>, Error> {
        let key = canon::normalize(book);

        let entry = {
            let index = self.index().await?;
            match index.get(&key) {
                Some(entry) => entry.clone(),
                None => {
                    tracing::warn!(book = %key, "book not present in index");
                    return Ok(None);
                }
            }
        };

        if let Some(payload) = self.books.get(&key) {
            tracing::debug!(book = %key, "book served from memory cache");
            return Ok(Some(payload));
        }

        self.metrics.book_fetches.fetch_add(1, Ordering::Relaxed);
        let fetched = match self.source.fetch_book(self.translation, &key).await {
            Ok(wire) => wire.into_payload(self.translation, &key),
            Err(err) => Err(err),
        };

        match fetched {
            Ok(payload) => {
                let payload = Arc::new(payload);
                self.write_through(&key, &payload).await;
                self.books.set(key, payload.clone());
                Ok(Some(payload))
            }
            Err(err) => {
                tracing::warn!(book = %key, error = %err, "book fetch failed, trying cached first chapter");
                let fallback = ChapterKey::new(self.translation, key.clone(), 1);
                match self.store.get(&fallback).await {
                    Ok(Some(chapter)) => Ok(Some(Arc::new(BookPayload {
                        display_name: entry.name.clone(),
                        chapters: vec![chapter],
                    }))),
                    Ok(None) => Err(err),
                    Err(store_err) => {
                        tracing::warn!(book = %key, error = %store_err, "chapter store unavailable during fallback");
                        Err(err)
                    }
                }
            }
        }
    }

    /// Decompose a book into per-chapter store records.
    ///
    /// Each chapter's write is independent; a failure is counted and logged
    /// but never aborts the load that produced the data.
    async fn write_through(&self, book_key: &str, payload: &BookPayload) {
        for chapter in &payload.chapters {
            let key = ChapterKey::new(self.translation, book_key, chapter.number);
            if let Err(err) = self.store.put(&key, &chapter.verses).await {
                self.metrics.persist_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    book = %book_key,
                    chapter = chapter.number,
                    error = %err,
                    "chapter cache write failed"
                );
            }
        }
    }
}
