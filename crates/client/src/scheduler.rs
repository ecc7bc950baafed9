//! Progressive cache warming across the canon.
//!
//! Three phases: the exact chapter the user asked for (blocks readiness),
//! the adjacent chapters of the current book (UI already interactive), then
//! one representative chapter of every other book ordered by proximity to
//! the current book. Background loads run strictly sequentially to bound
//! resource use and keep progress monotonic.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{oneshot, watch};

use lectern_core::{ChapterKey, Error, canon};

use crate::loader::BibleLoader;
use crate::source::ContentSource;

/// Which phase the preloader is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloadPhase {
    /// Loading the requested chapter; the UI is not interactive yet.
    Initial,
    /// Loading the previous/next chapters of the current book.
    Adjacent,
    /// Draining the rest of the canon.
    Background,
    /// Finished (or cancelled).
    Done,
}

/// Coarse progress snapshot published after every background book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreloadProgress {
    pub phase: PreloadPhase,
    /// 0-100, monotonically increasing within the background phase.
    pub percent: u8,
}

/// Cancellation flag for a running preloader.
///
/// Cancellation is prompt but not preemptive: the loop stops before the next
/// background book. Already-written chapters stay cached.
#[derive(Clone)]
pub struct PreloadHandle {
    cancelled: Arc<AtomicBool>,
}

impl PreloadHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Sequenced background loader that warms the persistent store.
pub struct Preloader<S> {
    loader: Arc<BibleLoader<S>>,
    progress: watch::Sender<PreloadProgress>,
    cancelled: Arc<AtomicBool>,
}

impl<S: ContentSource> Preloader<S> {
    pub fn new(loader: Arc<BibleLoader<S>>) -> (Self, watch::Receiver<PreloadProgress>) {
        let (progress, rx) = watch::channel(PreloadProgress { phase: PreloadPhase::Initial, percent: 0 });
        (Self { loader, progress, cancelled: Arc::new(AtomicBool::new(false)) }, rx)
    }

    pub fn handle(&self) -> PreloadHandle {
        PreloadHandle { cancelled: self.cancelled.clone() }
    }

    /// Drive all three phases.
    ///
    /// `ready` fires exactly once, after the initial chapter is available;
    /// if the initial load fails it never fires and the error is fatal.
    /// Adjacent and background failures are logged and skipped.
    pub async fn run(self, book: &str, chapter: u32, ready: oneshot::Sender<()>) -> Result<(), Error> {
        let key = canon::normalize(book);

        self.publish(PreloadPhase::Initial, 0);
        self.ensure_chapter(&key, chapter)
            .await
            .map_err(|err| Error::InitialLoadFailed(err.to_string()))?;
        let _ = ready.send(());

        self.publish(PreloadPhase::Adjacent, 0);
        self.load_adjacent(&key, chapter).await;

        self.load_background(&key).await;
        Ok(())
    }

    /// Make one chapter durable, loading its book if necessary.
    async fn ensure_chapter(&self, key: &str, chapter: u32) -> Result<(), Error> {
        let store_key = ChapterKey::new(self.loader.translation(), key, chapter);
        match self.loader.store().contains(&store_key).await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            // Cache unavailable is not "chapter does not exist"; fall
            // through to the loader.
            Err(err) => {
                tracing::warn!(book = %key, chapter, error = %err, "store check failed, loading book instead")
            }
        }

        let Some(payload) = self.loader.load_book(key).await? else {
            return Err(Error::BookUnknown(key.to_string()));
        };
        if chapter == 0 || payload.chapters.len() < chapter as usize {
            return Err(Error::ChapterNotFound { book: key.to_string(), chapter });
        }
        Ok(())
    }

    /// Load chapter-1 and chapter+1 of the current book, concurrently.
    ///
    /// Order between the two is not guaranteed; individual failures are
    /// tolerated (partial adjacent coverage is acceptable).
    async fn load_adjacent(&self, key: &str, chapter: u32) {
        let count = match self.loader.chapter_count(key).await {
            Ok(Some(count)) => count,
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(book = %key, error = %err, "skipping adjacent preload");
                return;
            }
        };

        let previous = async {
            if chapter > 1
                && let Err(err) = self.ensure_chapter(key, chapter - 1).await
            {
                tracing::warn!(book = %key, chapter = chapter - 1, error = %err, "adjacent preload failed");
            }
        };
        let next = async {
            if chapter < count
                && let Err(err) = self.ensure_chapter(key, chapter + 1).await
            {
                tracing::warn!(book = %key, chapter = chapter + 1, error = %err, "adjacent preload failed");
            }
        };
        tokio::join!(previous, next);
    }

    /// Walk the rest of the canon by proximity, one book at a time.
    async fn load_background(&self, current: &str) {
        let order = background_order(current);
        let total = order.len();
        if total == 0 {
            self.publish(PreloadPhase::Done, 100);
            return;
        }

        for (completed, book) in order.iter().enumerate() {
            if self.cancelled.load(Ordering::Relaxed) {
                tracing::info!(loaded = completed, "background preload cancelled");
                return;
            }

            match self.loader.load_book(book).await {
                Ok(Some(_)) => {}
                Ok(None) => tracing::warn!(book, "book missing from index, skipping"),
                Err(err) => tracing::warn!(book, error = %err, "book preload failed, skipping"),
            }

            let percent = (((completed + 1) * 100) / total) as u8;
            self.publish(PreloadPhase::Background, percent);
        }

        self.publish(PreloadPhase::Done, 100);
    }

    fn publish(&self, phase: PreloadPhase, percent: u8) {
        let _ = self.progress.send(PreloadProgress { phase, percent });
    }
}

/// Background load order: every canon book except the current one, ranked by
/// absolute distance from the current book, ties broken by canonical order.
pub fn background_order(current_key: &str) -> Vec<&'static str> {
    let keys: Vec<&'static str> = canon::CANON.iter().map(|(key, _)| *key).collect();
    let Some(current) = canon::position(current_key) else {
        return keys;
    };
    ranked_indices(current, keys.len()).into_iter().map(|i| keys[i]).collect()
}

/// Indices `0..len` without `current`, sorted by distance then original
/// order. Stable sort preserves the canonical tie-break.
fn ranked_indices(current: usize, len: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).filter(|&i| i != current).collect();
    order.sort_by_key(|&i| i.abs_diff(current));
    order
}
