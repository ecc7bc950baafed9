//! Per-chapter read path used by the reading UI.
//!
//! Wraps the loader with a request-scoped chapter cache and normalizes
//! lexicon-tagged translations into display text plus structured word
//! annotations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use lectern_core::{Chapter, ChapterKey, Error, canon};

use crate::annotations;
use crate::loader::BibleLoader;
use crate::source::ContentSource;

/// The sole chapter entry point exposed to the reading UI.
pub struct ChapterFetcher<S> {
    loader: Arc<BibleLoader<S>>,
    extract_annotations: bool,
    // Translation is fixed per loader context, so (book, chapter) suffices.
    recent: Mutex<HashMap<(String, u32), Arc<Chapter>>>,
}

impl<S: ContentSource> ChapterFetcher<S> {
    pub fn new(loader: Arc<BibleLoader<S>>, extract_annotations: bool) -> Self {
        Self { loader, extract_annotations, recent: Mutex::new(HashMap::new()) }
    }

    pub fn loader(&self) -> &Arc<BibleLoader<S>> {
        &self.loader
    }

    /// Fetch one chapter, normalized for display.
    ///
    /// # Errors
    ///
    /// `BookUnknown` / `ChapterNotFound` when the reference does not resolve;
    /// fetch and payload errors propagate from the loader. The caller is
    /// expected to retry a bounded number of times before showing a terminal
    /// error state.
    pub async fn fetch_chapter(&self, book: &str, chapter: u32) -> Result<Arc<Chapter>, Error> {
        let key = canon::normalize(book);

        if let Some(hit) = self.recent().get(&(key.clone(), chapter)).cloned() {
            return Ok(hit);
        }

        let Some(payload) = self.loader.load_book(&key).await? else {
            return Err(Error::BookUnknown(key));
        };

        let not_found = || Error::ChapterNotFound { book: key.clone(), chapter };
        if chapter == 0 {
            return Err(not_found());
        }
        let found = payload.chapters.get(chapter as usize - 1).ok_or_else(not_found)?;

        let mut resolved = found.clone();
        if self.loader.translation().has_lexicon() {
            resolved.verses = resolved
                .verses
                .iter()
                .map(|v| annotations::normalize_verse(v, self.extract_annotations))
                .collect();
        }
        let resolved = Arc::new(resolved);

        // Write-through is best effort; a failed cache write never fails the
        // chapter load that produced the data.
        let store_key = ChapterKey::new(self.loader.translation(), key.clone(), chapter);
        if let Err(err) = self.loader.store().put(&store_key, &resolved.verses).await {
            tracing::warn!(book = %key, chapter, error = %err, "chapter write-through failed");
        }

        self.recent().insert((key, chapter), resolved.clone());
        Ok(resolved)
    }

    fn recent(&self) -> MutexGuard<'_, HashMap<(String, u32), Arc<Chapter>>> {
        self.recent.lock().unwrap_or_else(|e| e.into_inner())
    }
}
