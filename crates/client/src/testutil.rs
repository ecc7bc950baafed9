//! Test doubles shared by loader, facade, and scheduler tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use lectern_core::types::{WireBook, WireChapter, WireVerse};
use lectern_core::{BookEntry, BookIndex, Error, Translation};

use crate::source::ContentSource;

/// In-memory content source with call counters and failure injection.
pub(crate) struct FakeSource {
    index: BookIndex,
    books: BTreeMap<String, WireBook>,
    fail_books: HashSet<String>,
    fail_index: bool,
    pub index_calls: AtomicU64,
    pub book_calls: AtomicU64,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            index: BookIndex::new(),
            books: BTreeMap::new(),
            fail_books: HashSet::new(),
            fail_index: false,
            index_calls: AtomicU64::new(0),
            book_calls: AtomicU64::new(0),
        }
    }

    /// Register a book with generated verse text ("<name> <chapter>:<verse>").
    pub fn with_book(mut self, key: &str, name: &str, chapters: u32, verses_per_chapter: u32) -> Self {
        self.index
            .insert(key.to_string(), BookEntry { name: name.to_string(), chapter_count: chapters, size: None });
        let chapters = (1..=chapters)
            .map(|c| WireChapter {
                number: c,
                verses: (1..=verses_per_chapter)
                    .map(|v| WireVerse { number: v, text: format!("{name} {c}:{v}") })
                    .collect(),
            })
            .collect();
        self.books.insert(key.to_string(), WireBook { name: name.to_string(), chapters });
        self
    }

    /// Register a one-chapter book whose single verse carries the given text.
    pub fn with_single_verse_book(mut self, key: &str, name: &str, text: &str) -> Self {
        self.index
            .insert(key.to_string(), BookEntry { name: name.to_string(), chapter_count: 1, size: None });
        self.books.insert(
            key.to_string(),
            WireBook {
                name: name.to_string(),
                chapters: vec![WireChapter { number: 1, verses: vec![WireVerse { number: 1, text: text.to_string() }] }],
            },
        );
        self
    }

    /// Make every fetch of this book fail with a network error.
    pub fn fail_book(mut self, key: &str) -> Self {
        self.fail_books.insert(key.to_string());
        self
    }

    /// Make the index fetch fail with a network error.
    pub fn fail_index(mut self) -> Self {
        self.fail_index = true;
        self
    }

    pub fn index_calls(&self) -> u64 {
        self.index_calls.load(Ordering::Relaxed)
    }

    pub fn book_calls(&self) -> u64 {
        self.book_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ContentSource for FakeSource {
    async fn fetch_index(&self, _translation: Translation) -> Result<BookIndex, Error> {
        self.index_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_index {
            return Err(Error::Http("index unavailable".to_string()));
        }
        Ok(self.index.clone())
    }

    async fn fetch_book(&self, _translation: Translation, book_key: &str) -> Result<WireBook, Error> {
        self.book_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_books.contains(book_key) {
            return Err(Error::Http(format!("{book_key} unavailable")));
        }
        self.books
            .get(book_key)
            .cloned()
            .ok_or_else(|| Error::Http(format!("status 404 for {book_key}")))
    }
}
