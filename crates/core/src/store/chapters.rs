//! Chapter record operations.
//!
//! Writes are single-statement upserts, so a concurrent reader never observes
//! a partially written verse list. A missing row is the normal "not yet
//! cached" case and comes back as `None`, never as an error.

use super::connection::ChapterStore;
use crate::Error;
use crate::canon::Translation;
use crate::types::{Chapter, ChapterKey, Verse};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

impl ChapterStore {
    /// Insert or overwrite the verse list for one chapter.
    ///
    /// Rejects an empty verse list: an empty chapter is a load failure
    /// upstream, never valid cache content.
    pub async fn put(&self, key: &ChapterKey, verses: &[Verse]) -> Result<(), Error> {
        if verses.is_empty() {
            return Err(Error::MalformedPayload(format!(
                "refusing to store empty verse list for {}:{}",
                key.scoped_book(),
                key.chapter
            )));
        }

        let book = key.scoped_book();
        let chapter = key.chapter;
        let verses_json = serde_json::to_string(verses)
            .map_err(|e| Error::MalformedPayload(format!("verse list failed to encode: {e}")))?;
        let cached_at = chrono::Utc::now().to_rfc3339();

        self.metrics.record_write();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO chapters (book, chapter, verses, cached_at)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(book, chapter) DO UPDATE SET
                        verses = excluded.verses,
                        cached_at = excluded.cached_at",
                    params![book, chapter, verses_json, cached_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get one chapter by key.
    ///
    /// Returns `None` if the chapter has never been cached.
    pub async fn get(&self, key: &ChapterKey) -> Result<Option<Chapter>, Error> {
        self.metrics.record_read();
        let book = key.scoped_book();
        let chapter = key.chapter;

        let verses_json: Option<String> = self
            .conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let result = conn.query_row(
                    "SELECT verses FROM chapters WHERE book = ?1 AND chapter = ?2",
                    params![book, chapter],
                    |row| row.get(0),
                );

                match result {
                    Ok(json) => Ok(Some(json)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        let Some(verses_json) = verses_json else {
            return Ok(None);
        };

        let verses: Vec<Verse> = serde_json::from_str(&verses_json)
            .map_err(|e| Error::MalformedPayload(format!("stored verse list failed to decode: {e}")))?;

        Ok(Some(Chapter {
            book_key: key.book.clone(),
            number: key.chapter,
            translation: key.translation,
            verses,
        }))
    }

    /// Check whether a chapter is cached, without deserializing verses.
    ///
    /// Hot path for the loader deciding whether to fetch.
    pub async fn contains(&self, key: &ChapterKey) -> Result<bool, Error> {
        self.metrics.record_read();
        let book = key.scoped_book();
        let chapter = key.chapter;

        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn
                    .query_row(
                        "SELECT EXISTS(
                            SELECT 1 FROM chapters WHERE book = ?1 AND chapter = ?2
                        )",
                        params![book, chapter],
                        |row| row.get(0),
                    )
                    .map_err(Error::from)?;

                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Case-insensitive substring search over cached verse text.
    ///
    /// The search corpus is whatever `put` has persisted for the given
    /// translation, so offline search works exactly as far as the preloader
    /// has gotten. Rows are prefiltered by translation in SQL; the text match
    /// itself runs in Rust so SQL `LIKE` wildcard and case semantics never
    /// leak into results. Matches come back in store key order (book key,
    /// chapter, verse).
    pub async fn search(&self, translation: Translation, query: &str) -> Result<Vec<(ChapterKey, Verse)>, Error> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        self.metrics.record_read();
        let prefix = format!("{}:", translation.id());

        self.conn
            .call(move |conn| -> Result<Vec<(ChapterKey, Verse)>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT book, chapter, verses FROM chapters
                     WHERE book LIKE ?1 ORDER BY book, chapter",
                )?;
                let rows = stmt.query_map(params![format!("{prefix}%")], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?, row.get::<_, String>(2)?))
                })?;

                let mut results = Vec::new();
                for row in rows {
                    let (book, chapter, verses_json) = row?;
                    let Some(book_key) = book.strip_prefix(&prefix) else {
                        continue;
                    };
                    let verses: Vec<Verse> = serde_json::from_str(&verses_json).map_err(|e| {
                        Error::MalformedPayload(format!("stored verse list failed to decode: {e}"))
                    })?;
                    for verse in verses {
                        if verse.text.to_lowercase().contains(&needle) {
                            results.push((ChapterKey::new(translation, book_key, chapter), verse));
                        }
                    }
                }
                Ok(results)
            })
            .await
            .map_err(Error::from)
    }

    /// Wipe all cached chapters, across every translation.
    ///
    /// Returns the number of deleted rows.
    pub async fn clear(&self) -> Result<u64, Error> {
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM chapters", [])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of cached chapters.
    pub async fn len(&self) -> Result<u64, Error> {
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM chapters", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::Translation;

    fn verses(n: u32) -> Vec<Verse> {
        (1..=n)
            .map(|i| Verse { number: i, text: format!("verse {i}"), annotations: Vec::new() })
            .collect()
    }

    fn key(book: &str, chapter: u32) -> ChapterKey {
        ChapterKey::new(Translation::Asv, book, chapter)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = ChapterStore::open_in_memory().await.unwrap();
        let key = key("genesis", 1);

        store.put(&key, &verses(3)).await.unwrap();

        let chapter = store.get(&key).await.unwrap().unwrap();
        assert_eq!(chapter.book_key, "genesis");
        assert_eq!(chapter.number, 1);
        assert_eq!(chapter.translation, Translation::Asv);
        assert_eq!(chapter.verses, verses(3));
    }

    #[tokio::test]
    async fn test_get_missing_is_none_not_error() {
        let store = ChapterStore::open_in_memory().await.unwrap();
        let result = store.get(&key("genesis", 1)).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_put_is_idempotent() {
        let store = ChapterStore::open_in_memory().await.unwrap();
        let key = key("genesis", 1);

        store.put(&key, &verses(3)).await.unwrap();
        store.put(&key, &verses(3)).await.unwrap();

        assert_eq!(store.len().await.unwrap(), 1);
        let chapter = store.get(&key).await.unwrap().unwrap();
        assert_eq!(chapter.verses, verses(3));
    }

    #[tokio::test]
    async fn test_put_rejects_empty_verse_list() {
        let store = ChapterStore::open_in_memory().await.unwrap();
        let err = store.put(&key("genesis", 1), &[]).await.unwrap_err();
        assert!(matches!(err, Error::MalformedPayload(_)));
        assert!(!store.contains(&key("genesis", 1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_contains() {
        let store = ChapterStore::open_in_memory().await.unwrap();
        let key = key("exodus", 2);

        assert!(!store.contains(&key).await.unwrap());
        store.put(&key, &verses(1)).await.unwrap();
        assert!(store.contains(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_keys_are_translation_namespaced() {
        let store = ChapterStore::open_in_memory().await.unwrap();
        let asv = ChapterKey::new(Translation::Asv, "genesis", 1);
        let kjv = ChapterKey::new(Translation::Kjv, "genesis", 1);

        store.put(&asv, &verses(2)).await.unwrap();

        assert!(store.contains(&asv).await.unwrap());
        assert!(!store.contains(&kjv).await.unwrap());
    }

    fn verse(number: u32, text: &str) -> Verse {
        Verse { number, text: text.to_string(), annotations: Vec::new() }
    }

    #[tokio::test]
    async fn test_search_finds_cached_verses_case_insensitively() {
        let store = ChapterStore::open_in_memory().await.unwrap();
        store
            .put(&key("genesis", 1), &[verse(1, "In the beginning God created the heaven and the earth.")])
            .await
            .unwrap();
        store
            .put(&key("john", 1), &[verse(1, "In the beginning was the Word.")])
            .await
            .unwrap();
        store
            .put(&key("john", 3), &[verse(16, "For God so loved the world.")])
            .await
            .unwrap();

        let results = store.search(Translation::Asv, "BEGINNING").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, key("genesis", 1));
        assert_eq!(results[1].0, key("john", 1));
        assert_eq!(results[1].1.number, 1);

        let results = store.search(Translation::Asv, "loved the world").await.unwrap();
        assert_eq!(results, vec![(key("john", 3), verse(16, "For God so loved the world."))]);
    }

    #[tokio::test]
    async fn test_search_is_translation_scoped() {
        let store = ChapterStore::open_in_memory().await.unwrap();
        store
            .put(&ChapterKey::new(Translation::Kjv, "genesis", 1), &[verse(1, "In the beginning")])
            .await
            .unwrap();

        assert!(store.search(Translation::Asv, "beginning").await.unwrap().is_empty());
        assert_eq!(store.search(Translation::Kjv, "beginning").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_blank_query_matches_nothing() {
        let store = ChapterStore::open_in_memory().await.unwrap();
        store.put(&key("genesis", 1), &verses(2)).await.unwrap();

        assert!(store.search(Translation::Asv, "").await.unwrap().is_empty());
        assert!(store.search(Translation::Asv, "   ").await.unwrap().is_empty());
        assert!(store.search(Translation::Asv, "no such phrase").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_metrics_count_reads_and_writes() {
        let store = ChapterStore::open_in_memory().await.unwrap();
        assert_eq!(store.metrics().reads(), 0);
        assert_eq!(store.metrics().writes(), 0);

        store.put(&key("genesis", 1), &verses(1)).await.unwrap();
        assert_eq!(store.metrics().writes(), 1);

        store.get(&key("genesis", 1)).await.unwrap();
        store.contains(&key("genesis", 1)).await.unwrap();
        store.search(Translation::Asv, "verse").await.unwrap();
        assert_eq!(store.metrics().reads(), 3);
        assert_eq!(store.metrics().writes(), 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = ChapterStore::open_in_memory().await.unwrap();
        store.put(&key("genesis", 1), &verses(1)).await.unwrap();
        store.put(&key("genesis", 2), &verses(1)).await.unwrap();

        let deleted = store.clear().await.unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(store.len().await.unwrap(), 0);
    }
}
