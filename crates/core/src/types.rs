//! Domain and wire types for scripture content.
//!
//! Wire types mirror the JSON shapes served from the content root; domain
//! types are what the store, loader, and facade trade in. Scripture text is
//! immutable once loaded, which is what makes lock-free concurrent
//! write-through safe: re-writing a chapter always writes identical content.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::canon::Translation;

/// A word in a verse linked to an original-language lexicon entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordAnnotation {
    /// The surface form as it appears in the display text.
    pub surface: String,
    /// Strong's-style lexicon code, e.g. "H7225" or "G2316".
    pub lexicon_id: String,
}

/// One verse of scripture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    pub number: u32,
    pub text: String,
    /// Lexicon links, in verse order. Empty for translations without
    /// lexicon data and for raw (un-normalized) text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<WordAnnotation>,
}

/// One chapter, uniquely identified by (translation, book key, number).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub book_key: String,
    /// 1-indexed chapter number.
    pub number: u32,
    pub translation: Translation,
    pub verses: Vec<Verse>,
}

/// A whole book as retrieved from the content source in one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookPayload {
    pub display_name: String,
    pub chapters: Vec<Chapter>,
}

/// Composite key addressing one chapter in the persistent store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChapterKey {
    pub translation: Translation,
    pub book: String,
    pub chapter: u32,
}

impl ChapterKey {
    pub fn new(translation: Translation, book: impl Into<String>, chapter: u32) -> Self {
        Self { translation, book: book.into(), chapter }
    }

    /// Translation-qualified book key, e.g. "asv:genesis".
    ///
    /// Namespacing by translation is what lets a translation switch skip
    /// store invalidation entirely.
    pub fn scoped_book(&self) -> String {
        format!("{}:{}", self.translation.id(), self.book)
    }
}

/// Index entry for one book in a translation's `index.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookEntry {
    pub name: String,
    pub chapter_count: u32,
    /// Approximate content-file size in bytes, when the index records it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Per-translation directory: normalized book key to index entry.
pub type BookIndex = BTreeMap<String, BookEntry>;

/// Verse as served in a book content file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireVerse {
    #[serde(rename = "verse")]
    pub number: u32,
    pub text: String,
}

/// Chapter as served in a book content file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireChapter {
    #[serde(rename = "chapter")]
    pub number: u32,
    pub verses: Vec<WireVerse>,
}

/// Book content file: `{ "name", "chapters": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireBook {
    pub name: String,
    pub chapters: Vec<WireChapter>,
}

impl WireBook {
    /// Validate and convert a fetched book file into the domain payload.
    ///
    /// An empty chapter list or an empty verse list is a load failure, not a
    /// valid empty chapter.
    pub fn into_payload(self, translation: Translation, book_key: &str) -> Result<BookPayload, Error> {
        if self.chapters.is_empty() {
            return Err(Error::MalformedPayload(format!("{book_key}: no chapters in book file")));
        }

        let mut chapters = Vec::with_capacity(self.chapters.len());
        for chapter in self.chapters {
            if chapter.verses.is_empty() {
                return Err(Error::MalformedPayload(format!(
                    "{book_key} chapter {}: empty verse list",
                    chapter.number
                )));
            }
            if chapter.number == 0 {
                return Err(Error::MalformedPayload(format!("{book_key}: chapter number 0")));
            }

            let verses = chapter
                .verses
                .into_iter()
                .map(|v| Verse { number: v.number, text: v.text, annotations: Vec::new() })
                .collect();

            chapters.push(Chapter {
                book_key: book_key.to_string(),
                number: chapter.number,
                translation,
                verses,
            });
        }

        Ok(BookPayload { display_name: self.name, chapters })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire_book() -> WireBook {
        WireBook {
            name: "Genesis".to_string(),
            chapters: vec![WireChapter {
                number: 1,
                verses: vec![WireVerse { number: 1, text: "In the beginning".to_string() }],
            }],
        }
    }

    #[test]
    fn test_wire_book_deserializes_content_file_shape() {
        let json = r#"{
            "name": "Genesis",
            "chapters": [
                { "chapter": 1, "verses": [ { "verse": 1, "text": "In the beginning" } ] }
            ]
        }"#;
        let book: WireBook = serde_json::from_str(json).unwrap();
        assert_eq!(book.name, "Genesis");
        assert_eq!(book.chapters[0].number, 1);
        assert_eq!(book.chapters[0].verses[0].number, 1);
    }

    #[test]
    fn test_index_entry_deserializes_camel_case() {
        let json = r#"{ "name": "Genesis", "chapterCount": 50, "size": 205000 }"#;
        let entry: BookEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.chapter_count, 50);
        assert_eq!(entry.size, Some(205_000));
    }

    #[test]
    fn test_into_payload() {
        let payload = wire_book().into_payload(Translation::Asv, "genesis").unwrap();
        assert_eq!(payload.display_name, "Genesis");
        assert_eq!(payload.chapters.len(), 1);
        assert_eq!(payload.chapters[0].book_key, "genesis");
        assert_eq!(payload.chapters[0].translation, Translation::Asv);
        assert!(payload.chapters[0].verses[0].annotations.is_empty());
    }

    #[test]
    fn test_into_payload_rejects_empty_verse_list() {
        let mut book = wire_book();
        book.chapters[0].verses.clear();
        let err = book.into_payload(Translation::Asv, "genesis").unwrap_err();
        assert!(matches!(err, Error::MalformedPayload(_)));
    }

    #[test]
    fn test_into_payload_rejects_empty_book() {
        let mut book = wire_book();
        book.chapters.clear();
        let err = book.into_payload(Translation::Asv, "genesis").unwrap_err();
        assert!(matches!(err, Error::MalformedPayload(_)));
    }

    #[test]
    fn test_scoped_book_key_is_translation_qualified() {
        let key = ChapterKey::new(Translation::Kjv, "genesis", 1);
        assert_eq!(key.scoped_book(), "kjv:genesis");
        let key = ChapterKey::new(Translation::Asv, "genesis", 1);
        assert_eq!(key.scoped_book(), "asv:genesis");
    }

    #[test]
    fn test_verse_round_trips_without_annotations_field() {
        let verse = Verse { number: 1, text: "In the beginning".to_string(), annotations: Vec::new() };
        let json = serde_json::to_string(&verse).unwrap();
        assert!(!json.contains("annotations"));
        let back: Verse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, verse);
    }
}
