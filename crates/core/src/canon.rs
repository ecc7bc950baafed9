//! Canonical book ordering and translation identity.
//!
//! The canon table is the authority for book-key normalization and for the
//! proximity ordering used by the progressive loader. Chapter counts are not
//! recorded here; they come from the per-translation index file at runtime.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// The 66-book canon in canonical order: (normalized key, display name).
pub const CANON: &[(&str, &str)] = &[
    ("genesis", "Genesis"),
    ("exodus", "Exodus"),
    ("leviticus", "Leviticus"),
    ("numbers", "Numbers"),
    ("deuteronomy", "Deuteronomy"),
    ("joshua", "Joshua"),
    ("judges", "Judges"),
    ("ruth", "Ruth"),
    ("1samuel", "1 Samuel"),
    ("2samuel", "2 Samuel"),
    ("1kings", "1 Kings"),
    ("2kings", "2 Kings"),
    ("1chronicles", "1 Chronicles"),
    ("2chronicles", "2 Chronicles"),
    ("ezra", "Ezra"),
    ("nehemiah", "Nehemiah"),
    ("esther", "Esther"),
    ("job", "Job"),
    ("psalms", "Psalms"),
    ("proverbs", "Proverbs"),
    ("ecclesiastes", "Ecclesiastes"),
    ("songofsolomon", "Song of Solomon"),
    ("isaiah", "Isaiah"),
    ("jeremiah", "Jeremiah"),
    ("lamentations", "Lamentations"),
    ("ezekiel", "Ezekiel"),
    ("daniel", "Daniel"),
    ("hosea", "Hosea"),
    ("joel", "Joel"),
    ("amos", "Amos"),
    ("obadiah", "Obadiah"),
    ("jonah", "Jonah"),
    ("micah", "Micah"),
    ("nahum", "Nahum"),
    ("habakkuk", "Habakkuk"),
    ("zephaniah", "Zephaniah"),
    ("haggai", "Haggai"),
    ("zechariah", "Zechariah"),
    ("malachi", "Malachi"),
    ("matthew", "Matthew"),
    ("mark", "Mark"),
    ("luke", "Luke"),
    ("john", "John"),
    ("acts", "Acts"),
    ("romans", "Romans"),
    ("1corinthians", "1 Corinthians"),
    ("2corinthians", "2 Corinthians"),
    ("galatians", "Galatians"),
    ("ephesians", "Ephesians"),
    ("philippians", "Philippians"),
    ("colossians", "Colossians"),
    ("1thessalonians", "1 Thessalonians"),
    ("2thessalonians", "2 Thessalonians"),
    ("1timothy", "1 Timothy"),
    ("2timothy", "2 Timothy"),
    ("titus", "Titus"),
    ("philemon", "Philemon"),
    ("hebrews", "Hebrews"),
    ("james", "James"),
    ("1peter", "1 Peter"),
    ("2peter", "2 Peter"),
    ("1john", "1 John"),
    ("2john", "2 John"),
    ("3john", "3 John"),
    ("jude", "Jude"),
    ("revelation", "Revelation"),
];

/// Number of books in the canon.
pub fn book_count() -> usize {
    CANON.len()
}

/// Normalize a book identifier to its canonical key.
///
/// Lowercases and strips separators so "1 Corinthians", "1_corinthians" and
/// "1corinthians" all resolve to the same key.
pub fn normalize(book: &str) -> String {
    book.trim().to_ascii_lowercase().replace([' ', '_'], "")
}

/// Position of a normalized book key in canonical order.
pub fn position(book_key: &str) -> Option<usize> {
    CANON.iter().position(|(key, _)| *key == book_key)
}

/// Display name for a normalized book key.
pub fn display_name(book_key: &str) -> Option<&'static str> {
    CANON
        .iter()
        .find(|(key, _)| *key == book_key)
        .map(|(_, name)| *name)
}

/// One of the supported textual renderings of the canon.
///
/// Each translation has its own file layout under the content root. The KJV
/// content was produced from a Strong's-tagged source and both lives under a
/// different directory (`kjv_books/`) and embeds lexicon tokens in verse text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Translation {
    /// American Standard Version (primary).
    #[default]
    Asv,
    /// World English Bible (secondary).
    Web,
    /// King James Version with Strong's tokens (tertiary).
    Kjv,
}

impl Translation {
    /// Stable identifier used in persistent-store keys and config.
    pub fn id(self) -> &'static str {
        match self {
            Translation::Asv => "asv",
            Translation::Web => "web",
            Translation::Kjv => "kjv",
        }
    }

    /// Directory under the content root holding this translation's files.
    ///
    /// The KJV deviates from the `<id>/` convention; callers must resolve
    /// paths through here rather than hardcoding a single pattern.
    pub fn path_root(self) -> &'static str {
        match self {
            Translation::Asv => "asv",
            Translation::Web => "web",
            Translation::Kjv => "kjv_books",
        }
    }

    /// Whether verse text embeds inline lexicon-reference tokens.
    pub fn has_lexicon(self) -> bool {
        matches!(self, Translation::Kjv)
    }

    /// Human-readable translation name.
    pub fn display_name(self) -> &'static str {
        match self {
            Translation::Asv => "American Standard Version",
            Translation::Web => "World English Bible",
            Translation::Kjv => "King James Version",
        }
    }
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Translation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asv" => Ok(Translation::Asv),
            "web" => Ok(Translation::Web),
            "kjv" => Ok(Translation::Kjv),
            other => Err(Error::InvalidInput(format!("unknown translation: {other}"))),
        }
    }
}
