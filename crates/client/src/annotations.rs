//! Lexicon token normalization for Strong's-tagged verse text.
//!
//! The KJV content files embed bracket-delimited lexicon codes directly in
//! verse text ("In the beginning{H7225} God{H430} created..."). Display text
//! must never show these; when annotation extraction is on, each code is
//! paired with the surface word immediately before it.

use std::sync::LazyLock;

use regex::Regex;

use lectern_core::{Verse, WordAnnotation};

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([GH]\d+)\}").expect("lexicon token pattern"));

/// Strip lexicon tokens from verse text.
///
/// Returns the cleaned display text and the annotation list pairing each
/// token with its preceding surface word. Tokens with no preceding word
/// (verse-initial) are dropped from the annotation list.
pub fn strip_lexicon_tokens(text: &str) -> (String, Vec<WordAnnotation>) {
    let mut display = String::with_capacity(text.len());
    let mut annotations = Vec::new();
    let mut last = 0;

    for token in TOKEN.find_iter(text) {
        display.push_str(&text[last..token.start()]);
        // The match is "{<code>}"; the code sits between the braces.
        let lexicon_id = text[token.start() + 1..token.end() - 1].to_string();
        if let Some(surface) = trailing_word(&display) {
            annotations.push(WordAnnotation { surface, lexicon_id });
        }
        last = token.end();
    }
    display.push_str(&text[last..]);

    (collapse_spaces(&display), annotations)
}

/// Produce the display form of a verse for a lexicon-tagged translation.
pub fn normalize_verse(verse: &Verse, extract_annotations: bool) -> Verse {
    let (text, annotations) = strip_lexicon_tokens(&verse.text);
    Verse {
        number: verse.number,
        text,
        annotations: if extract_annotations { annotations } else { Vec::new() },
    }
}

/// Last whole word of the text so far, with surrounding punctuation trimmed.
fn trailing_word(text: &str) -> Option<String> {
    let word = text.split_whitespace().next_back()?;
    let cleaned = word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'');
    if cleaned.is_empty() { None } else { Some(cleaned.to_string()) }
}

/// Token removal can leave doubled spaces; collapse them and trim the ends.
fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_space = false;
    for ch in text.chars() {
        if ch == ' ' {
            if previous_space {
                continue;
            }
            previous_space = true;
        } else {
            previous_space = false;
        }
        out.push(ch);
    }
    out.trim().to_string()
}
