//! Emoji resolution: rewrites emoticons and graphical emoji into words.
//!
//! Two tables feed the resolver. A fixed table of ASCII emoticon patterns
//! (`:)`, `xd`, `&lt;3`, ...) and a table discovered per call from the
//! graphical emoji actually present in the text. The discovered table is
//! layered over the fixed one: on a key collision the discovered word
//! replaces the fixed word in place, so the iteration order stays the
//! order the fixed table was built in.

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex, RegexBuilder};
use unicode_segmentation::UnicodeSegmentation;

use crate::normalize::collapse_lengthening;

/// Emoticon patterns in application order. Earlier rewrites are visible to
/// later patterns.
const EMOTICONS: &[(&str, &str)] = &[
    (r":-*\)", "smile"),
    (r":-*]", "smile"),
    (r":-*d", "smile"),
    (r":-*\(", "frown"),
    (r":-*\[", "frown"),
    (r":-*/", "unsure"),
    (r":-*o", "astonish"),
    (r":-*0", "astonish"),
    (r"xd", "laugh"),
    (r";-*\)", "wink"),
    (r":'\(", "cry"),
    (r":3", "smile"),
    (r"&lt;3", "love"),
];

static EMOTICON_TABLE: Lazy<EmojiTable> = Lazy::new(|| {
    let entries = EMOTICONS
        .iter()
        .map(|(pattern, word)| {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .unwrap_or_else(|e| panic!("emoticon pattern '{}' failed to compile: {}", pattern, e));
            EmojiEntry::new(pattern.to_string(), regex, word.to_string())
        })
        .collect();
    EmojiTable { entries }
});

#[derive(Debug, Clone)]
pub struct EmojiEntry {
    key: String,
    pattern: Regex,
    word: String,
}

impl EmojiEntry {
    fn new(key: String, pattern: Regex, word: String) -> Self {
        Self { key, pattern, word }
    }

    /// Entry matching `glyph` literally.
    pub fn literal(glyph: &str, word: &str) -> Self {
        let pattern = Regex::new(&regex::escape(glyph)).expect("escaped literal is a valid pattern");
        Self::new(glyph.to_string(), pattern, word.to_string())
    }
}

/// Ordered pattern → word table.
#[derive(Debug, Clone, Default)]
pub struct EmojiTable {
    entries: Vec<EmojiEntry>,
}

impl EmojiTable {
    /// The fixed emoticon table.
    pub fn emoticons() -> Self {
        EMOTICON_TABLE.clone()
    }

    pub fn from_entries(entries: Vec<EmojiEntry>) -> Self {
        let mut table = Self::default();
        for entry in entries {
            table.insert(entry);
        }
        table
    }

    /// Builds the table of graphical emoji present in `text`, in order of
    /// first appearance. Each emoji maps to its lower-cased CLDR name.
    pub fn discover(text: &str) -> Self {
        let mut table = Self::default();
        for grapheme in text.graphemes(true) {
            if grapheme.is_ascii() || table.get(grapheme).is_some() {
                continue;
            }
            if let Some(emoji) = lookup_emoji(grapheme) {
                // Words are inserted after case folding and lengthening
                // collapse have run, so they must already be canonical.
                let word = collapse_lengthening(&emoji.name().to_lowercase());
                table.insert(EmojiEntry::literal(grapheme, &word));
            }
        }
        table
    }

    /// Inserts `entry`, overwriting the word of an existing entry with the
    /// same key without moving it.
    pub fn insert(&mut self, entry: EmojiEntry) {
        match self.entries.iter_mut().find(|e| e.key == entry.key) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Layers `overlay` over this table. Overlay entries win on collision.
    pub fn layered(mut self, overlay: EmojiTable) -> Self {
        for entry in overlay.entries {
            self.insert(entry);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|e| e.key == key).map(|e| e.word.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Applies every entry across the whole string, in table order.
    pub fn apply(&self, text: &str) -> String {
        let mut out = text.to_string();
        for entry in &self.entries {
            let padded = format!(" {} ", entry.word);
            out = entry.pattern.replace_all(&out, NoExpand(&padded)).into_owned();
        }
        out
    }
}

fn lookup_emoji(grapheme: &str) -> Option<&'static emojis::Emoji> {
    emojis::get(grapheme).or_else(|| {
        let bare = grapheme.trim_end_matches('\u{fe0f}');
        emojis::get(bare).or_else(|| emojis::get(&format!("{}\u{fe0f}", bare)))
    })
}

/// Replaces every emoticon and graphical emoji in `text` with its word,
/// padded with a space on each side.
pub fn resolve(text: &str) -> String {
    resolve_with(text, &EMOTICON_TABLE)
}

/// Like [`resolve`], layering the emoji discovered in `text` over `base`.
pub fn resolve_with(text: &str, base: &EmojiTable) -> String {
    let discovered = EmojiTable::discover(text);
    if discovered.is_empty() {
        return base.apply(text);
    }
    base.clone().layered(discovered).apply(text)
}
