use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Language codes accepted by the upstream verse endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "te")]
    Telugu,
    #[serde(rename = "dv")]
    Devanagari,
}

impl Language {
    pub fn as_code(&self) -> &'static str {
        match self {
            Language::Telugu => "te",
            Language::Devanagari => "dv",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::Telugu
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

// Custom error for parsing Language from string
#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid language code: {0}")]
pub struct ParseLanguageError(String);

impl FromStr for Language {
    type Err = ParseLanguageError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "te" => Ok(Language::Telugu),
            "dv" => Ok(Language::Devanagari),
            _ => Err(ParseLanguageError(s.to_string())),
        }
    }
}

/// One verse of a chapter as served to consumers.
///
/// Records are immutable once parsed. The gloss map is only populated on
/// records coming straight from the parser; the persistent cache stores
/// verse text and translation but not glosses, so records loaded from the
/// database carry an empty map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerseRecord {
    /// 1-based ordinal within the chapter.
    pub verse_index: i32,
    /// "volume.chapter.index"
    pub canonical_number: String,
    /// Native-script verse text, one stanza line per source line.
    pub verse_text: String,
    /// Surface token -> meaning. Insertion order is not significant.
    pub gloss: HashMap<String, String>,
    pub translation: String,
}

/// Raw parser output for one verse block, before the cache assigns ordinal
/// indices and fills in missing canonical numbers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedVerse {
    /// None when no number marker was found in the body (a soft defect,
    /// logged by the parser; downstream validation catches real mismatches).
    pub number: Option<String>,
    pub text: String,
    pub gloss: HashMap<String, String>,
    pub translation: String,
}

#[derive(Error, Debug)]
pub enum ChapterError {
    #[error("could not fetch volume {volume} chapter {chapter}: {reason}")]
    Fetch {
        volume: u32,
        chapter: u32,
        reason: String,
    },

    #[error("verse number '{found}' does not match volume {volume} chapter {chapter}")]
    Validation {
        volume: u32,
        chapter: u32,
        found: String,
    },

    #[error("store error for volume {volume} chapter {chapter}: {source}")]
    Store {
        volume: u32,
        chapter: u32,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_str() {
        assert_eq!(Language::from_str("te"), Ok(Language::Telugu));
        assert_eq!(Language::from_str("dv"), Ok(Language::Devanagari));
        assert!(Language::from_str("en").is_err());
        assert!(Language::from_str("").is_err());
    }

    #[test]
    fn test_language_round_trip() {
        for lang in [Language::Telugu, Language::Devanagari] {
            assert_eq!(Language::from_str(lang.as_code()), Ok(lang));
        }
    }
}
