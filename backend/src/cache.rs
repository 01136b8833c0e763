//! The chapter cache: a write-once-then-read table of parsed verse records
//! keyed by (volume, chapter), layered over the fetcher and parser so the
//! network fetch happens at most once per chapter.

use std::collections::HashMap;

use anyhow::Result;

use crate::db::corpus::CorpusDbHandle;
use crate::db::corpus_models::NewChapterVerse;
use crate::fetch::FetchChapter;
use crate::helpers::{canonical_prefix, RE_NUMBER_TRIPLE};
use crate::logger::{info, warn};
use crate::parse::parse_chapter;
use crate::types::{ChapterError, Language, ParsedVerse, VerseRecord};

/// Owned by the application's composition root and passed by reference to
/// callers; there is no process-wide instance.
///
/// `get_or_fetch` is not guarded against concurrent callers racing on the
/// same key: both may fetch and both will store. `put` is idempotent and
/// convergent, so the race is wasteful, not harmful.
pub struct ChapterCache {
    db: CorpusDbHandle,
    fetcher: Box<dyn FetchChapter + Send + Sync>,
}

impl ChapterCache {
    pub fn new(db: CorpusDbHandle, fetcher: Box<dyn FetchChapter + Send + Sync>) -> Self {
        ChapterCache { db, fetcher }
    }

    pub fn db(&self) -> &CorpusDbHandle {
        &self.db
    }

    /// Pure lookup. None when the chapter has no cached rows; no network
    /// access on any path.
    pub fn get(&self, volume: u32, chapter: u32) -> Result<Option<Vec<VerseRecord>>> {
        let rows = self.db.get_chapter_verses(volume, chapter)?;
        if rows.is_empty() {
            return Ok(None);
        }

        let records = rows
            .into_iter()
            .map(|r| VerseRecord {
                verse_index: r.verse_index,
                canonical_number: r.canonical_number,
                verse_text: r.verse_text,
                // Glosses are not persisted.
                gloss: HashMap::new(),
                translation: r.translation,
            })
            .collect();

        Ok(Some(records))
    }

    /// Replace the chapter's records. Atomic delete-then-insert; calling
    /// twice with the same records is a no-op for readers.
    pub fn put(&self, volume: u32, chapter: u32, records: &[VerseRecord]) -> Result<()> {
        let rows: Vec<NewChapterVerse> = records
            .iter()
            .map(|r| NewChapterVerse {
                volume: volume as i32,
                chapter: chapter as i32,
                verse_index: r.verse_index,
                canonical_number: &r.canonical_number,
                verse_text: &r.verse_text,
                translation: &r.translation,
            })
            .collect();

        self.db.replace_chapter_verses(volume, chapter, &rows)
    }

    /// Cached records if present, otherwise fetch, parse, validate and
    /// store. The at-most-one-fetch-per-chapter guarantee lives here.
    pub fn get_or_fetch(
        &self,
        volume: u32,
        chapter: u32,
        lang: Language,
    ) -> Result<Vec<VerseRecord>, ChapterError> {
        let cached = self
            .get(volume, chapter)
            .map_err(|e| store_error(volume, chapter, e))?;

        if let Some(records) = cached {
            return Ok(records);
        }

        self.refresh(volume, chapter, lang)
    }

    /// Unconditionally fetch and parse the chapter, replacing any cached
    /// rows. A chapter parsing to zero verses is returned as-is and leaves
    /// the store untouched; callers decide whether that means the chapter
    /// does not exist.
    pub fn refresh(
        &self,
        volume: u32,
        chapter: u32,
        lang: Language,
    ) -> Result<Vec<VerseRecord>, ChapterError> {
        let raw_html = self.fetcher.fetch_chapter(volume, chapter, lang)?;
        let parsed = parse_chapter(&raw_html);
        if parsed.is_empty() {
            return Ok(Vec::new());
        }

        let records = to_records(&parsed, volume, chapter);

        let prefix = canonical_prefix(volume, chapter);
        for record in &records {
            if !record.canonical_number.starts_with(&prefix) {
                return Err(ChapterError::Validation {
                    volume,
                    chapter,
                    found: record.canonical_number.clone(),
                });
            }
        }

        self.put(volume, chapter, &records)
            .map_err(|e| store_error(volume, chapter, e))?;

        info(&format!(
            "Cached volume {} chapter {} ({} verses)",
            volume,
            chapter,
            records.len()
        ));

        Ok(records)
    }
}

fn store_error(volume: u32, chapter: u32, source: anyhow::Error) -> ChapterError {
    ChapterError::Store { volume, chapter, source }
}

fn to_records(parsed: &[ParsedVerse], volume: u32, chapter: u32) -> Vec<VerseRecord> {
    parsed
        .iter()
        .enumerate()
        .map(|(i, verse)| {
            let verse_index = (i + 1) as i32;
            VerseRecord {
                verse_index,
                canonical_number: resolve_canonical_number(verse, volume, chapter, verse_index),
                verse_text: verse.text.clone(),
                gloss: verse.gloss.clone(),
                translation: verse.translation.clone(),
            }
        })
        .collect()
}

/// The parsed number when the marker was present; otherwise any bare
/// n.n.n triple in the verse text; otherwise the index-derived number.
/// The triple scan keeps a chapter-mismatch detectable by validation even
/// when the marker is malformed.
fn resolve_canonical_number(
    verse: &ParsedVerse,
    volume: u32,
    chapter: u32,
    verse_index: i32,
) -> String {
    if let Some(number) = &verse.number {
        return number.clone();
    }

    if let Some(caps) = RE_NUMBER_TRIPLE.captures(&verse.text) {
        return caps[0].to_string();
    }

    warn(&format!(
        "no verse number for volume {} chapter {} index {}, deriving from position",
        volume, chapter, verse_index
    ));
    format!("{}.{}.{}", volume, chapter, verse_index)
}
