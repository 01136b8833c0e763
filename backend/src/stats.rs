//! Derived verse-count statistics with prefix-sum progress queries.
//!
//! Everything here is a cache over chapter_stats rows, which are themselves
//! derived from cached chapter data. Disaster recovery is re-fetching or
//! re-scanning every chapter; no aggregate holds information that cannot be
//! rebuilt.

use std::sync::Arc;

use anyhow::Result;

use crate::cache::ChapterCache;
use crate::logger::info;
use crate::types::{ChapterError, Language};
use crate::MAX_CHAPTER_SCAN;

#[derive(Clone)]
pub struct StatsAggregator {
    cache: Arc<ChapterCache>,
}

impl StatsAggregator {
    pub fn new(cache: Arc<ChapterCache>) -> Self {
        StatsAggregator { cache }
    }

    pub fn record_chapter_count(&self, volume: u32, chapter: u32, count: i32) -> Result<()> {
        self.cache.db().upsert_chapter_count(volume, chapter, count)
    }

    /// Read-through verse count for one chapter. A missing count is
    /// materialized by fetching the chapter through the cache and recorded,
    /// zero included, so a known-empty chapter is never fetched twice by
    /// this path.
    pub fn chapter_count(
        &self,
        volume: u32,
        chapter: u32,
        lang: Language,
    ) -> Result<i32, ChapterError> {
        let persisted = self
            .cache
            .db()
            .get_chapter_count(volume, chapter)
            .map_err(|e| store_error(volume, chapter, e))?;

        if let Some(count) = persisted {
            return Ok(count);
        }

        let records = self.cache.get_or_fetch(volume, chapter, lang)?;
        let count = records.len() as i32;
        self.record_chapter_count(volume, chapter, count)
            .map_err(|e| store_error(volume, chapter, e))?;

        Ok(count)
    }

    /// (total_chapters, total_verses) for one volume. Derived on first use
    /// by scanning chapters sequentially until one yields zero verses; the
    /// corpus is assumed gapless, so the first zero is the end of the
    /// volume. A genuinely missing interior chapter would truncate the
    /// totals here.
    pub fn volume_totals(&self, volume: u32, lang: Language) -> Result<(i32, i32), ChapterError> {
        let persisted = self
            .cache
            .db()
            .get_volume_stats(volume)
            .map_err(|e| store_error(volume, 0, e))?;

        if let Some(row) = persisted {
            return Ok((row.total_chapters, row.total_verses));
        }

        let mut total_chapters: i32 = 0;
        let mut total_verses: i32 = 0;

        for chapter in 1..=MAX_CHAPTER_SCAN {
            let count = self.chapter_count(volume, chapter, lang)?;
            if count == 0 {
                break;
            }
            total_chapters = chapter as i32;
            total_verses += count;
        }

        if total_chapters > 0 {
            self.cache
                .db()
                .upsert_volume_stats(volume, total_chapters, total_verses)
                .map_err(|e| store_error(volume, 0, e))?;
            info(&format!(
                "volume {} totals: {} chapters, {} verses",
                volume, total_chapters, total_verses
            ));
        }

        Ok((total_chapters, total_verses))
    }

    /// Verses read once the reader is at (chapter, verse_index) within a
    /// volume: the counts of all earlier chapters plus the verse index.
    /// Strictly increasing as (chapter, verse_index) increases
    /// lexicographically; (1, 0) maps to 0.
    pub fn progress_within_volume(
        &self,
        volume: u32,
        chapter: u32,
        verse_index: u32,
        lang: Language,
    ) -> Result<i64, ChapterError> {
        let mut total = verse_index as i64;
        for ch in 1..chapter {
            total += self.chapter_count(volume, ch, lang)? as i64;
        }
        Ok(total)
    }

    /// Same prefix sum, extended across the volumes before this one.
    pub fn progress_within_corpus(
        &self,
        volume: u32,
        chapter: u32,
        verse_index: u32,
        lang: Language,
    ) -> Result<i64, ChapterError> {
        let mut total = self.progress_within_volume(volume, chapter, verse_index, lang)?;
        for vol in 1..volume {
            let (_, verses) = self.volume_totals(vol, lang)?;
            total += verses as i64;
        }
        Ok(total)
    }
}

fn store_error(volume: u32, chapter: u32, source: anyhow::Error) -> ChapterError {
    ChapterError::Store { volume, chapter, source }
}
