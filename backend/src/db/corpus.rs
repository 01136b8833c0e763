use diesel::prelude::*;

use anyhow::Result;

use crate::db::corpus_models::*;
use crate::db::corpus_schema::{chapter_stats, chapter_verses, volume_stats};
use crate::db::DatabaseHandle;

pub type CorpusDbHandle = DatabaseHandle;

impl CorpusDbHandle {
    pub fn create_tables(&self) -> Result<()> {
        self.do_write(|db_conn| {
            diesel::sql_query(
                "CREATE TABLE IF NOT EXISTS chapter_verses (
                    volume INTEGER NOT NULL,
                    chapter INTEGER NOT NULL,
                    verse_index INTEGER NOT NULL,
                    canonical_number TEXT NOT NULL,
                    verse_text TEXT NOT NULL,
                    translation TEXT NOT NULL,
                    PRIMARY KEY (volume, chapter, verse_index)
                )",
            )
            .execute(db_conn)?;

            diesel::sql_query(
                "CREATE TABLE IF NOT EXISTS chapter_stats (
                    volume INTEGER NOT NULL,
                    chapter INTEGER NOT NULL,
                    verse_count INTEGER NOT NULL,
                    PRIMARY KEY (volume, chapter)
                )",
            )
            .execute(db_conn)?;

            diesel::sql_query(
                "CREATE TABLE IF NOT EXISTS volume_stats (
                    volume INTEGER PRIMARY KEY,
                    total_chapters INTEGER NOT NULL,
                    total_verses INTEGER NOT NULL
                )",
            )
            .execute(db_conn)?;

            Ok(())
        })
    }

    /// All verse rows of one chapter, in verse order.
    pub fn get_chapter_verses(&self, vol: u32, chap: u32) -> Result<Vec<ChapterVerseRow>> {
        self.do_read(|db_conn| {
            chapter_verses::table
                .filter(chapter_verses::volume.eq(vol as i32))
                .filter(chapter_verses::chapter.eq(chap as i32))
                .order(chapter_verses::verse_index.asc())
                .select(ChapterVerseRow::as_select())
                .load::<ChapterVerseRow>(db_conn)
        })
    }

    /// Replace a chapter's verse rows in one transaction. Any prior rows
    /// for the key are discarded; a reader never observes a partial
    /// chapter.
    pub fn replace_chapter_verses(
        &self,
        vol: u32,
        chap: u32,
        rows: &[NewChapterVerse],
    ) -> Result<()> {
        self.do_write(|db_conn| {
            db_conn.transaction::<_, diesel::result::Error, _>(|conn| {
                diesel::delete(
                    chapter_verses::table
                        .filter(chapter_verses::volume.eq(vol as i32))
                        .filter(chapter_verses::chapter.eq(chap as i32)),
                )
                .execute(conn)?;

                diesel::insert_into(chapter_verses::table)
                    .values(rows)
                    .execute(conn)?;

                Ok(())
            })
        })
    }

    pub fn chapter_verse_row_count(&self, vol: u32, chap: u32) -> Result<i64> {
        self.do_read(|db_conn| {
            chapter_verses::table
                .filter(chapter_verses::volume.eq(vol as i32))
                .filter(chapter_verses::chapter.eq(chap as i32))
                .count()
                .get_result::<i64>(db_conn)
        })
    }

    pub fn get_chapter_count(&self, vol: u32, chap: u32) -> Result<Option<i32>> {
        let row = self.do_read(|db_conn| {
            chapter_stats::table
                .filter(chapter_stats::volume.eq(vol as i32))
                .filter(chapter_stats::chapter.eq(chap as i32))
                .select(ChapterStatsRow::as_select())
                .first::<ChapterStatsRow>(db_conn)
                .optional()
        })?;
        Ok(row.map(|r| r.verse_count))
    }

    pub fn upsert_chapter_count(&self, vol: u32, chap: u32, count: i32) -> Result<()> {
        self.do_write(|db_conn| {
            let existing = chapter_stats::table
                .filter(chapter_stats::volume.eq(vol as i32))
                .filter(chapter_stats::chapter.eq(chap as i32))
                .select(ChapterStatsRow::as_select())
                .first::<ChapterStatsRow>(db_conn)
                .optional()?;

            match existing {
                Some(_) => {
                    diesel::update(
                        chapter_stats::table
                            .filter(chapter_stats::volume.eq(vol as i32))
                            .filter(chapter_stats::chapter.eq(chap as i32)),
                    )
                    .set(chapter_stats::verse_count.eq(count))
                    .execute(db_conn)
                }
                None => {
                    let new_row = NewChapterStats {
                        volume: vol as i32,
                        chapter: chap as i32,
                        verse_count: count,
                    };

                    diesel::insert_into(chapter_stats::table)
                        .values(&new_row)
                        .execute(db_conn)
                }
            }?;

            Ok(())
        })
    }

    /// Recorded per-chapter counts for one volume, in chapter order.
    pub fn chapter_counts_for_volume(&self, vol: u32) -> Result<Vec<ChapterStatsRow>> {
        self.do_read(|db_conn| {
            chapter_stats::table
                .filter(chapter_stats::volume.eq(vol as i32))
                .order(chapter_stats::chapter.asc())
                .select(ChapterStatsRow::as_select())
                .load::<ChapterStatsRow>(db_conn)
        })
    }

    pub fn all_chapter_stats(&self) -> Result<Vec<ChapterStatsRow>> {
        self.do_read(|db_conn| {
            chapter_stats::table
                .order((chapter_stats::volume.asc(), chapter_stats::chapter.asc()))
                .select(ChapterStatsRow::as_select())
                .load::<ChapterStatsRow>(db_conn)
        })
    }

    pub fn get_volume_stats(&self, vol: u32) -> Result<Option<VolumeStatsRow>> {
        self.do_read(|db_conn| {
            volume_stats::table
                .filter(volume_stats::volume.eq(vol as i32))
                .select(VolumeStatsRow::as_select())
                .first::<VolumeStatsRow>(db_conn)
                .optional()
        })
    }

    pub fn upsert_volume_stats(
        &self,
        vol: u32,
        total_chapters: i32,
        total_verses: i32,
    ) -> Result<()> {
        self.do_write(|db_conn| {
            let existing = volume_stats::table
                .filter(volume_stats::volume.eq(vol as i32))
                .select(VolumeStatsRow::as_select())
                .first::<VolumeStatsRow>(db_conn)
                .optional()?;

            match existing {
                Some(_) => {
                    diesel::update(
                        volume_stats::table.filter(volume_stats::volume.eq(vol as i32)),
                    )
                    .set((
                        volume_stats::total_chapters.eq(total_chapters),
                        volume_stats::total_verses.eq(total_verses),
                    ))
                    .execute(db_conn)
                }
                None => {
                    let new_row = NewVolumeStats {
                        volume: vol as i32,
                        total_chapters,
                        total_verses,
                    };

                    diesel::insert_into(volume_stats::table)
                        .values(&new_row)
                        .execute(db_conn)
                }
            }?;

            Ok(())
        })
    }
}
