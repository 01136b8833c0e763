use diesel::prelude::*;

use crate::db::corpus_schema::*;

// Queryable struct for reading records
#[derive(Debug, Clone, Queryable, Selectable, PartialEq)]
#[diesel(table_name = chapter_verses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ChapterVerseRow {
    pub volume: i32,
    pub chapter: i32,
    pub verse_index: i32,
    pub canonical_number: String,
    pub verse_text: String,
    pub translation: String,
}

// Insertable struct for creating new records
#[derive(Insertable)]
#[diesel(table_name = chapter_verses)]
pub struct NewChapterVerse<'a> {
    pub volume: i32,
    pub chapter: i32,
    pub verse_index: i32,
    pub canonical_number: &'a str,
    pub verse_text: &'a str,
    pub translation: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable, PartialEq)]
#[diesel(table_name = chapter_stats)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ChapterStatsRow {
    pub volume: i32,
    pub chapter: i32,
    pub verse_count: i32,
}

#[derive(Insertable)]
#[diesel(table_name = chapter_stats)]
pub struct NewChapterStats {
    pub volume: i32,
    pub chapter: i32,
    pub verse_count: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, PartialEq)]
#[diesel(table_name = volume_stats)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct VolumeStatsRow {
    pub volume: i32,
    pub total_chapters: i32,
    pub total_verses: i32,
}

#[derive(Insertable)]
#[diesel(table_name = volume_stats)]
pub struct NewVolumeStats {
    pub volume: i32,
    pub total_chapters: i32,
    pub total_verses: i32,
}
