diesel::table! {
    chapter_verses (volume, chapter, verse_index) {
        volume -> Integer,
        chapter -> Integer,
        verse_index -> Integer,
        canonical_number -> Text,
        verse_text -> Text,
        translation -> Text,
    }
}

diesel::table! {
    chapter_stats (volume, chapter) {
        volume -> Integer,
        chapter -> Integer,
        verse_count -> Integer,
    }
}

diesel::table! {
    volume_stats (volume) {
        volume -> Integer,
        total_chapters -> Integer,
        total_verses -> Integer,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    chapter_verses,
    chapter_stats,
    volume_stats,
);
