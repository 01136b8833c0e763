use std::collections::HashMap;

use ramayana_backend::types::Language;

mod helpers;
use helpers as h;

#[test]
fn test_volume_totals_stop_at_first_empty_chapter() {
    let fetcher = h::MapFetcher::new(HashMap::new());
    let (_dir, app) = h::test_app(Box::new(fetcher.clone()));

    // Chapter 5 reporting zero signals the end of the volume
    for (chapter, count) in [(1, 10), (2, 12), (3, 9), (4, 11), (5, 0)] {
        app.stats
            .record_chapter_count(3, chapter, count)
            .expect("record failed");
    }

    let totals = app
        .stats
        .volume_totals(3, Language::Telugu)
        .expect("volume_totals failed");
    assert_eq!(totals, (4, 42));

    // Everything was answered from chapter_stats
    assert_eq!(fetcher.call_count(), 0);

    // And the derived row is persisted for the next call
    let row = app
        .cache
        .db()
        .get_volume_stats(3)
        .expect("read failed")
        .expect("volume_stats row missing");
    assert_eq!(row.total_chapters, 4);
    assert_eq!(row.total_verses, 42);
}

#[test]
fn test_chapter_count_lazy_materialization() {
    let mut pages = HashMap::new();
    pages.insert((1, 1), h::page_with_verses(1, 1, 2));
    let fetcher = h::MapFetcher::new(pages);
    let (_dir, app) = h::test_app(Box::new(fetcher.clone()));

    let count = app
        .stats
        .chapter_count(1, 1, Language::Telugu)
        .expect("chapter_count failed");
    assert_eq!(count, 2);
    assert_eq!(fetcher.call_count(), 1);

    // The count is now persisted; no further fetching
    let count = app
        .stats
        .chapter_count(1, 1, Language::Telugu)
        .expect("chapter_count failed");
    assert_eq!(count, 2);
    assert_eq!(fetcher.call_count(), 1);

    // The fetched chapter itself got cached on the way
    let cached = app.cache.get(1, 1).expect("get failed").expect("chapter absent");
    assert_eq!(cached.len(), 2);
}

#[test]
fn test_chapter_count_records_zero_for_empty_chapter() {
    let fetcher = h::MapFetcher::new(HashMap::new());
    let (_dir, app) = h::test_app(Box::new(fetcher.clone()));

    let count = app
        .stats
        .chapter_count(2, 99, Language::Telugu)
        .expect("chapter_count failed");
    assert_eq!(count, 0);
    assert_eq!(fetcher.call_count(), 1);

    // Zero is recorded, so the stats path never re-fetches the chapter
    let count = app
        .stats
        .chapter_count(2, 99, Language::Telugu)
        .expect("chapter_count failed");
    assert_eq!(count, 0);
    assert_eq!(fetcher.call_count(), 1);
}

#[test]
fn test_progress_within_volume_starts_at_zero() {
    let fetcher = h::MapFetcher::new(HashMap::new());
    let (_dir, app) = h::test_app(Box::new(fetcher));

    let progress = app
        .stats
        .progress_within_volume(2, 1, 0, Language::Telugu)
        .expect("progress failed");
    assert_eq!(progress, 0);
}

#[test]
fn test_progress_within_volume_is_strictly_increasing() {
    let fetcher = h::MapFetcher::new(HashMap::new());
    let (_dir, app) = h::test_app(Box::new(fetcher));

    let counts = [(1u32, 3u32), (2, 4), (3, 2)];
    for (chapter, count) in counts {
        app.stats
            .record_chapter_count(2, chapter, count as i32)
            .expect("record failed");
    }

    // Walk every reader position in lexicographic (chapter, verse) order
    let mut positions = vec![(1u32, 0u32)];
    for (chapter, count) in counts {
        for verse in 1..=count {
            positions.push((chapter, verse));
        }
    }

    let mut last: i64 = -1;
    for (chapter, verse) in positions {
        let progress = app
            .stats
            .progress_within_volume(2, chapter, verse, Language::Telugu)
            .expect("progress failed");
        assert!(
            progress > last,
            "progress not increasing at chapter {} verse {}: {} <= {}",
            chapter,
            verse,
            progress,
            last
        );
        last = progress;
    }

    // Full volume walk ends at the verse total
    assert_eq!(last, 9);
}

#[test]
fn test_progress_within_corpus_adds_earlier_volumes() {
    let fetcher = h::MapFetcher::new(HashMap::new());
    let (_dir, app) = h::test_app(Box::new(fetcher.clone()));

    // Volume 1 has chapters of 2 and 3 verses; chapter 3 ends the volume
    for (chapter, count) in [(1, 2), (2, 3), (3, 0)] {
        app.stats
            .record_chapter_count(1, chapter, count)
            .expect("record failed");
    }
    // Volume 2, chapter 1 is where the reader stands
    app.stats
        .record_chapter_count(2, 1, 8)
        .expect("record failed");

    let progress = app
        .stats
        .progress_within_corpus(2, 1, 4, Language::Telugu)
        .expect("progress failed");
    // 5 verses of volume 1, plus 4 into volume 2
    assert_eq!(progress, 9);
    assert_eq!(fetcher.call_count(), 0);
}
