//! Batch warm-up: populate chapter stats and verse content for the whole
//! corpus ahead of serving. Workers operate on disjoint (volume, chapter)
//! keys; a failed key is logged and skipped and never aborts its siblings.

use std::collections::HashSet;

use anyhow::Result;
use rayon::prelude::*;

use ramayana_backend::app_data::AppData;
use ramayana_backend::types::Language;

pub fn build_stats(
    app: &AppData,
    volumes: &[u32],
    max_chapter: u32,
    jobs: usize,
    lang: Language,
) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

    for &volume in volumes {
        let known: HashSet<u32> = app
            .cache
            .db()
            .chapter_counts_for_volume(volume)?
            .iter()
            .map(|row| row.chapter as u32)
            .collect();

        let pending: Vec<u32> = (1..=max_chapter)
            .filter(|c| !known.contains(c))
            .collect();

        if !known.is_empty() {
            println!("volume {}: using {} recorded chapters", volume, known.len());
        }
        println!("volume {}: scanning {} chapters with {} workers", volume, pending.len(), jobs);

        pool.install(|| {
            pending.par_iter().for_each(|&chapter| {
                match app.stats.chapter_count(volume, chapter, lang) {
                    Ok(count) if count > 0 => {
                        println!("volume {} chapter {}: {} verses", volume, chapter, count);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        eprintln!("skipping volume {} chapter {}: {}", volume, chapter, e);
                    }
                }
            });
        });

        // Totals from whatever was recorded: the corpus is gapless, so the
        // highest chapter with a positive count is the chapter total.
        let counts = app.cache.db().chapter_counts_for_volume(volume)?;
        let total_chapters = counts
            .iter()
            .filter(|row| row.verse_count > 0)
            .map(|row| row.chapter)
            .max()
            .unwrap_or(0);
        let total_verses: i32 = counts
            .iter()
            .filter(|row| row.chapter <= total_chapters)
            .map(|row| row.verse_count)
            .sum();

        if total_chapters > 0 {
            app.cache
                .db()
                .upsert_volume_stats(volume, total_chapters, total_verses)?;
            println!(
                "volume {} total: chapters={} verses={}",
                volume, total_chapters, total_verses
            );
        } else {
            println!("volume {}: no chapters found", volume);
        }
    }

    Ok(())
}

pub fn build_cache(app: &AppData, jobs: usize, lang: Language) -> Result<()> {
    let stats_rows = app.cache.db().all_chapter_stats()?;
    if stats_rows.is_empty() {
        println!("No chapters recorded in chapter_stats. Run build-stats first.");
        return Ok(());
    }

    // put() is transactional, so a chapter is either absent or complete;
    // pending means "stats expect verses, cache has none".
    let mut pending: Vec<(u32, u32)> = Vec::new();
    for row in &stats_rows {
        if row.verse_count <= 0 {
            continue;
        }
        let cached = app
            .cache
            .db()
            .chapter_verse_row_count(row.volume as u32, row.chapter as u32)?;
        if cached < row.verse_count as i64 {
            pending.push((row.volume as u32, row.chapter as u32));
        }
    }

    if pending.is_empty() {
        println!("All chapters are already cached.");
        return Ok(());
    }

    println!("Caching {} chapters with {} workers", pending.len(), jobs);

    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
    pool.install(|| {
        pending.par_iter().for_each(|&(volume, chapter)| {
            match app.cache.refresh(volume, chapter, lang) {
                Ok(records) => {
                    println!("Cached {}.{} ({} verses)", volume, chapter, records.len());
                }
                Err(e) => {
                    eprintln!("Failed {}.{}: {}", volume, chapter, e);
                }
            }
        });
    });

    Ok(())
}
