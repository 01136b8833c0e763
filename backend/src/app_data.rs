use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;

use crate::cache::ChapterCache;
use crate::db::open_corpus_db;
use crate::fetch::{FetchChapter, HttpFetcher};
use crate::stats::StatsAggregator;
use crate::CORPUS_DB_FILENAME;

/// Composition root for the verse subsystem. Constructed once by the
/// application (web front end or CLI) and passed by reference to request
/// handlers; consumers call the cache and aggregator and never touch the
/// fetcher or parser directly.
pub struct AppData {
    pub cache: Arc<ChapterCache>,
    pub stats: StatsAggregator,
}

impl AppData {
    pub fn new(data_dir: &Path) -> Result<Self> {
        Self::with_fetcher(data_dir, Box::new(HttpFetcher))
    }

    /// Same wiring with a caller-supplied fetcher; tests use this to
    /// substitute scripted responses.
    pub fn with_fetcher(
        data_dir: &Path,
        fetcher: Box<dyn FetchChapter + Send + Sync>,
    ) -> Result<Self> {
        dotenv().ok();

        let db = open_corpus_db(&data_dir.join(CORPUS_DB_FILENAME))?;
        let cache = Arc::new(ChapterCache::new(db, fetcher));
        let stats = StatsAggregator::new(cache.clone());

        Ok(AppData { cache, stats })
    }
}
