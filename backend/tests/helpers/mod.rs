use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempDir;

use ramayana_backend::app_data::AppData;
use ramayana_backend::fetch::FetchChapter;
use ramayana_backend::types::{ChapterError, Language};

/// Serves one fixed page body for every request and counts invocations.
#[derive(Clone)]
pub struct CountingFetcher {
    pub body: String,
    pub calls: Arc<AtomicUsize>,
}

impl CountingFetcher {
    #[allow(dead_code)]
    pub fn new(body: &str) -> Self {
        CountingFetcher {
            body: body.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FetchChapter for CountingFetcher {
    fn fetch_chapter(
        &self,
        _volume: u32,
        _chapter: u32,
        _lang: Language,
    ) -> Result<String, ChapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.body.clone())
    }
}

/// Maps (volume, chapter) keys to page bodies; unknown chapters get a page
/// with no verse blocks.
#[derive(Clone)]
pub struct MapFetcher {
    pub pages: Arc<HashMap<(u32, u32), String>>,
    pub calls: Arc<AtomicUsize>,
}

impl MapFetcher {
    #[allow(dead_code)]
    pub fn new(pages: HashMap<(u32, u32), String>) -> Self {
        MapFetcher {
            pages: Arc::new(pages),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FetchChapter for MapFetcher {
    fn fetch_chapter(
        &self,
        volume: u32,
        chapter: u32,
        _lang: Language,
    ) -> Result<String, ChapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = self
            .pages
            .get(&(volume, chapter))
            .cloned()
            .unwrap_or_else(|| "<html><body></body></html>".to_string());
        Ok(body)
    }
}

#[allow(dead_code)]
pub fn verse_block(number: &str, text_lines: &[&str], translation: &str) -> String {
    let body: String = text_lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i + 1 == text_lines.len() {
                format!("<p>{} ৷৷{}৷৷</p>", line, number)
            } else {
                format!("<p>{}</p>", line)
            }
        })
        .collect();

    format!(
        r#"<div class="views-row">
  <div class="views-field views-field-body"><div class="field-content">{}</div></div>
  <div class="views-field views-field-field-htetrans"><div class="field-content">రామః the prince,</div></div>
  <div class="views-field views-field-field-explanation"><div class="field-content">{}</div></div>
</div>"#,
        body, translation
    )
}

#[allow(dead_code)]
pub fn chapter_page(blocks: &[String]) -> String {
    format!(
        "<html><body><div class=\"view-content\">{}</div></body></html>",
        blocks.join("\n")
    )
}

/// A page with n verses numbered "{volume}.{chapter}.1" onwards.
#[allow(dead_code)]
pub fn page_with_verses(volume: u32, chapter: u32, n: u32) -> String {
    let blocks: Vec<String> = (1..=n)
        .map(|i| {
            verse_block(
                &format!("{}.{}.{}", volume, chapter, i),
                &["తొలి పాదం", "మలి పాదం"],
                &format!("Translation of verse {}.", i),
            )
        })
        .collect();
    chapter_page(&blocks)
}

#[allow(dead_code)]
pub fn test_app(fetcher: Box<dyn FetchChapter + Send + Sync>) -> (TempDir, AppData) {
    let dir = TempDir::new().expect("Can't create temp dir");
    let app = AppData::with_fetcher(dir.path(), fetcher).expect("Can't create AppData");
    (dir, app)
}
