use crate::types::{ChapterError, Language};

/// The one upstream endpoint serving chapter pages.
pub static BASE_URL: &'static str = "https://www.valmiki.iitk.ac.in/sloka";

/// Seam between the cache and the network. The cache owns a boxed
/// implementation; tests substitute a scripted one.
pub trait FetchChapter {
    /// Fetch the raw HTML document for one chapter. No caching and no
    /// retries here; the cache layers on top.
    fn fetch_chapter(
        &self,
        volume: u32,
        chapter: u32,
        lang: Language,
    ) -> Result<String, ChapterError>;
}

pub fn chapter_url(volume: u32, chapter: u32, lang: Language) -> String {
    format!(
        "{}?field_kanda_tid={}&language={}&field_sarga_value={}",
        BASE_URL,
        volume,
        lang.as_code(),
        chapter
    )
}

/// Blocking HTTP fetcher against the fixed upstream endpoint.
pub struct HttpFetcher;

impl FetchChapter for HttpFetcher {
    fn fetch_chapter(
        &self,
        volume: u32,
        chapter: u32,
        lang: Language,
    ) -> Result<String, ChapterError> {
        let url = chapter_url(volume, chapter, lang);

        match ureq::get(url.as_str()).call() {
            Ok(mut response) => {
                if response.status() != ureq::http::StatusCode::OK {
                    return Err(ChapterError::Fetch {
                        volume,
                        chapter,
                        reason: format!("HTTP status {}", response.status()),
                    });
                }

                match response.body_mut().read_to_string() {
                    Ok(body) => Ok(body),
                    Err(e) => Err(ChapterError::Fetch {
                        volume,
                        chapter,
                        reason: format!("failed to read response body: {}", e),
                    }),
                }
            }
            Err(ureq::Error::StatusCode(code)) => Err(ChapterError::Fetch {
                volume,
                chapter,
                reason: format!("HTTP status {}", code),
            }),
            Err(e) => Err(ChapterError::Fetch {
                volume,
                chapter,
                reason: e.to_string(),
            }),
        }
    }
}
