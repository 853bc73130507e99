use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use dlmate_core::models::media::{ExtractionResult, LinkedInResult, LinkedInVideo};
use dlmate_core::{DlMateError, Platform};
use regex::Regex;
use serde::Deserialize;

use crate::core::html::{HtmlDocument, HtmlQuery};
use crate::core::http_client::{HttpClient, HttpRequest};
use crate::platforms::traits::Extractor;

// media URLs look like .../mp4-720p-30fp-crf28/... with the quality second
static QUALITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\w*?)-(\w*?)-(\w*?)-").expect("static quality pattern"));

#[derive(Debug, Deserialize)]
struct VideoSource {
    src: String,
}

pub struct LinkedInExtractor {
    http: Arc<dyn HttpClient>,
}

impl LinkedInExtractor {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

fn quality_of(src: &str) -> Option<String> {
    QUALITY_RE
        .captures(src)
        .and_then(|c| c.get(2))
        .map(|m| m.as_str())
        .filter(|q| !q.is_empty())
        .map(str::to_string)
}

/// Reads every `video[data-sources]` element of a post page.
fn parse_post(markup: &str) -> LinkedInResult {
    let doc = HtmlDocument::parse(markup);

    let downloads = doc
        .attrs("video[data-sources]", "data-sources")
        .iter()
        .filter_map(|raw| match serde_json::from_str::<Vec<VideoSource>>(raw) {
            Ok(sources) => Some(sources),
            Err(e) => {
                tracing::warn!("[linkedin] skipping unreadable data-sources: {}", e);
                None
            }
        })
        .flatten()
        .filter(|s| !s.src.trim().is_empty())
        .map(|s| LinkedInVideo {
            quality: quality_of(&s.src),
            url: s.src,
        })
        .collect();

    let title = doc
        .meta("og:title")
        .or_else(|| doc.text("title"))
        .unwrap_or_else(|| "Untitled".to_string());

    LinkedInResult { title, downloads }
}

#[async_trait]
impl Extractor for LinkedInExtractor {
    fn platform(&self) -> Platform {
        Platform::LinkedIn
    }

    async fn extract(&self, url: &str) -> Result<ExtractionResult, DlMateError> {
        let response = self
            .http
            .send(HttpRequest::get(url).header("Accept", "text/html,application/xhtml+xml"))
            .await
            .map_err(|e| e.into_upstream(Platform::LinkedIn))?;

        let result = parse_post(&response.body);
        if result.downloads.is_empty() {
            return Err(DlMateError::NoDownloadLinksFound {
                platform: Platform::LinkedIn,
            });
        }

        tracing::debug!("[linkedin] {} sources for {}", result.downloads.len(), url);
        Ok(ExtractionResult::LinkedIn(result))
    }
}
