use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use dlmate_core::models::media::{ExtractionResult, PinterestMetadata, PinterestResult};
use dlmate_core::{DlMateError, Platform};
use regex::Regex;

use crate::core::html::{HtmlDocument, HtmlQuery};
use crate::core::http_client::{HttpClient, HttpRequest};
use crate::platforms::traits::Extractor;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

static PIN_NOT_FOUND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""__typename"\s*:\s*"PinNotFound""#).expect("static pin-not-found pattern")
});

static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"src="(https://i\.pinimg\.com/.*?\.(jpg|gif))""#).expect("static image pattern")
});

pub struct PinterestExtractor {
    http: Arc<dyn HttpClient>,
}

impl PinterestExtractor {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

/// HLS playlists sit next to a progressive 720p rendition.
fn progressive_url(src: &str) -> String {
    src.replace("/hls/", "/720p/").replace(".m3u8", ".mp4")
}

/// Largest pinimg image on the page: originals or 1200x beat the first hit.
fn best_image(html: &str) -> Option<String> {
    let mut best: Option<String> = None;
    for cap in IMAGE_RE.captures_iter(html) {
        if let Some(m) = cap.get(1) {
            let url = m.as_str();
            if best.is_none() || url.contains("originals") || url.contains("1200x") {
                best = Some(url.to_string());
            }
        }
    }
    best
}

fn parse_pin(html: &str) -> Result<PinterestResult, DlMateError> {
    if PIN_NOT_FOUND_RE.is_match(html) {
        return Err(DlMateError::malformed(Platform::Pinterest, "Pin not found"));
    }

    let doc = HtmlDocument::parse(html);
    let thumbnail = doc.meta("og:image");

    Ok(PinterestResult {
        title: doc.meta("og:title").or_else(|| doc.text("title")),
        video: doc.attr("video[src]", "src").map(|s| progressive_url(&s)),
        image: best_image(html).or_else(|| thumbnail.clone()),
        thumbnail,
        metadata: PinterestMetadata {
            description: doc.meta("og:description"),
        },
    })
}

#[async_trait]
impl Extractor for PinterestExtractor {
    fn platform(&self) -> Platform {
        Platform::Pinterest
    }

    async fn extract(&self, url: &str) -> Result<ExtractionResult, DlMateError> {
        let request = HttpRequest::get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", ACCEPT)
            .header("Accept-Language", "en-US,en;q=0.9");

        let response = self
            .http
            .send(request)
            .await
            .map_err(|e| e.into_upstream(Platform::Pinterest))?;

        if response.url != url {
            tracing::debug!("[pinterest] {} resolved to {}", url, response.url);
        }

        parse_pin(&response.body).map(ExtractionResult::Pinterest)
    }
}
