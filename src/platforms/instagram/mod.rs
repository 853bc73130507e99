use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use dlmate_core::models::media::{ExtractionResult, InstagramResult};
use dlmate_core::{DlMateError, Platform};
use regex::Regex;

use crate::core::fallback::{
    extract_via_fallback, ExtractionRules, FieldRule, ServiceDescriptor, ServiceRequest,
};
use crate::core::http_client::HttpClient;
use crate::platforms::traits::Extractor;

static SHORTCODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:instagram\.com|instagr\.am)/(?:[A-Za-z0-9_.]+/)?(?:p|reel|reels|tv)/([A-Za-z0-9_-]+)")
        .expect("static shortcode pattern")
});

const BROWSER_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub fn extract_shortcode(url: &str) -> Option<String> {
    SHORTCODE_RE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn canonical_url(shortcode: &str) -> String {
    format!("https://www.instagram.com/p/{}/", shortcode)
}

fn browser_headers() -> Vec<(String, String)> {
    vec![
        ("User-Agent".into(), BROWSER_UA.into()),
        ("Accept".into(), "text/html,application/xhtml+xml".into()),
    ]
}

/// The captioned embed page first, then OpenGraph tags of the post page.
/// `primary_link` carries the video, `secondary_link` the image.
pub fn default_services() -> Vec<ServiceDescriptor> {
    vec![
        ServiceDescriptor {
            name: "embed".into(),
            endpoint: "{url}embed/captioned/".into(),
            request: ServiceRequest::Get,
            headers: browser_headers(),
            rules: ExtractionRules {
                title: vec![FieldRule::text(".Caption")],
                primary_link: vec![
                    FieldRule::attr("video", "src"),
                    FieldRule::attr("video source", "src"),
                ],
                secondary_link: vec![FieldRule::attr("img.EmbeddedMediaImage", "src")],
                thumbnail: vec![
                    FieldRule::attr("video", "poster"),
                    FieldRule::attr("img.EmbeddedMediaImage", "src"),
                ],
            },
        },
        ServiceDescriptor {
            name: "opengraph".into(),
            endpoint: "{url}".into(),
            request: ServiceRequest::Get,
            headers: browser_headers(),
            rules: ExtractionRules {
                title: vec![FieldRule::meta("og:title")],
                primary_link: vec![
                    FieldRule::meta("og:video"),
                    FieldRule::meta("og:video:secure_url"),
                ],
                secondary_link: vec![FieldRule::meta("og:image")],
                thumbnail: vec![FieldRule::meta("og:image")],
            },
        },
    ]
}

pub struct InstagramExtractor {
    http: Arc<dyn HttpClient>,
    services: Vec<ServiceDescriptor>,
}

impl InstagramExtractor {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            services: default_services(),
        }
    }

    pub fn with_services(mut self, services: Vec<ServiceDescriptor>) -> Self {
        self.services = services;
        self
    }
}

#[async_trait]
impl Extractor for InstagramExtractor {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn extract(&self, url: &str) -> Result<ExtractionResult, DlMateError> {
        let shortcode = extract_shortcode(url).ok_or(DlMateError::InvalidUrl {
            platform: Platform::Instagram,
        })?;
        let canonical = canonical_url(&shortcode);

        let media =
            extract_via_fallback(self.http.as_ref(), Platform::Instagram, &canonical, &self.services)
                .await?;
        tracing::debug!("[instagram] {} resolved via {}", shortcode, media.service);

        Ok(ExtractionResult::Instagram(InstagramResult {
            title: media.title,
            video: media.primary_link,
            image: media.secondary_link,
            thumbnail: media.thumbnail,
        }))
    }
}
