use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use dlmate_core::models::media::{ExtractionResult, YouTubeFormat, YouTubeResult};
use dlmate_core::{DlMateError, Platform};
use regex::Regex;

use crate::core::formats::{extract_formats, FormatVariant};
use crate::core::http_client::{HttpClient, HttpRequest};
use crate::platforms::traits::Extractor;

pub const SAVESERVALL_ENDPOINT: &str = "https://api-cdn.saveservall.xyz/ajax-v2.php";

static VIDEO_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:https?://)?(?:www\.|m\.|music\.)?(?:youtube\.com/(?:shorts/|watch\?v=|music\?v=|embed/|v/|live/|.+/)|youtu\.be/)([a-zA-Z0-9_-]{11})",
    )
    .expect("static video id pattern")
});

fn is_video_id(s: &str) -> bool {
    s.len() == 11
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub fn extract_video_id(url: &str) -> Option<String> {
    // `watch?feature=share&v=...` style URLs only parse through the query
    if let Ok(parsed) = url::Url::parse(url) {
        if let Some(v) = parsed
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.to_string())
        {
            if is_video_id(&v) {
                return Some(v);
            }
        }
    }

    VIDEO_ID_RE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn default_variants() -> Vec<FormatVariant> {
    vec![
        FormatVariant::new("mp3", "128"),
        FormatVariant::new("mp3", "320"),
        FormatVariant::new("mp4", "720"),
        FormatVariant::new("mp4", "1080"),
    ]
}

pub struct YouTubeExtractor {
    http: Arc<dyn HttpClient>,
    endpoint: String,
    variants: Vec<FormatVariant>,
}

impl YouTubeExtractor {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            endpoint: SAVESERVALL_ENDPOINT.to_string(),
            variants: default_variants(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_variants(mut self, variants: Vec<FormatVariant>) -> Self {
        self.variants = variants;
        self
    }

    async fn fetch_format(
        &self,
        video_id: &str,
        variant: FormatVariant,
    ) -> Result<YouTubeFormat, DlMateError> {
        let request = HttpRequest::post_form(
            &self.endpoint,
            vec![
                ("videoid".to_string(), video_id.to_string()),
                ("downtype".to_string(), variant.kind.clone()),
                ("vquality".to_string(), variant.quality.clone()),
            ],
        );

        let response = self
            .http
            .send(request)
            .await
            .map_err(|e| e.into_upstream(Platform::YouTube))?;

        let json = response.json(Platform::YouTube)?;
        let url = json
            .get("url")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                DlMateError::malformed(
                    Platform::YouTube,
                    format!("Failed to get {} format", variant.kind),
                )
            })?;

        Ok(YouTubeFormat {
            url: url.to_string(),
            quality: variant.quality,
            kind: variant.kind,
        })
    }
}

#[async_trait]
impl Extractor for YouTubeExtractor {
    fn platform(&self) -> Platform {
        Platform::YouTube
    }

    async fn extract(&self, url: &str) -> Result<ExtractionResult, DlMateError> {
        let video_id = extract_video_id(url)
            .ok_or_else(|| DlMateError::malformed(Platform::YouTube, "Could not extract video ID"))?;

        tracing::debug!("[youtube] requesting {} formats for {}", self.variants.len(), video_id);

        let formats = extract_formats(Platform::YouTube, &self.variants, |variant| {
            self.fetch_format(&video_id, variant)
        })
        .await;

        Ok(ExtractionResult::YouTube(YouTubeResult { video_id, formats }))
    }
}
