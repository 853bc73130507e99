use std::sync::Arc;

use async_trait::async_trait;
use dlmate_core::models::media::{ExtractionResult, XDownload, XQuality, XResult};
use dlmate_core::{DlMateError, Platform};

use crate::core::fallback::{
    extract_via_fallback, ExtractionRules, FieldRule, ScrapedMedia, ServiceDescriptor,
    ServiceRequest,
};
use crate::core::http_client::HttpClient;
use crate::platforms::traits::Extractor;

/// Both services may answer with either page layout (download table or
/// button list), so they share one ordered candidate list per field.
fn rules() -> ExtractionRules {
    ExtractionRules {
        title: vec![FieldRule::text("div:nth-child(1) > div:nth-child(2) > p")],
        primary_link: vec![
            FieldRule::attr("tr:nth-child(1) > td:nth-child(4) > a", "href"),
            FieldRule::attr("div:nth-child(1) > div.download-btn > a", "href"),
        ],
        secondary_link: vec![
            FieldRule::attr("tr:nth-child(2) > td:nth-child(4) > a", "href"),
            FieldRule::attr("div:nth-child(2) > .download-btn > a", "href"),
        ],
        thumbnail: vec![
            FieldRule::attr("img.thumbnail", "src"),
            FieldRule::attr("div.video-thumbnail img", "src"),
        ],
    }
}

fn form_service(name: &str, endpoint: &str) -> ServiceDescriptor {
    ServiceDescriptor {
        name: name.into(),
        endpoint: endpoint.into(),
        request: ServiceRequest::FormPost { field: "URL".into() },
        headers: Vec::new(),
        rules: rules(),
    }
}

/// twdown.net first, twdownload.dev second. Both take the tweet URL as the
/// `URL` form field and answer with an HTML page.
pub fn default_services() -> Vec<ServiceDescriptor> {
    vec![
        form_service("twdown", "https://twdown.net/download.php"),
        form_service("twdownload", "https://twdownload.dev/download"),
    ]
}

pub struct XExtractor {
    http: Arc<dyn HttpClient>,
    services: Vec<ServiceDescriptor>,
}

impl XExtractor {
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

fn to_result(media: ScrapedMedia) -> XResult {
    let downloads = [
        (XQuality::Hd, media.primary_link),
        (XQuality::Sd, media.secondary_link),
    ]
    .into_iter()
    .filter_map(|(quality, url)| url.map(|url| XDownload { quality, url }))
    .collect();

    XResult {
        title: media.title,
        downloads,
        thumbnail: media.thumbnail,
    }
}

#[async_trait]
impl Extractor for XExtractor {
    fn platform(&self) -> Platform {
        Platform::X
    }

    async fn extract(&self, url: &str) -> Result<ExtractionResult, DlMateError> {
        let media = extract_via_fallback(self.http.as_ref(), Platform::X, url, &self.services).await?;
        tracing::debug!("[x] links from {}", media.service);
        Ok(ExtractionResult::X(to_result(media)))
    }
}
