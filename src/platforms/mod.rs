use std::sync::Arc;

pub use dlmate_core::platforms::Platform;

use crate::core::http_client::HttpClient;
use traits::Extractor;

pub mod traits;

pub mod instagram;
pub mod linkedin;
pub mod pinterest;
pub mod tiktok;
pub mod twitter;
pub mod youtube;

/// One extractor per supported platform, all sharing `http`.
pub fn default_extractors(http: Arc<dyn HttpClient>) -> Vec<Arc<dyn Extractor>> {
    vec![
        Arc::new(tiktok::TikTokExtractor::new(http.clone())),
        Arc::new(youtube::YouTubeExtractor::new(http.clone())),
        Arc::new(twitter::XExtractor::new(http.clone())),
        Arc::new(linkedin::LinkedInExtractor::new(http.clone())),
        Arc::new(instagram::InstagramExtractor::new(http.clone())),
        Arc::new(pinterest::PinterestExtractor::new(http)),
    ]
}
