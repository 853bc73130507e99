use async_trait::async_trait;
use dlmate_core::models::media::ExtractionResult;
use dlmate_core::{DlMateError, Platform};

#[async_trait]
pub trait Extractor: Send + Sync {
    fn platform(&self) -> Platform;

    /// Turns an already validated URL into a fresh result. No caching here.
    async fn extract(&self, url: &str) -> Result<ExtractionResult, DlMateError>;
}
