use std::sync::Arc;

use dlmate_core::models::media::{
    ExtractionResult, InstagramResult, LinkedInResult, PinterestResult, TikTokResult, XResult,
    YouTubeResult,
};
use dlmate_core::models::settings::ClientConfig;
use dlmate_core::{DlMateError, Platform, Result};
use tokio_util::sync::CancellationToken;

use crate::core::cache::{CacheKey, CacheStats, ResultCache};
use crate::core::http_client::{HttpClient, ReqwestHttp};
use crate::core::pipeline::Pipeline;
use crate::core::registry::ExtractorRegistry;
use crate::core::retry::RetryPolicy;
use crate::platforms::default_extractors;
use crate::platforms::traits::Extractor;

/// Which cached results `clear_cache` drops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheScope {
    All,
    Platform(Platform),
    Entry(Platform, String),
}

/// Extraction client. Each instance owns its cache, so two clients never see
/// each other's results.
pub struct DlMate {
    config: ClientConfig,
    pipeline: Pipeline,
    registry: ExtractorRegistry,
    sweeper: CancellationToken,
}

impl DlMate {
    pub fn new(config: ClientConfig) -> Self {
        let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttp::new(&config));
        Self::with_http(config, http)
    }

    pub fn with_http(config: ClientConfig, http: Arc<dyn HttpClient>) -> Self {
        Self::with_extractors(config, default_extractors(http))
    }

    pub fn with_extractors(config: ClientConfig, extractors: Vec<Arc<dyn Extractor>>) -> Self {
        let cache = Arc::new(ResultCache::new(config.max_cache_entries, config.cache_ttl()));
        let sweeper = CancellationToken::new();

        // outside a runtime the sweep is skipped; reads still drop expired entries
        match (config.sweep_interval(), tokio::runtime::Handle::try_current()) {
            (Some(period), Ok(_)) => {
                cache.spawn_sweeper(period, sweeper.clone());
            }
            (Some(_), Err(_)) => {
                tracing::debug!("[dlmate] no tokio runtime, cache sweep disabled");
            }
            (None, _) => {}
        }

        let mut registry = ExtractorRegistry::new();
        for extractor in extractors {
            registry.register(extractor);
        }

        tracing::debug!(
            "[dlmate] client ready: ttl={}s, capacity={}, retries={}",
            config.cache_ttl_seconds,
            config.max_cache_entries,
            config.retries
        );

        Self {
            pipeline: Pipeline::new(cache, RetryPolicy::from_config(&config)),
            config,
            registry,
            sweeper,
        }
    }

    /// Replaces the extractor for its platform.
    pub fn register(&mut self, extractor: Arc<dyn Extractor>) {
        self.registry.register(extractor);
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn platforms(&self) -> Vec<Platform> {
        self.registry.platforms()
    }

    pub async fn extract(&self, platform: Platform, url: &str) -> Result<Arc<ExtractionResult>> {
        let extractor = self
            .registry
            .get(platform)
            .ok_or_else(|| DlMateError::UnsupportedPlatform(platform.to_string()))?;
        self.pipeline.execute(url, extractor).await
    }

    /// Same as [`extract`](Self::extract) with the platform given by name.
    pub async fn extract_tag(&self, tag: &str, url: &str) -> Result<Arc<ExtractionResult>> {
        let platform: Platform = tag.parse()?;
        self.extract(platform, url).await
    }

    /// Picks the platform from the URL itself.
    pub async fn extract_auto(&self, url: &str) -> Result<Arc<ExtractionResult>> {
        let platform = self
            .registry
            .find_platform(url)
            .ok_or_else(|| DlMateError::UnsupportedPlatform(url.to_string()))?;
        self.extract(platform, url).await
    }

    pub async fn tiktok(&self, url: &str) -> Result<TikTokResult> {
        match self.extract(Platform::TikTok, url).await?.as_ref() {
            ExtractionResult::TikTok(r) => Ok(r.clone()),
            other => Err(mismatch(Platform::TikTok, other)),
        }
    }

    pub async fn youtube(&self, url: &str) -> Result<YouTubeResult> {
        match self.extract(Platform::YouTube, url).await?.as_ref() {
            ExtractionResult::YouTube(r) => Ok(r.clone()),
            other => Err(mismatch(Platform::YouTube, other)),
        }
    }

    pub async fn x(&self, url: &str) -> Result<XResult> {
        match self.extract(Platform::X, url).await?.as_ref() {
            ExtractionResult::X(r) => Ok(r.clone()),
            other => Err(mismatch(Platform::X, other)),
        }
    }

    pub async fn linkedin(&self, url: &str) -> Result<LinkedInResult> {
        match self.extract(Platform::LinkedIn, url).await?.as_ref() {
            ExtractionResult::LinkedIn(r) => Ok(r.clone()),
            other => Err(mismatch(Platform::LinkedIn, other)),
        }
    }

    pub async fn instagram(&self, url: &str) -> Result<InstagramResult> {
        match self.extract(Platform::Instagram, url).await?.as_ref() {
            ExtractionResult::Instagram(r) => Ok(r.clone()),
            other => Err(mismatch(Platform::Instagram, other)),
        }
    }

    pub async fn pinterest(&self, url: &str) -> Result<PinterestResult> {
        match self.extract(Platform::Pinterest, url).await?.as_ref() {
            ExtractionResult::Pinterest(r) => Ok(r.clone()),
            other => Err(mismatch(Platform::Pinterest, other)),
        }
    }

    /// Drops cached results in `scope` and returns how many were removed.
    /// Extractions already in flight still store their result when they finish.
    pub fn clear_cache(&self, scope: CacheScope) -> usize {
        let cache = self.pipeline.cache();
        let removed = match &scope {
            CacheScope::All => cache.clear(),
            CacheScope::Platform(platform) => cache.delete_platform(*platform),
            CacheScope::Entry(platform, url) => {
                usize::from(cache.delete(&CacheKey::new(*platform, url.as_str())))
            }
        };
        tracing::info!("[dlmate] cleared {} cached result(s) for {:?}", removed, scope);
        removed
    }

    pub fn clear_all_cache(&self) -> usize {
        self.clear_cache(CacheScope::All)
    }

    pub fn clear_platform_cache(&self, platform: Platform) -> usize {
        self.clear_cache(CacheScope::Platform(platform))
    }

    pub fn clear_cache_entry(&self, platform: Platform, url: &str) -> usize {
        self.clear_cache(CacheScope::Entry(platform, url.to_string()))
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.pipeline.cache().stats()
    }
}

impl Default for DlMate {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl Drop for DlMate {
    fn drop(&mut self) {
        self.sweeper.cancel();
    }
}

fn mismatch(expected: Platform, got: &ExtractionResult) -> DlMateError {
    DlMateError::malformed(expected, format!("expected a {} result, got {}", expected, got.platform()))
}
