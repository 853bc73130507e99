use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use dlmate_core::models::media::ExtractionResult;
use dlmate_core::{DlMateError, Platform};
use futures::future::{BoxFuture, FutureExt, Shared};

use super::cache::{CacheKey, ResultCache};
use super::retry::RetryPolicy;
use super::validator;
use crate::platforms::traits::Extractor;

type Outcome = Result<Arc<ExtractionResult>, DlMateError>;
type Pending = Shared<BoxFuture<'static, Outcome>>;
type InFlight = Arc<Mutex<HashMap<CacheKey, Pending>>>;

enum Lookup {
    Hit(Arc<ExtractionResult>),
    Wait(Pending),
}

fn lock(in_flight: &InFlight) -> MutexGuard<'_, HashMap<CacheKey, Pending>> {
    in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// validate -> cache lookup -> extract (with retries) -> cache store.
///
/// Concurrent misses for the same key share one extraction. Failures reach
/// every waiter and are never cached.
pub struct Pipeline {
    cache: Arc<ResultCache>,
    retry: RetryPolicy,
    in_flight: InFlight,
}

impl Pipeline {
    pub fn new(cache: Arc<ResultCache>, retry: RetryPolicy) -> Self {
        Self {
            cache,
            retry,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    pub fn in_flight_count(&self) -> usize {
        lock(&self.in_flight).len()
    }

    pub async fn execute(&self, url: &str, extractor: Arc<dyn Extractor>) -> Outcome {
        let platform = extractor.platform();

        if !validator::validate(url, platform)? {
            return Err(DlMateError::InvalidUrl { platform });
        }

        let key = CacheKey::new(platform, url);
        let target = with_scheme(url.trim());

        // the resolver stores before it clears its marker, so under this lock
        // a finished extraction is always visible in one of the two
        let lookup = {
            let mut in_flight = lock(&self.in_flight);
            if let Some(hit) = self.cache.get(&key) {
                Lookup::Hit(hit)
            } else if let Some(pending) = in_flight.get(&key) {
                tracing::debug!("[pipeline] joining in-flight extraction for {}", key);
                Lookup::Wait(pending.clone())
            } else {
                tracing::debug!("[pipeline] cache miss for {}", key);
                let pending = resolve(
                    self.cache.clone(),
                    self.in_flight.clone(),
                    self.retry.clone(),
                    extractor,
                    key.clone(),
                    target,
                )
                .boxed()
                .shared();
                in_flight.insert(key.clone(), pending.clone());
                Lookup::Wait(pending)
            }
        };

        match lookup {
            Lookup::Hit(hit) => {
                tracing::debug!("[pipeline] cache hit for {}", key);
                Ok(hit)
            }
            Lookup::Wait(pending) => pending.await,
        }
    }
}

async fn resolve(
    cache: Arc<ResultCache>,
    in_flight: InFlight,
    retry: RetryPolicy,
    extractor: Arc<dyn Extractor>,
    key: CacheKey,
    url: String,
) -> Outcome {
    let platform = key.platform;

    let outcome = retry
        .run(platform.as_str(), || {
            let extractor = extractor.clone();
            let url = url.clone();
            async move { extractor.extract(&url).await }
        })
        .await
        .and_then(|result| check_result(platform, result));

    match &outcome {
        Ok(result) => cache.set(key.clone(), result.clone()),
        Err(e) => tracing::debug!("[pipeline] extraction failed for {}: {}", key, e),
    }

    lock(&in_flight).remove(&key);
    outcome
}

/// Patterns accept scheme-less input; extractors always get an absolute URL.
fn with_scheme(url: &str) -> String {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

fn check_result(platform: Platform, result: ExtractionResult) -> Outcome {
    if result.platform() != platform {
        return Err(DlMateError::malformed(
            platform,
            format!("extractor returned a {} result", result.platform()),
        ));
    }
    if !result.has_media() {
        return Err(DlMateError::NoDownloadLinksFound { platform });
    }
    Ok(Arc::new(result))
}
