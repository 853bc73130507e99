use std::future::Future;

use dlmate_core::{DlMateError, Platform};
use futures::future::join_all;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatVariant {
    #[serde(rename = "type")]
    pub kind: String,
    pub quality: String,
}

impl FormatVariant {
    pub fn new(kind: &str, quality: &str) -> Self {
        Self {
            kind: kind.to_string(),
            quality: quality.to_string(),
        }
    }
}

/// Resolves every variant concurrently against one backend.
///
/// Best effort: a failed variant is logged and left out, and the output keeps
/// the request order of the variants that succeeded. All variants failing
/// yields an empty list, not an error. In-flight siblings are not cancelled.
pub async fn extract_formats<T, F, Fut>(
    platform: Platform,
    variants: &[FormatVariant],
    fetch: F,
) -> Vec<T>
where
    F: Fn(FormatVariant) -> Fut,
    Fut: Future<Output = Result<T, DlMateError>>,
{
    let outcomes = join_all(variants.iter().cloned().map(&fetch)).await;

    outcomes
        .into_iter()
        .zip(variants)
        .filter_map(|(outcome, variant)| match outcome {
            Ok(format) => Some(format),
            Err(e) => {
                tracing::warn!(
                    platform = %platform,
                    "format {}/{} unavailable: {}",
                    variant.kind,
                    variant.quality,
                    e
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn variants() -> Vec<FormatVariant> {
        vec![
            FormatVariant::new("mp3", "128"),
            FormatVariant::new("mp3", "320"),
            FormatVariant::new("mp4", "720"),
            FormatVariant::new("mp4", "1080"),
        ]
    }

    #[tokio::test]
    async fn partial_failure_keeps_successes_in_order() {
        let formats = extract_formats(Platform::YouTube, &variants(), |v| async move {
            if v.quality == "320" || v.quality == "720" {
                Err(DlMateError::malformed(Platform::YouTube, "no url"))
            } else {
                Ok(format!("{}-{}", v.kind, v.quality))
            }
        })
        .await;

        assert_eq!(formats, vec!["mp3-128".to_string(), "mp4-1080".to_string()]);
    }

    #[tokio::test]
    async fn total_failure_is_an_empty_list() {
        let formats: Vec<String> = extract_formats(Platform::YouTube, &variants(), |_| async {
            Err(DlMateError::upstream(Platform::YouTube, Some(500), "HTTP 500"))
        })
        .await;

        assert!(formats.is_empty());
    }

    #[tokio::test]
    async fn variants_are_requested_concurrently() {
        // every fetch waits for all four to start; sequential fetching would hang
        let barrier = Arc::new(tokio::sync::Barrier::new(4));
        let started = Arc::new(AtomicUsize::new(0));

        let variants = variants();
        let run = extract_formats(Platform::YouTube, &variants, |v| {
            let barrier = barrier.clone();
            let started = started.clone();
            async move {
                started.fetch_add(1, Ordering::SeqCst);
                barrier.wait().await;
                Ok::<_, DlMateError>(v.quality)
            }
        });

        let formats = tokio::time::timeout(Duration::from_secs(5), run)
            .await
            .expect("variants should run concurrently");

        assert_eq!(started.load(Ordering::SeqCst), 4);
        assert_eq!(formats.len(), 4);
    }

    #[tokio::test]
    async fn slow_variant_does_not_reorder_results() {
        let formats = extract_formats(Platform::YouTube, &variants(), |v| async move {
            if v.quality == "128" {
                tokio::time::sleep(Duration::from_millis(30)).await;
            }
            Ok::<_, DlMateError>(v.quality)
        })
        .await;

        assert_eq!(formats, vec!["128", "320", "720", "1080"]);
    }
}
