use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use dlmate_core::models::media::{ExtractionResult, TikTokMetadata, TikTokResult};
use dlmate_core::{DlMateError, Platform};
use serde::Deserialize;

use crate::core::http_client::{HttpClient, HttpRequest};
use crate::platforms::traits::Extractor;

pub const TIKWM_BASE: &str = "https://www.tikwm.com";

#[derive(Debug, Deserialize)]
struct TikwmResponse {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<TikwmData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TikwmData {
    title: String,
    cover: String,
    play: String,
    music: String,
    music_info: Option<TikwmMusic>,
    duration: u64,
    create_time: i64,
    play_count: u64,
    digg_count: u64,
    share_count: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TikwmMusic {
    title: String,
}

pub struct TikTokExtractor {
    http: Arc<dyn HttpClient>,
    base_url: String,
}

impl TikTokExtractor {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self::with_base_url(http, TIKWM_BASE)
    }

    pub fn with_base_url(http: Arc<dyn HttpClient>, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// tikwm hands back site-relative paths for web requests.
    fn absolute(&self, path: &str) -> Option<String> {
        let path = path.trim();
        if path.is_empty() {
            None
        } else if path.starts_with("http://") || path.starts_with("https://") {
            Some(path.to_string())
        } else {
            Some(format!("{}{}", self.base_url, path))
        }
    }

    fn to_result(&self, data: TikwmData) -> TikTokResult {
        TikTokResult {
            title: data.title,
            title_audio: data.music_info.map(|m| m.title).unwrap_or_default(),
            thumbnail: self.absolute(&data.cover).unwrap_or_default(),
            video: self.absolute(&data.play).into_iter().collect(),
            audio: self.absolute(&data.music).into_iter().collect(),
            metadata: TikTokMetadata {
                duration: data.duration,
                created_at: DateTime::from_timestamp(data.create_time, 0)
                    .filter(|_| data.create_time > 0),
                views: data.play_count,
                likes: data.digg_count,
                shares: data.share_count,
            },
        }
    }
}

#[async_trait]
impl Extractor for TikTokExtractor {
    fn platform(&self) -> Platform {
        Platform::TikTok
    }

    async fn extract(&self, url: &str) -> Result<ExtractionResult, DlMateError> {
        let endpoint = format!("{}/api/", self.base_url);
        tracing::debug!("[tiktok] resolving {} via {}", url, endpoint);

        let request = HttpRequest::post_json(
            endpoint,
            serde_json::json!({
                "url": url,
                "count": 12,
                "cursor": 0,
                "web": 1,
                "hd": 1,
            }),
        );

        let response = self
            .http
            .send(request)
            .await
            .map_err(|e| e.into_upstream(Platform::TikTok))?;

        let parsed: TikwmResponse = serde_json::from_str(&response.body).map_err(|e| {
            tracing::warn!("[tiktok] JSON parse error: {}", e);
            DlMateError::malformed(Platform::TikTok, "Invalid response from TikTok API")
        })?;

        let data = parsed.data.ok_or_else(|| {
            let detail = match parsed.msg {
                Some(msg) if !msg.is_empty() => format!("Invalid response from TikTok API: {}", msg),
                _ => "Invalid response from TikTok API".to_string(),
            };
            DlMateError::malformed(Platform::TikTok, detail)
        })?;

        Ok(ExtractionResult::TikTok(self.to_result(data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http_client::{HttpError, RequestBody};
    use crate::core::testing::StubHttp;

    const API: &str = "https://www.tikwm.com/api/";
    const URL: &str = "https://www.tiktok.com/@lyricmate/video/7413647349991427334";

    const BODY: &str = r#"{
        "code": 0,
        "msg": "success",
        "data": {
            "title": "late night lyrics",
            "cover": "/video/cover/7413647349991427334.webp",
            "play": "/video/media/play/7413647349991427334.mp4",
            "music": "https://sf16.tiktokcdn.com/obj/music.mp3",
            "music_info": { "title": "original sound" },
            "duration": 14,
            "create_time": 1726171200,
            "play_count": 1200,
            "digg_count": 300,
            "share_count": 12
        }
    }"#;

    #[tokio::test]
    async fn maps_api_payload() {
        let http = Arc::new(StubHttp::new().ok(API, BODY));
        let extractor = TikTokExtractor::new(http.clone());

        let ExtractionResult::TikTok(result) = extractor.extract(URL).await.unwrap() else {
            panic!("expected a TikTok result");
        };

        assert_eq!(result.title, "late night lyrics");
        assert_eq!(result.title_audio, "original sound");
        assert_eq!(
            result.thumbnail,
            "https://www.tikwm.com/video/cover/7413647349991427334.webp"
        );
        assert_eq!(
            result.video,
            vec!["https://www.tikwm.com/video/media/play/7413647349991427334.mp4".to_string()]
        );
        assert_eq!(result.audio, vec!["https://sf16.tiktokcdn.com/obj/music.mp3".to_string()]);
        assert_eq!(result.metadata.duration, 14);
        assert_eq!(result.metadata.views, 1200);
        assert_eq!(result.metadata.likes, 300);
        assert_eq!(result.metadata.shares, 12);
        assert_eq!(
            result.metadata.created_at.map(|t| t.timestamp()),
            Some(1726171200)
        );
    }

    #[tokio::test]
    async fn posts_expected_json() {
        let http = Arc::new(StubHttp::new().ok(API, BODY));
        TikTokExtractor::new(http.clone()).extract(URL).await.unwrap();

        let request = &http.requests()[0];
        let Some(RequestBody::Json(body)) = &request.body else {
            panic!("expected a JSON body");
        };
        assert_eq!(body["url"], URL);
        assert_eq!(body["hd"], 1);
        assert_eq!(body["count"], 12);
    }

    #[tokio::test]
    async fn missing_data_is_malformed() {
        let http = Arc::new(StubHttp::new().ok(API, r#"{"code": -1, "msg": "Url parsing is failed!"}"#));
        let err = TikTokExtractor::new(http).extract(URL).await.unwrap_err();

        assert_eq!(
            err,
            DlMateError::malformed(
                Platform::TikTok,
                "Invalid response from TikTok API: Url parsing is failed!"
            )
        );
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let http = Arc::new(StubHttp::new().ok(API, "<html>blocked</html>"));
        let err = TikTokExtractor::new(http).extract(URL).await.unwrap_err();
        assert!(matches!(err, DlMateError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn transport_failure_is_upstream() {
        let http = Arc::new(StubHttp::new().fail(API, HttpError::Timeout));
        let err = TikTokExtractor::new(http).extract(URL).await.unwrap_err();
        assert_eq!(err, DlMateError::upstream(Platform::TikTok, None, "request timed out"));
    }

    #[tokio::test]
    async fn empty_play_path_yields_no_video() {
        let http = Arc::new(StubHttp::new().ok(API, r#"{"data": {"title": "x"}}"#));
        let result = TikTokExtractor::new(http).extract(URL).await.unwrap();
        assert!(!result.has_media());
    }
}
