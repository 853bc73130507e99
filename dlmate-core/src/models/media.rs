use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platforms::Platform;

/// Platform-shaped extraction payload, tagged by the platform it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum ExtractionResult {
    TikTok(TikTokResult),
    YouTube(YouTubeResult),
    X(XResult),
    LinkedIn(LinkedInResult),
    Instagram(InstagramResult),
    Pinterest(PinterestResult),
}

impl ExtractionResult {
    pub fn platform(&self) -> Platform {
        match self {
            ExtractionResult::TikTok(_) => Platform::TikTok,
            ExtractionResult::YouTube(_) => Platform::YouTube,
            ExtractionResult::X(_) => Platform::X,
            ExtractionResult::LinkedIn(_) => Platform::LinkedIn,
            ExtractionResult::Instagram(_) => Platform::Instagram,
            ExtractionResult::Pinterest(_) => Platform::Pinterest,
        }
    }

    pub fn media_urls(&self) -> Vec<&str> {
        match self {
            ExtractionResult::TikTok(r) => r
                .video
                .iter()
                .chain(r.audio.iter())
                .map(String::as_str)
                .collect(),
            ExtractionResult::YouTube(r) => r.formats.iter().map(|f| f.url.as_str()).collect(),
            ExtractionResult::X(r) => r.downloads.iter().map(|d| d.url.as_str()).collect(),
            ExtractionResult::LinkedIn(r) => r.downloads.iter().map(|d| d.url.as_str()).collect(),
            ExtractionResult::Instagram(r) => r
                .video
                .iter()
                .chain(r.image.iter())
                .map(String::as_str)
                .collect(),
            ExtractionResult::Pinterest(r) => r
                .video
                .iter()
                .chain(r.image.iter())
                .map(String::as_str)
                .collect(),
        }
    }

    /// A result without a single non-empty media URL is not a usable success.
    pub fn has_media(&self) -> bool {
        self.media_urls().iter().any(|u| !u.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TikTokResult {
    pub title: String,
    pub title_audio: String,
    pub thumbnail: String,
    pub video: Vec<String>,
    pub audio: Vec<String>,
    pub metadata: TikTokMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TikTokMetadata {
    pub duration: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub views: u64,
    pub likes: u64,
    pub shares: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YouTubeResult {
    pub video_id: String,
    pub formats: Vec<YouTubeFormat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YouTubeFormat {
    pub url: String,
    pub quality: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XResult {
    pub title: Option<String>,
    pub downloads: Vec<XDownload>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XDownload {
    pub quality: XQuality,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum XQuality {
    #[serde(rename = "HD")]
    Hd,
    #[serde(rename = "SD")]
    Sd,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedInResult {
    pub title: String,
    pub downloads: Vec<LinkedInVideo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedInVideo {
    pub url: String,
    pub quality: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstagramResult {
    pub title: Option<String>,
    pub video: Option<String>,
    pub image: Option<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinterestResult {
    pub title: Option<String>,
    pub video: Option<String>,
    pub image: Option<String>,
    pub thumbnail: Option<String>,
    pub metadata: PinterestMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PinterestMetadata {
    pub description: Option<String>,
}
