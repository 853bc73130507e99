use std::collections::HashMap;
use std::sync::LazyLock;

use dlmate_core::{DlMateError, Platform};
use regex::Regex;

const URL_PATTERNS: &[(Platform, &str)] = &[
    (
        Platform::TikTok,
        r"(?i)^(https?://)?([a-z0-9-]+\.)?tiktok\.com/.+$",
    ),
    (
        Platform::YouTube,
        r"(?i)^(https?://)?(www\.|m\.|music\.)?(youtube\.com|youtu\.be)/.+$",
    ),
    (
        Platform::X,
        r"(?i)^(https?://)?(www\.|mobile\.)?(x\.com|twitter\.com)/[^/]+/status/\d+",
    ),
    (
        Platform::LinkedIn,
        r"(?i)^(https?://)?([a-z]{2,3}\.)?linkedin\.com/.+$",
    ),
    (
        Platform::Instagram,
        r"(?i)^(https?://)?(www\.)?(instagram\.com|instagr\.am)/([A-Za-z0-9_.]+/)?(p|reel|reels|tv)/[A-Za-z0-9_-]+",
    ),
    (
        Platform::Pinterest,
        r"(?i)^(https?://)?(([a-z]{2}|www)\.)?(pinterest\.[a-z]{2,3}(\.[a-z]{2})?/pin/[^/?#]+|pin\.it/[A-Za-z0-9]+)",
    ),
];

static PATTERNS: LazyLock<HashMap<Platform, Regex>> = LazyLock::new(|| {
    URL_PATTERNS
        .iter()
        .map(|(platform, pattern)| (*platform, Regex::new(pattern).expect("static URL pattern")))
        .collect()
});

/// Structural check only: no network resolution, no existence check.
pub fn validate(url: &str, platform: Platform) -> Result<bool, DlMateError> {
    let pattern = PATTERNS
        .get(&platform)
        .ok_or_else(|| DlMateError::UnsupportedPlatform(platform.to_string()))?;
    Ok(pattern.is_match(url.trim()))
}

pub fn validate_tag(url: &str, tag: &str) -> Result<bool, DlMateError> {
    let platform: Platform = tag.parse()?;
    validate(url, platform)
}
