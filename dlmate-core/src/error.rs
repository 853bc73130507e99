use thiserror::Error;

use crate::platforms::Platform;

/// Failure kinds surfaced to callers of the client.
///
/// `Clone` so one in-flight extraction can hand the same outcome to every
/// caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DlMateError {
    #[error("Invalid {platform} URL")]
    InvalidUrl { platform: Platform },

    #[error("{platform} upstream error: {message}")]
    Upstream {
        platform: Platform,
        status: Option<u16>,
        message: String,
    },

    #[error("{platform}: no download links found")]
    NoDownloadLinksFound { platform: Platform },

    #[error("{platform}: malformed response: {detail}")]
    MalformedResponse { platform: Platform, detail: String },

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),
}

impl DlMateError {
    pub fn upstream(platform: Platform, status: Option<u16>, message: impl Into<String>) -> Self {
        DlMateError::Upstream {
            platform,
            status,
            message: message.into(),
        }
    }

    pub fn malformed(platform: Platform, detail: impl Into<String>) -> Self {
        DlMateError::MalformedResponse {
            platform,
            detail: detail.into(),
        }
    }

    pub fn platform(&self) -> Option<Platform> {
        match self {
            DlMateError::InvalidUrl { platform }
            | DlMateError::Upstream { platform, .. }
            | DlMateError::NoDownloadLinksFound { platform }
            | DlMateError::MalformedResponse { platform, .. } => Some(*platform),
            DlMateError::UnsupportedPlatform(_) => None,
        }
    }

    /// Network failures, timeouts, 408, 429 and 5xx are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            DlMateError::Upstream { status: None, .. } => true,
            DlMateError::Upstream {
                status: Some(code), ..
            } => *code == 408 || *code == 429 || (500..600).contains(code),
            _ => false,
        }
    }
}
