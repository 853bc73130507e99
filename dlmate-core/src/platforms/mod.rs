use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DlMateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    TikTok,
    YouTube,
    X,
    LinkedIn,
    Instagram,
    Pinterest,
}

impl Platform {
    pub const ALL: [Platform; 6] = [
        Platform::TikTok,
        Platform::YouTube,
        Platform::X,
        Platform::LinkedIn,
        Platform::Instagram,
        Platform::Pinterest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::TikTok => "tiktok",
            Platform::YouTube => "youtube",
            Platform::X => "x",
            Platform::LinkedIn => "linkedin",
            Platform::Instagram => "instagram",
            Platform::Pinterest => "pinterest",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = DlMateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tiktok" => Ok(Platform::TikTok),
            "youtube" => Ok(Platform::YouTube),
            "x" | "twitter" => Ok(Platform::X),
            "linkedin" => Ok(Platform::LinkedIn),
            "instagram" => Ok(Platform::Instagram),
            "pinterest" => Ok(Platform::Pinterest),
            _ => Err(DlMateError::UnsupportedPlatform(s.to_string())),
        }
    }
}
