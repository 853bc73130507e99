pub mod client;
pub mod core;
pub mod platforms;
pub mod storage;

pub use crate::client::{CacheScope, DlMate};
pub use crate::core::cache::CacheStats;
pub use dlmate_core::models;
pub use dlmate_core::models::media::ExtractionResult;
pub use dlmate_core::models::settings::ClientConfig;
pub use dlmate_core::{DlMateError, Platform, Result};
