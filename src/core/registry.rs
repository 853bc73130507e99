use std::collections::HashMap;
use std::sync::Arc;

use dlmate_core::Platform;

use super::validator;
use crate::platforms::traits::Extractor;

pub struct ExtractorRegistry {
    extractors: HashMap<Platform, Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// Replaces any extractor already registered for the same platform.
    pub fn register(&mut self, extractor: Arc<dyn Extractor>) {
        self.extractors.insert(extractor.platform(), extractor);
    }

    pub fn get(&self, platform: Platform) -> Option<Arc<dyn Extractor>> {
        self.extractors.get(&platform).cloned()
    }

    pub fn platforms(&self) -> Vec<Platform> {
        let mut platforms: Vec<Platform> = self.extractors.keys().copied().collect();
        platforms.sort();
        platforms
    }

    /// First registered platform whose URL pattern accepts `url`.
    pub fn find_platform(&self, url: &str) -> Option<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|p| self.extractors.contains_key(p))
            .find(|p| validator::validate(url, *p).unwrap_or(false))
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
