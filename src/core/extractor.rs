use crate::core::Fetcher;
use crate::extractors::{
    DivxdenExtractor, LoopingExtractor, MovshareExtractor, TvdexExtractor, TweetyExtractor,
    YouTubeExtractor, ZshareExtractor,
};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Pulls playable stream URLs out of one file host's page.
///
/// `Ok(vec![])` means the page had no links, an error means the page could not
/// be parsed by this extractor at all.
#[async_trait]
pub trait Extractor: Send + Sync {
    fn name(&self) -> &'static str;
    async fn resolve(&self, page: &str, fetcher: &dyn Fetcher) -> Result<Vec<String>>;
}

/// Host label to extractor dispatch table.
pub struct ExtractorRegistry {
    by_host: HashMap<String, Arc<dyn Extractor>>,
    /// Priority order used when a host has no dedicated extractor
    fallback_order: Vec<Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self {
            by_host: HashMap::new(),
            fallback_order: Vec::new(),
        }
    }

    /// The extractors for every file host the add-on knows about.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register_extractor(
            Arc::new(TweetyExtractor::new()),
            &["56", "google", "tudou.com", "veoh"],
        );
        registry.register_extractor(Arc::new(MovshareExtractor::new()), &["movshare", "stagevu.com"]);
        registry.register_extractor(Arc::new(YouTubeExtractor::new()), &["youtube"]);
        registry.register_extractor(Arc::new(DivxdenExtractor::new()), &["divxden"]);
        registry.register_extractor(Arc::new(TvdexExtractor::new()), &["tvdex.org"]);
        registry.register_extractor(Arc::new(ZshareExtractor::new()), &["zshare"]);
        registry
    }

    /// Registers an extractor for the given host labels. Registration order is
    /// the order the looping fallback tries extractors in.
    pub fn register_extractor(&mut self, extractor: Arc<dyn Extractor>, hosts: &[&str]) {
        for host in hosts {
            self.by_host.insert(host.to_string(), extractor.clone());
        }
        self.fallback_order.push(extractor);
    }

    pub fn is_supported(&self, host: &str) -> bool {
        self.by_host.contains_key(host)
    }

    pub fn hosts(&self) -> Vec<&str> {
        let mut hosts: Vec<&str> = self.by_host.keys().map(|h| h.as_str()).collect();
        hosts.sort_unstable();
        hosts
    }

    /// Never fails: unknown hosts get an extractor that tries every registered one.
    pub fn extractor_for(&self, host: &str) -> Arc<dyn Extractor> {
        match self.by_host.get(host) {
            Some(extractor) => extractor.clone(),
            None => {
                tracing::warn!("No resolver found for type: {}", host);
                Arc::new(self.looping())
            }
        }
    }

    pub fn looping(&self) -> LoopingExtractor {
        LoopingExtractor::new(self.fallback_order.clone())
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}
