use crate::core::{Extractor, Fetcher};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Tries every known extractor against a page, in priority order.
///
/// Used for hosts without a dedicated extractor. The first non-empty result wins,
/// failures of individual extractors are logged and skipped.
pub struct LoopingExtractor {
    extractors: Vec<Arc<dyn Extractor>>,
}

impl LoopingExtractor {
    pub fn new(extractors: Vec<Arc<dyn Extractor>>) -> Self {
        Self { extractors }
    }
}

#[async_trait]
impl Extractor for LoopingExtractor {
    fn name(&self) -> &'static str {
        "looping"
    }

    async fn resolve(&self, page: &str, fetcher: &dyn Fetcher) -> Result<Vec<String>> {
        for extractor in &self.extractors {
            debug!("Attempting to resolve links with the '{}' resolver", extractor.name());
            match extractor.resolve(page, fetcher).await {
                Ok(links) if !links.is_empty() => {
                    debug!("Successfully resolved to: {:?}", links);
                    return Ok(links);
                }
                Ok(_) => debug!("The '{}' resolver found no links", extractor.name()),
                Err(e) => warn!("Failed to resolve links with the '{}' resolver: {:#}", extractor.name(), e),
            }
        }
        Ok(Vec::new())
    }
}
