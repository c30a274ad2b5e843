use crate::core::{Extractor, Fetcher};
use crate::extractors::common::find_first;
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

pub struct ZshareExtractor;

impl ZshareExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ZshareExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for ZshareExtractor {
    fn name(&self) -> &'static str {
        "zshare"
    }

    async fn resolve(&self, page: &str, fetcher: &dyn Fetcher) -> Result<Vec<String>> {
        let tweety = find_first(
            r"(https?://tweetypie\.tvshack\.cc/zs/\?id=.+?)'",
            page,
            "zshare tweetypie link",
        )?;
        debug!("Got tweetypie page: {}", tweety);
        let download = fetcher.resolve_redirect(&tweety).await?;
        debug!("Got zshare player page: {}", download);
        Ok(vec![download])
    }
}
