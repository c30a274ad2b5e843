use crate::core::{Extractor, Fetcher};
use crate::extractors::common::find_first;
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

/// Resolves the tweetypie flash player used for 56.com, google video, tudou and veoh.
pub struct TweetyExtractor;

impl TweetyExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TweetyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for TweetyExtractor {
    fn name(&self) -> &'static str {
        "tweety"
    }

    async fn resolve(&self, page: &str, fetcher: &dyn Fetcher) -> Result<Vec<String>> {
        let player = find_first(r#"flashvars="file=(.+?)&type=flv"#, page, "tweetypie flash vars")?;
        // the player link redirects to the stream itself
        let url = fetcher.resolve_redirect(&player).await?;
        debug!("Resolved tweetypie: {}", url);
        Ok(vec![url])
    }
}
