//! Support for movshare and stagevu links.

use crate::core::{Extractor, Fetcher};
use crate::extractors::common::{find_all, process_source_page};
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

const EMBED_SRC: &str = r#"param name="src" value="([^"]+)""#;
const STAGEVU_AVI: &str = r#"src="(https?://[^"]*?stagevu\.com/v/[^"]+/[^"]+?\.avi)""#;

pub struct MovshareExtractor;

impl MovshareExtractor {
    pub fn new() -> Self {
        Self
    }

    fn find_streams(html: &str) -> Result<Vec<String>> {
        let streams = find_all(EMBED_SRC, html)?;
        if !streams.is_empty() {
            return Ok(streams);
        }
        find_all(STAGEVU_AVI, html)
    }
}

impl Default for MovshareExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for MovshareExtractor {
    fn name(&self) -> &'static str {
        "movshare"
    }

    async fn resolve(&self, page: &str, fetcher: &dyn Fetcher) -> Result<Vec<String>> {
        let streams = process_source_page(page, fetcher, Self::find_streams).await?;
        debug!("Streams found: {:?}", streams);
        Ok(streams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_streams_prefers_embed_param() {
        let html = r#"<object><param name="src" value="http://s1.movshare.net/dl/abc.avi"></object>"#;
        assert_eq!(
            MovshareExtractor::find_streams(html).unwrap(),
            vec!["http://s1.movshare.net/dl/abc.avi"]
        );
    }

    #[test]
    fn test_find_streams_stagevu() {
        let html = r#"<embed src="http://n1.stagevu.com/v/0a1b2c/xyz/movie.avi" />"#;
        assert_eq!(
            MovshareExtractor::find_streams(html).unwrap(),
            vec!["http://n1.stagevu.com/v/0a1b2c/xyz/movie.avi"]
        );
    }
}
