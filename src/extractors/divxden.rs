use crate::core::{Extractor, Fetcher};
use crate::extractors::common::{find_all, process_source_page};
use crate::extractors::packer::unpack_page;
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

const FLV_PATTERN: &str = r#"\("file","([^"]+)"\)"#;
const FLV_ESCAPED_PATTERN: &str = r"\\'file\\',\\'([^\\]+)\\'";
const AVI_PATTERN: &str = r#"param name="src".?value="([^"]+)""#;

/// divxden keeps its player configuration in a packed script on the frame page.
pub struct DivxdenExtractor;

impl DivxdenExtractor {
    pub fn new() -> Self {
        Self
    }

    fn find_streams(html: &str) -> Result<Vec<String>> {
        let unpacked = unpack_page(html)?;

        for pattern in [FLV_PATTERN, FLV_ESCAPED_PATTERN, AVI_PATTERN] {
            let found = find_all(pattern, &unpacked)?;
            if !found.is_empty() {
                return Ok(found);
            }
            debug!("No links for pattern {}", pattern);
        }
        Ok(Vec::new())
    }
}

impl Default for DivxdenExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for DivxdenExtractor {
    fn name(&self) -> &'static str {
        "divxden"
    }

    async fn resolve(&self, page: &str, fetcher: &dyn Fetcher) -> Result<Vec<String>> {
        let streams = process_source_page(page, fetcher, Self::find_streams).await?;
        debug!("Streams found: {:?}", streams);
        Ok(streams)
    }
}
