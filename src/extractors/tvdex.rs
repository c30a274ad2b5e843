use crate::core::{Extractor, FetchOptions, Fetcher};
use crate::extractors::common::{find_all, find_first, process_source_page};
use anyhow::Result;
use async_trait::async_trait;

const VIDEO_LOADER: &str = "http://www.tvdex.org/includes/ajax/video_loader.php?episode_id=";

pub struct TvdexExtractor;

impl TvdexExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TvdexExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for TvdexExtractor {
    fn name(&self) -> &'static str {
        "tvdex"
    }

    async fn resolve(&self, page: &str, fetcher: &dyn Fetcher) -> Result<Vec<String>> {
        let episode_id = find_first(r"var aiv = (.+?);", page, "tvdex episode id")?;
        let loader_url = format!("{}{}", VIDEO_LOADER, urlencoding::encode(episode_id.trim()));
        let internal = fetcher.fetch(&loader_url, &FetchOptions::ajax()).await?;
        process_source_page(&internal, fetcher, |html| {
            find_all(r#"flashvars\.file="(.+)";"#, html)
        })
        .await
    }
}
