use crate::core::{Extractor, Fetcher};
use crate::extractors::common::find_first;
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;
use url::Url;

const EMBED_PATTERN: &str = r#"src="(https?://(?:www\.)?youtube\.com/(?:v|embed)/[^"]+)""#;

/// Finds an embedded YouTube player and hands back the canonical watch URL,
/// which the media center's YouTube add-on knows how to play.
pub struct YouTubeExtractor;

impl YouTubeExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract_video_id(&self, url: &Url) -> Option<String> {
        // Handle various YouTube URL formats
        if url.host_str() == Some("youtu.be") {
            return url.path_segments()?.next().map(|s| s.to_string());
        }

        let host = url.host_str()?;
        if !host.contains("youtube.com") {
            return None;
        }

        if let Some((_, v)) = url.query_pairs().find(|(key, _)| key == "v") {
            return Some(v.to_string());
        }

        let mut segments = url.path_segments()?;
        match segments.next() {
            Some("v") | Some("embed") => segments
                .next()
                // old embeds carry their options after '&' inside the path
                .map(|id| id.split('&').next().unwrap_or(id).to_string())
                .filter(|id| !id.is_empty()),
            _ => None,
        }
    }
}

impl Default for YouTubeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for YouTubeExtractor {
    fn name(&self) -> &'static str {
        "youtube"
    }

    async fn resolve(&self, page: &str, _fetcher: &dyn Fetcher) -> Result<Vec<String>> {
        let embed = find_first(EMBED_PATTERN, page, "embedded youtube player")?;
        let video_id = self
            .extract_video_id(&Url::parse(&embed)?)
            .ok_or_else(|| anyhow::anyhow!("Could not extract video ID from URL"))?;
        debug!("Youtube video id: {}", video_id);

        Ok(vec![format!("https://www.youtube.com/watch?v={}", video_id)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_id_formats() {
        let extractor = YouTubeExtractor::new();
        let cases = [
            ("https://www.youtube.com/watch?v=dQw4w9WgXcQ", "dQw4w9WgXcQ"),
            ("https://youtu.be/dQw4w9WgXcQ", "dQw4w9WgXcQ"),
            ("http://www.youtube.com/v/dQw4w9WgXcQ&hl=en&fs=1", "dQw4w9WgXcQ"),
            ("https://www.youtube.com/embed/dQw4w9WgXcQ", "dQw4w9WgXcQ"),
        ];
        for (url, id) in cases {
            assert_eq!(
                extractor.extract_video_id(&Url::parse(url).unwrap()),
                Some(id.to_string())
            );
        }
        assert_eq!(
            extractor.extract_video_id(&Url::parse("https://vimeo.com/123456").unwrap()),
            None
        );
    }
}
