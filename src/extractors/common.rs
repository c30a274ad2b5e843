//! Helpers shared by the host extractors.

use crate::core::{FetchOptions, Fetcher};
use anyhow::Result;
use regex::Regex;
use tracing::debug;

/// Every first capture group of `pattern` in `page`.
pub fn find_all(pattern: &str, page: &str) -> Result<Vec<String>> {
    let re = Regex::new(pattern)?;
    let found: Vec<String> = re
        .captures_iter(page)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect();
    debug!("Found links: {:?}", found);
    Ok(found)
}

/// The first capture of `pattern`, or an error naming what was missing.
pub fn find_first(pattern: &str, page: &str, what: &str) -> Result<String> {
    find_all(pattern, page)?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("Could not find {} in page", what))
}

/// Most hosts embed the real player in a frame. Loads the first absolute
/// `src="..."` of `page` and hands that page to `finder`.
pub async fn process_source_page<F>(page: &str, fetcher: &dyn Fetcher, finder: F) -> Result<Vec<String>>
where
    F: FnOnce(&str) -> Result<Vec<String>>,
{
    let frame = find_first(r#"src="(https?://.+?)""#, page, "stream page url")?.replace("&amp;", "&");
    debug!("Found stream page url: {}", frame);
    let html = fetcher.fetch(&frame, &FetchOptions::default()).await?;
    finder(&html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_all_and_first() {
        let page = r#"<param name="src" value="http://a/1.avi"><param name="src" value="http://a/2.avi">"#;
        let found = find_all(r#"param name="src" value="([^"]+)""#, page).unwrap();
        assert_eq!(found, vec!["http://a/1.avi", "http://a/2.avi"]);
        assert!(find_first(r#"flashvars="file=(.+?)&"#, page, "flash vars").is_err());
    }
}
