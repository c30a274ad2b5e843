//! Picking a file host for a media item and turning it into a playable link.
//!
//! A media item (a movie or an episode) is usually hosted on several file hosts,
//! and each host may carry several mirrors of it. [`SourceList`] decides which
//! host to use, [`Source`] tries that host's mirrors until one resolves.

use crate::core::{Chooser, Extractor, ExtractorRegistry, FetchOptions, Fetcher, Notifier, ResolveError};
use std::sync::Arc;
use tracing::{debug, warn};

/// A `(url, host)` pair scraped from a detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLink {
    pub url: String,
    pub host: String,
}

impl RawLink {
    pub fn new(url: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            host: host.into(),
        }
    }
}

/// The candidate hosts for one media item, each with its mirror URLs.
pub struct SourceList<'r> {
    /// Host labels in order of first appearance, urls in page order
    sources: Vec<(String, Vec<String>)>,
    registry: &'r ExtractorRegistry,
}

impl<'r> SourceList<'r> {
    pub fn new(links: Vec<RawLink>, filter_unsupported: bool, registry: &'r ExtractorRegistry) -> Self {
        let mut sources: Vec<(String, Vec<String>)> = Vec::new();

        for RawLink { url, host } in links {
            if filter_unsupported && !registry.is_supported(&host) {
                debug!("Skipping unsupported host '{}' for {}", host, url);
                continue;
            }
            match sources.iter_mut().find(|(name, _)| *name == host) {
                Some((_, urls)) => urls.push(url),
                None => sources.push((host, vec![url])),
            }
        }

        Self { sources, registry }
    }

    pub fn hosts(&self) -> Vec<&str> {
        self.sources.iter().map(|(host, _)| host.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Selects one of the available sources.
    ///
    /// A single candidate is taken as is. Otherwise the first candidate listed in
    /// `preferred_hosts` wins, unless `force_manual` is set, in which case every
    /// mirror becomes its own `host#index` option and the chooser decides.
    pub fn select_source(
        &self,
        force_manual: bool,
        preferred_hosts: Option<&[String]>,
        chooser: &dyn Chooser,
    ) -> Result<Source, ResolveError> {
        let candidates = if force_manual {
            self.numbered_sources()
        } else {
            self.sources.clone()
        };
        debug!("Selecting from sources: {:?}", candidates);

        let names: Vec<String> = candidates.iter().map(|(name, _)| name.clone()).collect();
        let selected = select_index(&names, force_manual, preferred_hosts, chooser)
            .ok_or(ResolveError::NoSourceSelected)?;

        let (host, urls) = candidates
            .into_iter()
            .nth(selected)
            .ok_or(ResolveError::NoSourceSelected)?;
        Source::new(host, urls, self.registry)
    }

    /// One single-url pseudo host per mirror (`megavideo#0`, `megavideo#1`, ...).
    fn numbered_sources(&self) -> Vec<(String, Vec<String>)> {
        self.sources
            .iter()
            .flat_map(|(host, urls)| {
                urls.iter()
                    .enumerate()
                    .map(move |(i, url)| (format!("{}#{}", host, i), vec![url.clone()]))
            })
            .collect()
    }
}

fn select_index(
    names: &[String],
    force_manual: bool,
    preferred_hosts: Option<&[String]>,
    chooser: &dyn Chooser,
) -> Option<usize> {
    match names.len() {
        0 => return None,
        1 => return Some(0),
        _ => {}
    }

    if let (Some(preferred), false) = (preferred_hosts, force_manual) {
        if let Some(index) = names.iter().position(|name| preferred.contains(name)) {
            debug!("Auto-selecting preferred source '{}'", names[index]);
            return Some(index);
        }
    }

    chooser
        .choose("Select source", names)
        .filter(|index| *index < names.len())
}

/// One file host's mirrors of a media item, together with the extractor that
/// understands the host's pages.
pub struct Source {
    host: String,
    urls: Vec<String>,
    extractor: Arc<dyn Extractor>,
}

impl Source {
    /// Unknown hosts still get a source, backed by the looping extractor.
    pub fn new(
        host: impl Into<String>,
        urls: Vec<String>,
        registry: &ExtractorRegistry,
    ) -> Result<Self, ResolveError> {
        let host = host.into();
        if urls.is_empty() {
            return Err(ResolveError::NoSourceSelected);
        }
        let extractor = registry.extractor_for(base_host(&host));
        debug!("Source '{}' uses the '{}' extractor", host, extractor.name());

        Ok(Self {
            host,
            urls,
            extractor,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn extractor_name(&self) -> &'static str {
        self.extractor.name()
    }

    /// Resolves to the first playable link of the first mirror that works.
    pub async fn resolve(&self, fetcher: &dyn Fetcher, notifier: &dyn Notifier) -> Result<String, ResolveError> {
        let mut parts = self.resolve_parts(fetcher, notifier).await?;
        Ok(parts.swap_remove(0))
    }

    /// Resolves every part (some hosts split a film in several files) of the
    /// first mirror that works. Mirrors are tried one after another.
    pub async fn resolve_parts(
        &self,
        fetcher: &dyn Fetcher,
        notifier: &dyn Notifier,
    ) -> Result<Vec<String>, ResolveError> {
        notifier.open("Looking for playable link...", &self.host);
        let total = self.urls.len();

        for (index, url) in self.urls.iter().enumerate() {
            let percent = (index * 100 / total) as u8;
            notifier.update(percent, &format!("trying link {} of {}", index + 1, total));

            match self.resolve_alternate(url, fetcher).await {
                Ok(links) if !links.is_empty() => {
                    debug!("Found part items: {:?}", links);
                    notifier.close();
                    return Ok(links);
                }
                Ok(_) => warn!("No links found for '{}' on host '{}'", url, self.host),
                Err(e) => warn!("Failed to resolve alternate link '{}': {:#}", url, e),
            }
        }

        notifier.close();
        Err(ResolveError::UnresolvableSource {
            host: self.host.clone(),
        })
    }

    async fn resolve_alternate(&self, url: &str, fetcher: &dyn Fetcher) -> anyhow::Result<Vec<String>> {
        debug!("Listing parts at {}", url);
        let target = fetcher.resolve_redirect(url).await?;
        let page = fetcher.fetch(&target, &FetchOptions::ajax()).await?;
        self.extractor.resolve(&page, fetcher).await
    }
}

/// `movshare#1` is a numbered mirror of `movshare`.
fn base_host(host: &str) -> &str {
    match host.rsplit_once('#') {
        Some((base, index)) if index.chars().all(|c| c.is_ascii_digit()) && !index.is_empty() => base,
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NoChoice;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn links(pairs: &[(&str, &str)]) -> Vec<RawLink> {
        pairs.iter().map(|(u, h)| RawLink::new(*u, *h)).collect()
    }

    #[test]
    fn test_grouping_keeps_page_order() {
        let registry = ExtractorRegistry::with_builtin();
        let list = SourceList::new(
            links(&[
                ("http://a/1", "movshare"),
                ("http://b/1", "divxden"),
                ("http://a/2", "movshare"),
            ]),
            false,
            &registry,
        );
        assert_eq!(list.hosts(), vec!["movshare", "divxden"]);
        let source = list
            .select_source(false, Some(["movshare".to_string()].as_slice()), &NoChoice)
            .unwrap();
        assert_eq!(source.urls(), &["http://a/1", "http://a/2"]);
    }

    #[test]
    fn test_filter_unsupported_drops_unknown_hosts() {
        let registry = ExtractorRegistry::with_builtin();
        let list = SourceList::new(
            links(&[("http://x/1", "megaupload"), ("http://a/1", "movshare")]),
            true,
            &registry,
        );
        assert_eq!(list.hosts(), vec!["movshare"]);
    }

    #[test]
    fn test_single_source_never_asks() {
        let registry = ExtractorRegistry::with_builtin();
        let asked = AtomicUsize::new(0);
        let chooser = |_: &str, _: &[String]| {
            asked.fetch_add(1, Ordering::SeqCst);
            None::<usize>
        };
        let list = SourceList::new(
            links(&[("http://a/1", "movshare"), ("http://a/2", "movshare")]),
            false,
            &registry,
        );
        let source = list.select_source(false, None, &chooser).unwrap();
        assert_eq!(source.host(), "movshare");
        assert_eq!(asked.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_preferred_host_follows_candidate_order() {
        let registry = ExtractorRegistry::with_builtin();
        let list = SourceList::new(
            links(&[
                ("http://v/1", "veoh"),
                ("http://d/1", "divxden"),
                ("http://m/1", "movshare"),
            ]),
            false,
            &registry,
        );
        let preferred = vec!["movshare".to_string(), "divxden".to_string()];
        let source = list.select_source(false, Some(preferred.as_slice()), &NoChoice).unwrap();
        assert_eq!(source.host(), "divxden");
    }

    #[test]
    fn test_no_candidates_or_cancelled() {
        let registry = ExtractorRegistry::with_builtin();
        let empty = SourceList::new(Vec::new(), false, &registry);
        assert_eq!(
            empty.select_source(false, None, &NoChoice).err(),
            Some(ResolveError::NoSourceSelected)
        );

        let list = SourceList::new(
            links(&[("http://v/1", "veoh"), ("http://d/1", "divxden")]),
            false,
            &registry,
        );
        assert_eq!(
            list.select_source(false, None, &NoChoice).err(),
            Some(ResolveError::NoSourceSelected)
        );
    }

    #[test]
    fn test_forced_manual_numbers_every_mirror() {
        let registry = ExtractorRegistry::with_builtin();
        let list = SourceList::new(
            links(&[
                ("http://a/1", "movshare"),
                ("http://a/2", "movshare"),
                ("http://d/1", "divxden"),
            ]),
            false,
            &registry,
        );
        let chooser = |title: &str, options: &[String]| {
            assert_eq!(title, "Select source");
            assert_eq!(options, &["movshare#0", "movshare#1", "divxden#0"]);
            options.iter().position(|o| o == "movshare#1")
        };
        let preferred = vec!["divxden".to_string()];
        let source = list.select_source(true, Some(preferred.as_slice()), &chooser).unwrap();
        assert_eq!(source.host(), "movshare#1");
        assert_eq!(source.urls(), &["http://a/2"]);
        assert_eq!(source.extractor_name(), "movshare");
    }

    #[test]
    fn test_base_host() {
        assert_eq!(base_host("movshare#3"), "movshare");
        assert_eq!(base_host("movshare"), "movshare");
        assert_eq!(base_host("odd#host"), "odd#host");
    }
}
