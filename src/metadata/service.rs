use super::cache::MetadataCache;
use super::key::MetadataKey;
use super::provider::OnlineProvider;
use super::record::Metadata;
use super::MetadataError;
use crate::config::SiteProfile;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What is known about an item before its metadata is looked up.
#[derive(Debug, Clone)]
pub struct MetadataRequest {
    pub url: String,
    pub title: Option<String>,
    pub plot: String,
    pub cover: String,
    /// The owning show's record when listing episodes
    pub show: Option<Metadata>,
    pub query_online: bool,
    pub bypass_cache: bool,
    pub persist: bool,
}

impl MetadataRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            plot: String::new(),
            cover: String::new(),
            show: None,
            query_online: false,
            bypass_cache: false,
            persist: true,
        }
    }
}

/// Cache-first metadata lookup with optional online enrichment.
pub struct MetadataService {
    profile: SiteProfile,
    cache: Arc<MetadataCache>,
    provider: Option<OnlineProvider>,
    skip_online_query: bool,
}

impl MetadataService {
    pub fn new(profile: SiteProfile, cache: Arc<MetadataCache>) -> Self {
        Self {
            profile,
            cache,
            provider: None,
            skip_online_query: false,
        }
    }

    pub fn with_provider(mut self, provider: OnlineProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Never query catalogs and never bypass the cache.
    pub fn skip_online_query(mut self, skip: bool) -> Self {
        self.skip_online_query = skip;
        self
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// Returns the cached record for the URL, or builds one from the request,
    /// enriches it from the catalogs if asked to, and caches it.
    ///
    /// Only an unusable URL is an error. Catalog and cache failures are logged.
    pub async fn get(&self, request: &MetadataRequest) -> Result<Metadata, MetadataError> {
        let mut key = MetadataKey::new(&request.url, request.title.as_deref(), &self.profile)?;
        if key.is_show() && request.show.is_some() {
            key = key.use_show_bucket(true);
        }
        debug!("Created key for url: {}, {}", request.url, key);

        let bypass_cache = request.bypass_cache && !self.skip_online_query;
        if !bypass_cache {
            if let Some(cached) = self.cache.lookup_and_promote(&key).await {
                return Ok(cached);
            }
        }

        debug!("Not returning from cache, building new record");
        let mut metadata = Metadata::new(&key.name(), &request.plot, &request.cover);

        if let Some((season, episode)) = key.season_and_episode() {
            metadata.season = Some(season);
            metadata.episode = Some(episode);
            self.decorate_episode(&key, request.show.as_ref(), &mut metadata).await;
        }

        if request.query_online && !self.skip_online_query {
            self.enrich(&key, &mut metadata).await;
        }

        if !metadata.is_empty() {
            if let Err(e) = self.cache.refresh(&key, &metadata, request.persist).await {
                warn!("Failed to update cache for '{}': {}", key.key(), e);
            }
        }
        Ok(metadata)
    }

    /// Gives an episode its show's id and cover, from the hint or from the cache.
    async fn decorate_episode(
        &self,
        key: &MetadataKey,
        show: Option<&Metadata>,
        metadata: &mut Metadata,
    ) {
        if let Some(show) = show {
            metadata.tv_show_title = show.title.clone();
            metadata.tv_show_id = show.code.clone();
            metadata.cover = show.cover.clone();
            return;
        }

        let cached = self.cache.lookup(key).await.unwrap_or_default();
        let mut show_id = cached.tv_show_id;
        let mut cover = (!cached.cover.is_empty()).then_some(cached.cover);

        if show_id.is_empty() || cover.is_none() {
            if let Some(parent) = key.parent_key() {
                if let Some(parent_record) = self.cache.lookup(&parent).await {
                    if !parent_record.code.is_empty() {
                        show_id = parent_record.code;
                    }
                    if !parent_record.cover.is_empty() {
                        cover = Some(parent_record.cover);
                    }
                    if metadata.tv_show_title.is_empty() {
                        metadata.tv_show_title = parent_record.title;
                    }
                }
            }
        }

        info!("Decorating with cached data, tv show id = '{}'", show_id);
        metadata.tv_show_id = show_id;
        if let Some(cover) = cover {
            metadata.cover = cover;
        }
    }

    async fn enrich(&self, key: &MetadataKey, metadata: &mut Metadata) {
        let Some(provider) = &self.provider else {
            debug!("No online provider configured");
            return;
        };

        let result = if key.is_episode() {
            provider.load(key, metadata).await
        } else {
            match provider.search(key).await {
                Ok(Some(id)) => {
                    metadata.code = id;
                    provider.load(key, metadata).await
                }
                Ok(None) => {
                    debug!("No catalog match chosen for '{}'", key.name());
                    Ok(())
                }
                Err(e) => Err(e),
            }
        };

        if let Err(e) = result {
            warn!("Querying metadata failed for '{}': {}", key.key(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> MetadataService {
        MetadataService::new(SiteProfile::default(), Arc::new(MetadataCache::new(dir.path())))
    }

    #[tokio::test]
    async fn test_defaults_are_cached() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let service = service(&dir);

        let mut request = MetadataRequest::new("http://tvshack.cc/movies/Avatar__2009_/");
        request.plot = "Blue people".to_string();
        let built = service.get(&request).await?;
        assert_eq!(built.title, "Avatar");
        assert_eq!(built.plot, "Blue people");

        request.plot = "Ignored now".to_string();
        let cached = service.get(&request).await?;
        assert_eq!(cached, built);
        Ok(())
    }

    #[tokio::test]
    async fn test_title_only_records_are_not_cached() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let service = service(&dir);
        let request = MetadataRequest::new("http://tvshack.cc/movies/Avatar/");
        service.get(&request).await?;
        assert!(!dir.path().join("movies.metadata").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_bypass_rebuilds_unless_skipping() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let mut request = MetadataRequest::new("http://tvshack.cc/movies/Avatar/");
        request.plot = "first".to_string();
        service(&dir).get(&request).await?;

        request.plot = "second".to_string();
        request.bypass_cache = true;
        let skipping = service(&dir).skip_online_query(true);
        assert_eq!(skipping.get(&request).await?.plot, "first");

        assert_eq!(service(&dir).get(&request).await?.plot, "second");
        Ok(())
    }

    #[tokio::test]
    async fn test_episode_takes_show_hint() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let service = service(&dir);
        let mut request = MetadataRequest::new("http://tvshack.cc/tv/Dexter/season_2/episode_5/");
        request.show = Some(Metadata {
            code: "161".to_string(),
            cover: "http://covers/dexter.jpg".to_string(),
            ..Metadata::new("Dexter", "", "")
        });

        let episode = service.get(&request).await?;
        assert_eq!(episode.season, Some(2));
        assert_eq!(episode.episode, Some(5));
        assert_eq!(episode.tv_show_id, "161");
        assert_eq!(episode.tv_show_title, "Dexter");
        assert_eq!(episode.cover, "http://covers/dexter.jpg");
        assert!(dir.path().join("tv-Dexter.metadata").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_episode_under_deeper_site_profile() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let profile = SiteProfile {
            base_url: "http://www.primewire.ag".to_string(),
            episode_depth: 3,
        };
        let cache = Arc::new(MetadataCache::new(dir.path()));
        let show = MetadataKey::new("http://www.primewire.ag/tv/Dexter/overview/", None, &profile)?;
        let show_record = Metadata {
            code: "161".to_string(),
            ..Metadata::new("Dexter", "", "")
        };
        cache.refresh(&show, &show_record, false).await?;

        let service = MetadataService::new(profile, cache);
        let mut request = MetadataRequest::new("http://www.primewire.ag/tv/Dexter/season_2/episode_5/");
        request.plot = "Lundy closes in".to_string();
        let episode = service.get(&request).await?;

        assert_eq!(episode.plot, "Lundy closes in");
        assert_eq!((episode.season, episode.episode), (Some(2), Some(5)));
        assert_eq!(episode.tv_show_id, "161");
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_url() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let result = service(&dir).get(&MetadataRequest::new("http://tvshack.cc/")).await;
        assert!(matches!(result, Err(MetadataError::InvalidUrl(_))));
        Ok(())
    }
}
