use crate::config::SiteProfile;
use crate::metadata::MetadataError;
use crate::utils::{sanitize_filename, strip_parenthetical};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

pub const BUCKET_EXTENSION: &str = "metadata";

static SLUG_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"__[0-9]+?_").expect("slug id regex should compile"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Movie,
    Show,
    Episode,
    /// Listed like shows and searched in the show catalog
    Anime,
}

/// The cache identity of a site URL, e.g. `tv/Dexter` or `tv/Dexter/S2E5`.
///
/// Derived again from the URL on every lookup, only the key string is stored.
#[derive(Debug, Clone)]
pub struct MetadataKey {
    url: Url,
    key: String,
    media_type: MediaType,
    title: Option<String>,
    season: Option<u32>,
    episode: Option<u32>,
    use_show_bucket: bool,
    profile: SiteProfile,
}

impl MetadataKey {
    pub fn new(url: &str, title: Option<&str>, profile: &SiteProfile) -> Result<Self, MetadataError> {
        let url = normalize_url(url, &profile.base_url)?;
        let segments: Vec<String> = url
            .path_segments()
            .map(|s| s.filter(|s| !s.is_empty()).map(String::from).collect())
            .unwrap_or_default();

        let (section, slug) = match segments.as_slice() {
            [section, slug, ..] => (section.clone(), slug.clone()),
            _ => return Err(MetadataError::InvalidUrl(url.to_string())),
        };
        let media_type = if section.starts_with("tv") {
            if segments.len() > profile.episode_depth.max(2) {
                MediaType::Episode
            } else {
                MediaType::Show
            }
        } else if section.starts_with("anime") {
            MediaType::Anime
        } else {
            MediaType::Movie
        };

        let mut key = format!("{}/{}", section, slug);
        let (mut season, mut episode) = (None, None);
        if media_type == MediaType::Episode {
            let numbers = segment_number(&segments, "season_").zip(segment_number(&segments, "episode_"));
            let (s, e) = numbers.ok_or_else(|| MetadataError::MissingEpisodeNumbers(url.to_string()))?;
            key = episode_key(&key, s, e);
            season = Some(s);
            episode = Some(e);
        }

        Ok(Self {
            url,
            key,
            media_type,
            title: title.map(strip_parenthetical).filter(|t| !t.is_empty()),
            season,
            episode,
            use_show_bucket: false,
            profile: profile.clone(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn is_episode(&self) -> bool {
        self.media_type == MediaType::Episode
    }

    pub fn is_show(&self) -> bool {
        self.media_type == MediaType::Show
    }

    pub fn season_and_episode(&self) -> Option<(u32, u32)> {
        self.season.zip(self.episode)
    }

    /// Stores this key in its show's episode bucket instead of the shared one.
    pub fn use_show_bucket(mut self, active: bool) -> Self {
        self.use_show_bucket = active;
        self
    }

    /// The name to search catalogs with: the given title, or the slug with its
    /// id suffix and underscores removed.
    pub fn name(&self) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }
        let slug = self.key.split('/').nth(1).unwrap_or_default();
        let slug = urlencoding::decode(slug).map(|s| s.into_owned()).unwrap_or_else(|_| slug.to_string());
        let name = SLUG_ID.replace_all(&slug, " ");
        strip_parenthetical(&name.replace('_', " ")).trim().to_string()
    }

    /// The owning show of an episode, `None` for anything else.
    pub fn parent_key(&self) -> Option<MetadataKey> {
        if !self.is_episode() {
            return None;
        }
        let show_key = self.key.split('/').take(2).collect::<Vec<_>>().join("/");
        let mut url = self.url.clone();
        url.set_path(&format!("/{}/", show_key));
        url.set_query(None);
        url.set_fragment(None);

        Some(MetadataKey {
            url,
            key: show_key,
            media_type: MediaType::Show,
            title: None,
            season: None,
            episode: None,
            use_show_bucket: false,
            profile: self.profile.clone(),
        })
    }

    /// Bucket holding this key: `movies`, `tv`, or `tv-<show>` for episodes.
    pub fn cache_bucket(&self) -> String {
        if self.use_show_bucket {
            if let Some(bucket) = self.episode_bucket() {
                return bucket;
            }
        }
        let parts: Vec<&str> = self.key.split('/').collect();
        parts[..parts.len() - 1].join("-")
    }

    /// Bucket with a show's episodes. Only shows have one.
    pub fn episode_bucket(&self) -> Option<String> {
        self.is_show().then(|| self.key.replace('/', "-"))
    }

    pub fn cache_path(&self, root: &Path) -> PathBuf {
        bucket_path(root, &self.cache_bucket())
    }

    pub fn episode_cache_path(&self, root: &Path) -> Option<PathBuf> {
        self.episode_bucket().map(|bucket| bucket_path(root, &bucket))
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "key='{}'; url='{}'; name='{}', type={:?}",
            self.key,
            self.url,
            self.name(),
            self.media_type
        )
    }
}

pub fn episode_key(show_key: &str, season: u32, episode: u32) -> String {
    format!("{}/S{}E{}", show_key, season, episode)
}

pub fn bucket_path(root: &Path, bucket: &str) -> PathBuf {
    root.join(format!("{}.{}", sanitize_filename(bucket), BUCKET_EXTENSION))
}

fn normalize_url(url: &str, base_url: &str) -> Result<Url, MetadataError> {
    let invalid = |_| MetadataError::InvalidUrl(url.to_string());
    match Url::parse(url) {
        Ok(parsed) => Ok(parsed),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(base_url).map_err(invalid)?;
            let relative = if url.starts_with('/') {
                url.to_string()
            } else {
                format!("/{}", url)
            };
            base.join(&relative).map_err(invalid)
        }
        Err(e) => Err(invalid(e)),
    }
}

fn segment_number(segments: &[String], prefix: &str) -> Option<u32> {
    segments
        .iter()
        .find_map(|s| s.strip_prefix(prefix))
        .and_then(|n| n.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(url: &str) -> MetadataKey {
        MetadataKey::new(url, None, &SiteProfile::default()).unwrap()
    }

    #[test]
    fn test_classification() {
        assert_eq!(key("http://tvshack.cc/movies/Avatar__2009_/").media_type(), MediaType::Movie);
        assert_eq!(key("http://tvshack.cc/tv/Dexter/").media_type(), MediaType::Show);
        assert_eq!(key("http://tvshack.cc/anime/Naruto/").media_type(), MediaType::Anime);

        let episode = key("http://tvshack.cc/tv/Dexter/season_2/episode_5/");
        assert_eq!(episode.media_type(), MediaType::Episode);
        assert_eq!(episode.key(), "tv/Dexter/S2E5");
        assert_eq!(episode.season_and_episode(), Some((2, 5)));
    }

    #[test]
    fn test_relative_urls_use_site() {
        let show = key("/tv/Dexter/");
        assert_eq!(show.url().as_str(), "http://tvshack.cc/tv/Dexter/");
        assert_eq!(show.key(), "tv/Dexter");
    }

    #[test]
    fn test_invalid_urls() {
        let profile = SiteProfile::default();
        assert!(matches!(
            MetadataKey::new("http://tvshack.cc/tv/", None, &profile),
            Err(MetadataError::InvalidUrl(_))
        ));
        assert!(matches!(
            MetadataKey::new("http://tvshack.cc/tv/Dexter/extras/bloopers/", None, &profile),
            Err(MetadataError::MissingEpisodeNumbers(_))
        ));
    }

    #[test]
    fn test_episode_depth_is_per_site() {
        let profile = SiteProfile {
            base_url: "http://www.primewire.ag".to_string(),
            episode_depth: 3,
        };
        let show = MetadataKey::new("http://www.primewire.ag/tv/Dexter/overview/", None, &profile).unwrap();
        assert!(show.is_show());
        assert_eq!(show.key(), "tv/Dexter");

        let episode =
            MetadataKey::new("http://www.primewire.ag/tv/Dexter/season_1/episode_3", None, &profile).unwrap();
        assert!(episode.is_episode());
        assert_eq!(episode.key(), "tv/Dexter/S1E3");

        let parent = episode.parent_key().unwrap();
        assert!(parent.is_show());
        assert_eq!(parent.key(), show.key());
        assert_eq!(parent.url().as_str(), "http://www.primewire.ag/tv/Dexter/");
        assert_eq!(parent.cache_bucket(), show.cache_bucket());
    }

    #[test]
    fn test_deeper_profiles_keep_plain_show_urls() {
        let profile = SiteProfile {
            base_url: "http://www.primewire.ag".to_string(),
            episode_depth: 4,
        };
        let show = MetadataKey::new("http://www.primewire.ag/tv/Dexter/", None, &profile).unwrap();
        assert!(show.is_show());
        assert!(show.parent_key().is_none());
    }

    #[test]
    fn test_names() {
        assert_eq!(key("http://tvshack.cc/movies/Avatar__2009_/").name(), "Avatar");
        assert_eq!(key("http://tvshack.cc/tv/How_I_Met_Your_Mother/").name(), "How I Met Your Mother");
        let titled = MetadataKey::new(
            "http://tvshack.cc/tv/Heroes/",
            Some("Heroes (2006)"),
            &SiteProfile::default(),
        )
        .unwrap();
        assert_eq!(titled.name(), "Heroes");
    }

    #[test]
    fn test_buckets() {
        let root = Path::new("/cache");
        let movie = key("http://tvshack.cc/movies/Avatar/");
        let show = key("http://tvshack.cc/tv/Dexter/");
        let episode = key("http://tvshack.cc/tv/Dexter/season_2/episode_5/");

        assert_eq!(movie.cache_bucket(), "movies");
        assert_eq!(movie.episode_bucket(), None);
        assert_eq!(show.cache_bucket(), "tv");
        assert_eq!(show.episode_bucket().as_deref(), Some("tv-Dexter"));
        assert_eq!(episode.cache_bucket(), "tv-Dexter");
        assert_eq!(show.clone().use_show_bucket(true).cache_bucket(), "tv-Dexter");
        assert_eq!(show.cache_path(root), PathBuf::from("/cache/tv.metadata"));
        assert_eq!(
            show.episode_cache_path(root),
            Some(PathBuf::from("/cache/tv-Dexter.metadata"))
        );
    }
}
