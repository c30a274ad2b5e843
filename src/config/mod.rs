use crate::core::NotificationMethod;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "vidscout.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub notification: NotificationMethod,
    pub site: SiteProfile,
    pub resolver: ResolverConfig,
    pub metadata: MetadataConfig,
    pub http: HttpConfig,
}

/// How the scraped site lays out its URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteProfile {
    pub base_url: String,
    /// Path segments of a show URL (`tv/<show>` is 2). `tv` URLs with more are episodes
    pub episode_depth: usize,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            base_url: "http://tvshack.cc".to_string(),
            episode_depth: 2,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub preferred_hosts: Vec<String>,
    pub force_manual: bool,
    pub filter_unsupported: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    pub cache_dir: PathBuf,
    pub query_online: bool,
    /// Never query catalogs and never bypass the cache
    pub skip_online_query: bool,
    pub load_episode_cover: bool,
    pub imdb_cover_size: Option<u32>,
    pub tmdb_api_key: Option<String>,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache"),
            query_online: false,
            skip_online_query: false,
            load_episode_cover: false,
            imdb_cover_size: Some(300),
            tmdb_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout: u64,
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            timeout: 30,
            max_redirects: 10,
        }
    }
}

impl Config {
    /// Loads the given file, or `vidscout.toml` from the working directory when
    /// present, or the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            notification = "off"

            [resolver]
            preferred_hosts = ["movshare", "divxden"]

            [metadata]
            query_online = true
            tmdb_api_key = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.notification, NotificationMethod::Off);
        assert_eq!(config.resolver.preferred_hosts, vec!["movshare", "divxden"]);
        assert!(!config.resolver.force_manual);
        assert!(config.metadata.query_online);
        assert_eq!(config.metadata.tmdb_api_key.as_deref(), Some("secret"));
        assert_eq!(config.metadata.cache_dir, PathBuf::from("cache"));
        assert_eq!(config.site, SiteProfile::default());
        assert_eq!(config.http.timeout, 30);
        assert_eq!(config.metadata.imdb_cover_size, Some(300));
        assert_eq!(config.site.episode_depth, 2);
    }

    #[test]
    fn test_cover_size_can_be_changed() {
        let config = Config::from_toml("[metadata]\nimdb_cover_size = 500\n").unwrap();
        assert_eq!(config.metadata.imdb_cover_size, Some(500));
        assert_eq!(Config::default().metadata.imdb_cover_size, Some(300));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/vidscout.toml"))).is_err());
    }
}
