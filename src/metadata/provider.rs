use super::key::{MediaType, MetadataKey};
use super::record::Metadata;
use crate::core::Chooser;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Not found in catalog: {0}")]
    NotFound(String),

    #[error("No API key configured for {0}")]
    MissingApiKey(&'static str),

    #[error("Record is missing {0}")]
    MissingField(&'static str),

    #[error("{0}")]
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub id: String,
    pub name: String,
}

impl SearchHit {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// An online database of movies or shows.
#[async_trait]
pub trait Catalog: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, title: &str) -> Result<Vec<SearchHit>, CatalogError>;

    /// Fills `metadata` with the catalog's record for `id`.
    async fn load(&self, id: &str, metadata: &mut Metadata) -> Result<(), CatalogError>;
}

/// A show catalog that also knows single episodes.
#[async_trait]
pub trait EpisodeCatalog: Catalog {
    async fn load_episode(
        &self,
        show_id: &str,
        season: u32,
        episode: u32,
        metadata: &mut Metadata,
    ) -> Result<(), CatalogError>;
}

/// Dispatches metadata lookups to the show or movie catalog by media type.
pub struct OnlineProvider {
    shows: Arc<dyn EpisodeCatalog>,
    movies: Arc<dyn Catalog>,
    chooser: Arc<dyn Chooser>,
}

impl OnlineProvider {
    pub fn new(shows: Arc<dyn EpisodeCatalog>, movies: Arc<dyn Catalog>, chooser: Arc<dyn Chooser>) -> Self {
        Self { shows, movies, chooser }
    }

    /// Finds the catalog id for the key's name. Several hits are left to the chooser.
    pub async fn search(&self, key: &MetadataKey) -> Result<Option<String>, CatalogError> {
        let (hits, title) = match key.media_type() {
            MediaType::Show | MediaType::Anime => (self.shows.search(&key.name()).await?, "Select Tv show..."),
            MediaType::Movie => (self.movies.search(&key.name()).await?, "Select movie by title"),
            MediaType::Episode => {
                return Err(CatalogError::Unsupported(format!(
                    "episodes are not searched: {}",
                    key.key()
                )))
            }
        };
        debug!("Found {} catalog hits for '{}'", hits.len(), key.name());

        let index = match hits.len() {
            0 => None,
            1 => Some(0),
            _ => {
                let names: Vec<String> = hits.iter().map(|hit| hit.name.clone()).collect();
                self.chooser.choose(title, &names).filter(|i| *i < hits.len())
            }
        };
        Ok(index.map(|i| hits[i].id.clone()))
    }

    /// Loads the catalog record into `metadata`: by `metadata.code` for movies
    /// and shows, by show id and numbers for episodes.
    pub async fn load(&self, key: &MetadataKey, metadata: &mut Metadata) -> Result<(), CatalogError> {
        match key.media_type() {
            MediaType::Episode => {
                if metadata.tv_show_id.is_empty() {
                    return Err(CatalogError::MissingField("tv show id"));
                }
                let (season, episode) = key
                    .season_and_episode()
                    .ok_or(CatalogError::MissingField("season and episode"))?;
                let show_id = metadata.tv_show_id.clone();
                info!("Loading episode S{}E{} of show '{}'", season, episode, show_id);
                self.shows.load_episode(&show_id, season, episode, metadata).await
            }
            media_type => {
                if !metadata.has_code() {
                    return Err(CatalogError::MissingField("code"));
                }
                let code = metadata.code.clone();
                info!("Loading metadata for '{}'", code);
                match media_type {
                    MediaType::Movie => self.movies.load(&code, metadata).await,
                    _ => self.shows.load(&code, metadata).await,
                }
            }
        }
    }
}
