//! TVMaze show and episode catalog.

use super::provider::{Catalog, CatalogError, EpisodeCatalog, SearchHit};
use super::record::Metadata;
use super::tvmaze_types::{TvMazeEpisode, TvMazeSearchResult, TvMazeShow};
use crate::config::HttpConfig;
use crate::utils::html_to_text;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

pub const TVMAZE_API: &str = "https://api.tvmaze.com";

/// Catalog backed by https://api.tvmaze.com, no API key needed.
pub struct TvMazeCatalog {
    client: reqwest::Client,
    base_url: String,
    load_episode_cover: bool,
}

impl TvMazeCatalog {
    pub fn new(config: &HttpConfig, load_episode_cover: bool) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: TVMAZE_API.to_string(),
            load_episode_cover,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        if response.status() == 404 {
            return Err(CatalogError::NotFound(url));
        }

        if !response.status().is_success() {
            return Err(CatalogError::Request(format!(
                "HTTP {} {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

/// Copies a show record into `metadata`.
pub(super) fn apply_show(show: TvMazeShow, metadata: &mut Metadata) {
    if !show.name.is_empty() {
        metadata.title = show.name;
    }
    if let Some(summary) = show.summary {
        metadata.plot = html_to_text(&summary);
        metadata.plot_outline = metadata.plot.clone();
    }
    if let Some(cover) = show.image.as_ref().and_then(|image| image.best()) {
        metadata.cover = cover.to_string();
    }
    if let Some(network) = show.network.or(show.web_channel) {
        metadata.studio = network.name;
    }
    if let Some(premiered) = show.premiered {
        metadata.year = premiered.get(..4).and_then(|year| year.parse().ok());
        metadata.premiered = premiered;
    }
    if let Some(rating) = show.rating.and_then(|rating| rating.average) {
        metadata.rating = Some(rating);
    }
    if let Some(runtime) = show.runtime {
        metadata.duration = runtime.to_string();
    }
    if !show.genres.is_empty() {
        metadata.genre = show.genres.join(", ");
    }
    if let Some(embedded) = show.embedded {
        metadata.cast = embedded.cast.into_iter().map(|credit| credit.person.name).collect();
    }
}

/// Copies an episode record into `metadata`. The cover is only taken when asked for.
pub(super) fn apply_episode(episode: TvMazeEpisode, load_cover: bool, metadata: &mut Metadata) {
    if let Some(name) = episode.name {
        metadata.title = name;
    }
    metadata.season = Some(episode.season);
    if episode.number.is_some() {
        metadata.episode = episode.number;
    }
    if let Some(summary) = episode.summary {
        metadata.plot = html_to_text(&summary);
    }
    if let Some(airdate) = episode.airdate.filter(|date| !date.is_empty()) {
        metadata.year = airdate.get(..4).and_then(|year| year.parse().ok());
        metadata.premiered = airdate;
    }
    if let Some(runtime) = episode.runtime {
        metadata.duration = runtime.to_string();
    }
    if let Some(rating) = episode.rating.and_then(|rating| rating.average) {
        metadata.rating = Some(rating);
    }
    if load_cover {
        if let Some(cover) = episode.image.as_ref().and_then(|image| image.best()) {
            metadata.cover = cover.to_string();
        }
    }
}

#[async_trait]
impl Catalog for TvMazeCatalog {
    fn name(&self) -> &str {
        "tvmaze"
    }

    async fn search(&self, title: &str) -> Result<Vec<SearchHit>, CatalogError> {
        info!("Searching TVMaze for '{}'", title);
        let results: Vec<TvMazeSearchResult> = self
            .get_json("/search/shows", &[("q", title.to_string())])
            .await?;

        Ok(results
            .into_iter()
            .map(|result| SearchHit::new(result.show.id.to_string(), result.show.name))
            .collect())
    }

    async fn load(&self, id: &str, metadata: &mut Metadata) -> Result<(), CatalogError> {
        debug!("Loading details for tv show id: {}", id);
        let show: TvMazeShow = self
            .get_json(&format!("/shows/{}", id), &[("embed", "cast".to_string())])
            .await?;
        apply_show(show, metadata);
        metadata.code = id.to_string();
        Ok(())
    }
}

#[async_trait]
impl EpisodeCatalog for TvMazeCatalog {
    async fn load_episode(
        &self,
        show_id: &str,
        season: u32,
        episode: u32,
        metadata: &mut Metadata,
    ) -> Result<(), CatalogError> {
        debug!("Loading details for tv show episode id: {}", show_id);
        let found: TvMazeEpisode = self
            .get_json(
                &format!("/shows/{}/episodebynumber", show_id),
                &[("season", season.to_string()), ("number", episode.to_string())],
            )
            .await?;
        apply_episode(found, self.load_episode_cover, metadata);
        Ok(())
    }
}
