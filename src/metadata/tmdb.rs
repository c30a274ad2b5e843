//! The Movie Database (TMDB) movie catalog.

use super::provider::{Catalog, CatalogError, SearchHit};
use super::record::Metadata;
use crate::config::HttpConfig;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

pub const TMDB_API: &str = "https://api.themoviedb.org";
pub const TMDB_IMAGES: &str = "https://image.tmdb.org/t/p/original";

#[derive(Debug, Deserialize)]
struct TmdbSearchPage {
    #[serde(default)]
    results: Vec<TmdbSearchMovie>,
}

#[derive(Debug, Deserialize)]
struct TmdbSearchMovie {
    id: u64,
    title: String,
    release_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct TmdbMovie {
    overview: Option<String>,
    runtime: Option<u32>,
    release_date: Option<String>,
    vote_average: Option<f64>,
    vote_count: Option<u64>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    genres: Vec<TmdbNamed>,
    production_companies: Vec<TmdbNamed>,
    credits: Option<TmdbCredits>,
}

#[derive(Debug, Deserialize)]
struct TmdbNamed {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TmdbCredits {
    cast: Vec<TmdbNamed>,
    crew: Vec<TmdbCrew>,
}

#[derive(Debug, Deserialize)]
struct TmdbCrew {
    name: String,
    #[serde(default)]
    job: String,
}

pub struct TmdbCatalog {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl TmdbCatalog {
    pub fn new(config: &HttpConfig, api_key: Option<String>) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: TMDB_API.to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, CatalogError> {
        let api_key = self.api_key.as_deref().ok_or(CatalogError::MissingApiKey("tmdb"))?;
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", api_key)])
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

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

/// Copies a movie record into `metadata`. The site's title is kept.
pub(super) fn apply_movie(movie: TmdbMovie, metadata: &mut Metadata) {
    if let Some(overview) = movie.overview.filter(|o| !o.is_empty()) {
        metadata.plot_outline = overview.clone();
        metadata.plot = overview;
    }
    if let Some(runtime) = movie.runtime.filter(|r| *r > 0) {
        metadata.duration = format!("{} minutes", runtime);
    }
    if !movie.production_companies.is_empty() {
        metadata.studio = join_names(movie.production_companies.iter().map(|c| c.name.as_str()));
    }
    if !movie.genres.is_empty() {
        metadata.genre = join_names(movie.genres.iter().map(|g| g.name.as_str()));
    }
    if let Some(credits) = movie.credits {
        let director = join_names(credits.crew.iter().filter(|c| c.job == "Director").map(|c| c.name.as_str()));
        let writer = join_names(
            credits
                .crew
                .iter()
                .filter(|c| c.job == "Screenplay" || c.job == "Writer")
                .map(|c| c.name.as_str()),
        );
        if !director.is_empty() {
            metadata.director = director;
        }
        if !writer.is_empty() {
            metadata.writer = writer;
        }
        metadata.cast = credits.cast.into_iter().map(|c| c.name).collect();
    }
    if let Some(rating) = movie.vote_average {
        metadata.rating = Some(rating);
    }
    if let Some(votes) = movie.vote_count {
        metadata.votes = votes.to_string();
    }
    if let Some(released) = movie.release_date.filter(|d| !d.is_empty()) {
        metadata.year = released.get(..4).and_then(|year| year.parse().ok());
        metadata.premiered = released;
    }
    if let Some(poster) = movie.poster_path {
        metadata.cover = format!("{}{}", TMDB_IMAGES, poster);
    }
    if let Some(backdrop) = movie.backdrop_path {
        metadata.fanart = format!("{}{}", TMDB_IMAGES, backdrop);
    }
}

#[async_trait]
impl Catalog for TmdbCatalog {
    fn name(&self) -> &str {
        "tmdb"
    }

    async fn search(&self, title: &str) -> Result<Vec<SearchHit>, CatalogError> {
        info!("Searching TMDB for '{}'", title);
        let page: TmdbSearchPage = self.get_json("/3/search/movie", &[("query", title)]).await?;

        Ok(page
            .results
            .into_iter()
            .map(|movie| {
                let name = match movie.release_date.as_deref().and_then(|d| d.get(..4)) {
                    Some(year) => format!("{} ({})", movie.title, year),
                    None => movie.title,
                };
                SearchHit::new(movie.id.to_string(), name)
            })
            .collect())
    }

    async fn load(&self, id: &str, metadata: &mut Metadata) -> Result<(), CatalogError> {
        let movie: TmdbMovie = self
            .get_json(&format!("/3/movie/{}", id), &[("append_to_response", "credits")])
            .await?;
        apply_movie(movie, metadata);
        debug!("Found movie metadata from TMDB: {:?}", metadata);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_movie_keeps_title() {
        let movie: TmdbMovie = serde_json::from_str(
            r#"{
                "title": "Avatar",
                "overview": "A paraplegic Marine.",
                "runtime": 162,
                "release_date": "2009-12-15",
                "vote_average": 7.6,
                "vote_count": 30000,
                "poster_path": "/poster.jpg",
                "backdrop_path": null,
                "genres": [{"id": 28, "name": "Action"}, {"id": 12, "name": "Adventure"}],
                "production_companies": [{"id": 1, "name": "Lightstorm"}],
                "credits": {
                    "cast": [{"name": "Sam Worthington"}],
                    "crew": [{"name": "James Cameron", "job": "Director"}, {"name": "James Cameron", "job": "Writer"}]
                }
            }"#,
        )
        .unwrap();

        let mut metadata = Metadata::new("Avatar 2009", "", "");
        apply_movie(movie, &mut metadata);

        assert_eq!(metadata.title, "Avatar 2009");
        assert_eq!(metadata.plot, "A paraplegic Marine.");
        assert_eq!(metadata.duration, "162 minutes");
        assert_eq!(metadata.genre, "Action, Adventure");
        assert_eq!(metadata.director, "James Cameron");
        assert_eq!(metadata.year, Some(2009));
        assert_eq!(metadata.cover, "https://image.tmdb.org/t/p/original/poster.jpg");
        assert!(metadata.fanart.is_empty());
        assert_eq!(metadata.cast, vec!["Sam Worthington"]);
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let catalog = TmdbCatalog::new(&HttpConfig::default(), Some("  ".to_string())).unwrap();
        assert!(matches!(
            catalog.search("Avatar").await,
            Err(CatalogError::MissingApiKey(_))
        ));
    }
}
