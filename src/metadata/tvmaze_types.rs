//! TVMaze API response types for deserialization.

use serde::Deserialize;

/// One entry of the `/search/shows` response.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeSearchResult {
    pub show: TvMazeShow,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct TvMazeShow {
    pub id: u64,
    pub name: String,
    pub genres: Vec<String>,
    /// `YYYY-MM-DD`
    pub premiered: Option<String>,
    pub runtime: Option<u32>,
    pub rating: Option<TvMazeRating>,
    pub network: Option<TvMazeNetwork>,
    #[serde(rename = "webChannel")]
    pub web_channel: Option<TvMazeNetwork>,
    /// HTML
    pub summary: Option<String>,
    pub image: Option<TvMazeImage>,
    #[serde(rename = "_embedded")]
    pub embedded: Option<TvMazeEmbedded>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct TvMazeEmbedded {
    pub cast: Vec<TvMazeCastCredit>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TvMazeCastCredit {
    pub person: TvMazeNamed,
}

#[derive(Debug, Deserialize)]
pub(super) struct TvMazeNamed {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct TvMazeNetwork {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct TvMazeRating {
    pub average: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TvMazeImage {
    pub medium: Option<String>,
    pub original: Option<String>,
}

impl TvMazeImage {
    pub fn best(&self) -> Option<&str> {
        self.original.as_deref().or(self.medium.as_deref())
    }
}

/// A single episode from `/shows/{id}/episodebynumber`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct TvMazeEpisode {
    pub name: Option<String>,
    pub season: u32,
    pub number: Option<u32>,
    pub airdate: Option<String>,
    pub runtime: Option<u32>,
    pub rating: Option<TvMazeRating>,
    pub summary: Option<String>,
    pub image: Option<TvMazeImage>,
}
