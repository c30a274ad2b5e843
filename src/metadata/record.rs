use crate::utils::clean_text;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static IMDB_SIZE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_SX\d+_SY\d+_\.jpg").expect("imdb size regex should compile"));

/// Descriptive data for a movie, show or episode as stored in cache buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub plot: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub plot_outline: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cover: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub fanart: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub genre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub votes: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub studio: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub director: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub writer: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub duration: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cast: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub premiered: String,
    /// Catalog id of this item
    #[serde(skip_serializing_if = "String::is_empty")]
    pub code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tv_show_title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tv_show_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
}

impl Metadata {
    /// Default record built from what the listing page shows. Empty values stay unset.
    pub fn new(title: &str, plot: &str, cover: &str) -> Self {
        Self {
            title: title.to_string(),
            plot: clean_text(plot),
            cover: cover.to_string(),
            ..Default::default()
        }
    }

    /// True when nothing but the title is known.
    pub fn is_empty(&self) -> bool {
        let only_title = Metadata {
            title: self.title.clone(),
            ..Default::default()
        };
        *self == only_title
    }

    pub fn has_code(&self) -> bool {
        !self.code.is_empty()
    }

    /// `S2E5 - The Dark Defender`
    pub fn seasoned_title(&self) -> String {
        format!(
            "S{}E{} - {}",
            self.season.unwrap_or_default(),
            self.episode.unwrap_or_default(),
            self.title
        )
    }

    /// The cover when it is a web link. IMDB covers are resized to `imdb_cover_size`.
    pub fn cover_url(&self, imdb_cover_size: Option<u32>) -> Option<String> {
        if !self.cover.starts_with("http://") && !self.cover.starts_with("https://") {
            return None;
        }
        let Some(size) = imdb_cover_size else {
            return Some(self.cover.clone());
        };
        if !self.cover.contains("media-imdb.com/images/") && !self.cover.contains("media-amazon.com/images/") {
            return Some(self.cover.clone());
        }
        Some(IMDB_SIZE.replace(&self.cover, format!("_SX{}_.jpg", size)).into_owned())
    }
}
