//! Metadata for movies, shows and episodes: derived cache keys, bucketed JSON
//! cache files and online catalog lookups.

pub mod cache;
pub mod key;
pub mod provider;
pub mod record;
pub mod service;
pub mod tmdb;
pub mod tvmaze;
mod tvmaze_types;

use thiserror::Error;

pub use cache::{Bucket, CacheError, MetadataCache};
pub use key::{MediaType, MetadataKey};
pub use provider::{Catalog, CatalogError, EpisodeCatalog, OnlineProvider, SearchHit};
pub use record::Metadata;
pub use service::{MetadataRequest, MetadataService};
pub use tmdb::TmdbCatalog;
pub use tvmaze::TvMazeCatalog;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Not a media item URL: {0}")]
    InvalidUrl(String),

    #[error("No season and episode numbers in episode URL: {0}")]
    MissingEpisodeNumbers(String),
}
