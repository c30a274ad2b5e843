pub mod cli;
pub mod config;
pub mod core;
pub mod extractors;
pub mod metadata;
pub mod utils;

pub use config::{Config, SiteProfile};
pub use core::{Chooser, Extractor, ExtractorRegistry, Fetcher, ResolveError, Source, SourceList};
pub use metadata::{Metadata, MetadataCache, MetadataKey, MetadataService};
