use crate::config::Config;
use crate::core::{notifier_for, ExtractorRegistry, HttpFetcher, PromptChooser, RawLink, SourceList};
use crate::metadata::{
    Metadata, MetadataCache, MetadataRequest, MetadataService, OnlineProvider, TmdbCatalog, TvMazeCatalog,
};
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "vidscout")]
#[command(about = "Find playable streams and metadata for listed movies and shows")]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to ./vidscout.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Pick a file host among the given links and print a playable URL
    Resolve {
        /// A mirror as URL=HOST, repeat for every mirror on the page
        #[arg(short, long = "link", value_name = "URL=HOST", required = true, value_parser = parse_link)]
        links: Vec<RawLink>,

        /// Choose among every single mirror instead of per host
        #[arg(short, long)]
        manual: bool,

        /// Preferred host, repeat in order of preference
        #[arg(short, long = "prefer", value_name = "HOST")]
        prefer: Vec<String>,

        /// Drop hosts no extractor knows
        #[arg(short, long)]
        filter_unsupported: bool,
    },

    /// Print the metadata for a listing URL as JSON
    Metadata {
        #[arg(value_name = "URL")]
        url: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, default_value = "")]
        plot: String,

        #[arg(long, default_value = "")]
        cover: String,

        /// Search the online catalogs for missing records
        #[arg(long)]
        online: bool,

        /// Rebuild the record even when cached
        #[arg(long)]
        bypass_cache: bool,

        /// Title of the show an episode belongs to
        #[arg(long, requires = "show_id")]
        show_title: Option<String>,

        /// Catalog id of the show an episode belongs to
        #[arg(long)]
        show_id: Option<String>,
    },

    /// List the file hosts with a dedicated extractor
    Hosts,
}

fn parse_link(value: &str) -> Result<RawLink, String> {
    match value.rsplit_once('=') {
        Some((url, host)) if !url.is_empty() && !host.is_empty() => Ok(RawLink::new(url, host)),
        _ => Err(format!("expected URL=HOST, got '{}'", value)),
    }
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match &self.command {
            Command::Resolve {
                links,
                manual,
                prefer,
                filter_unsupported,
            } => {
                let registry = ExtractorRegistry::with_builtin();
                let sources = SourceList::new(
                    links.clone(),
                    *filter_unsupported || config.resolver.filter_unsupported,
                    &registry,
                );

                let mut preferred = prefer.clone();
                preferred.extend(config.resolver.preferred_hosts.iter().cloned());
                let preferred = (!preferred.is_empty()).then_some(preferred);

                let source = sources.select_source(
                    *manual || config.resolver.force_manual,
                    preferred.as_deref(),
                    &PromptChooser,
                )?;
                info!("Resolving '{}' with the {} extractor", source.host(), source.extractor_name());

                let fetcher = HttpFetcher::new(&config.http, &config.site.base_url)?;
                let notifier = notifier_for(config.notification);
                let link = source.resolve(&fetcher, notifier.as_ref()).await?;
                println!("{}", link);
            }

            Command::Metadata {
                url,
                title,
                plot,
                cover,
                online,
                bypass_cache,
                show_title,
                show_id,
            } => {
                let service = metadata_service(&config)?;

                let mut request = MetadataRequest::new(url.clone());
                request.title = title.clone();
                request.plot = plot.clone();
                request.cover = cover.clone();
                request.query_online = *online || config.metadata.query_online;
                request.bypass_cache = *bypass_cache;
                request.show = show_id.as_ref().map(|id| Metadata {
                    code: id.clone(),
                    ..Metadata::new(show_title.as_deref().unwrap_or_default(), "", "")
                });

                let mut metadata = service.get(&request).await?;
                if let Some(cover) = metadata.cover_url(config.metadata.imdb_cover_size) {
                    metadata.cover = cover;
                }
                println!("{}", serde_json::to_string_pretty(&metadata)?);
            }

            Command::Hosts => {
                let registry = ExtractorRegistry::with_builtin();
                for host in registry.hosts() {
                    println!("{}", host);
                }
            }
        }

        Ok(())
    }
}

fn metadata_service(config: &Config) -> Result<MetadataService> {
    let cache = Arc::new(MetadataCache::new(config.metadata.cache_dir.clone()));
    let shows = TvMazeCatalog::new(&config.http, config.metadata.load_episode_cover)
        .map_err(|e| anyhow!("Failed to set up TVMaze: {}", e))?;
    let movies = TmdbCatalog::new(&config.http, config.metadata.tmdb_api_key.clone())
        .map_err(|e| anyhow!("Failed to set up TMDB: {}", e))?;
    let provider = OnlineProvider::new(Arc::new(shows), Arc::new(movies), Arc::new(PromptChooser));

    Ok(MetadataService::new(config.site.clone(), cache)
        .with_provider(provider)
        .skip_online_query(config.metadata.skip_online_query))
}
