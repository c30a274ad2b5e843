use crate::config::HttpConfig;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use url::Url;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Per-request options understood by a [`Fetcher`].
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Identify as an XMLHttpRequest, some hosts only serve player markup to ajax calls
    pub ajax: bool,
    pub follow_redirects: bool,
    /// Form fields to POST instead of issuing a GET
    pub post_data: Option<Vec<(String, String)>>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            ajax: false,
            follow_redirects: true,
            post_data: None,
        }
    }
}

impl FetchOptions {
    pub fn ajax() -> Self {
        Self {
            ajax: true,
            ..Self::default()
        }
    }

    pub fn post(fields: Vec<(String, String)>) -> Self {
        Self {
            post_data: Some(fields),
            ..Self::default()
        }
    }
}

/// The transport capability the resolver and extractors depend on.
///
/// Failures are plain errors; callers never look at status codes.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String>;

    /// Follows redirects and returns the URL that was finally reached.
    async fn resolve_redirect(&self, url: &str) -> Result<String>;
}

/// reqwest-backed [`Fetcher`] that behaves like a desktop browser.
pub struct HttpFetcher {
    client: reqwest::Client,
    no_redirect_client: reqwest::Client,
    base_url: Url,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig, base_url: &str) -> Result<Self> {
        let client = Self::builder(config)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;
        let no_redirect_client = Self::builder(config)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            no_redirect_client,
            base_url: Url::parse(base_url)?,
        })
    }

    fn builder(config: &HttpConfig) -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout))
            .cookie_store(true)
    }

    /// Site-relative links are resolved against the configured site.
    pub fn target(&self, url: &str) -> Result<Url> {
        match Url::parse(url) {
            Ok(parsed) => Ok(parsed),
            Err(url::ParseError::RelativeUrlWithoutBase) => Ok(self.base_url.join(url)?),
            Err(e) => Err(e.into()),
        }
    }

    fn request(&self, target: Url, options: &FetchOptions) -> reqwest::RequestBuilder {
        let client = if options.follow_redirects {
            &self.client
        } else {
            &self.no_redirect_client
        };

        let mut request = match &options.post_data {
            Some(fields) => client
                .post(target)
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(encode_form(fields)),
            None => client.get(target),
        };

        request = request.header("Accept", ACCEPT_HTML);
        if options.ajax {
            request = request.header("X-Requested-With", "XMLHttpRequest");
        }
        request
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String> {
        let target = self.target(url)?;
        debug!("Getting target '{}' (original: {})", target, url);

        let response = self.request(target, options).send().await?;
        Ok(response.text().await?)
    }

    async fn resolve_redirect(&self, url: &str) -> Result<String> {
        let target = self.target(url)?;
        let response = self
            .request(target, &FetchOptions::default())
            .send()
            .await?;
        let reached = response.url().to_string();
        debug!("Redirect for '{}' ends at '{}'", url, reached);
        Ok(reached)
    }
}

pub fn encode_form(fields: &[(String, String)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
