use crate::normalize::posts_to_gifs;
use crate::types::{AggregatorError, ClientConfig, FetchPage, RedditResponse, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Page size requested upstream on every call, regardless of how many
/// items the current batch still needs.
pub const UPSTREAM_PAGE_LIMIT: usize = 100;

/// The upstream listing API, seen one page at a time. The aggregator only
/// talks to this trait, so tests can script responses.
#[async_trait]
pub trait ListingApi: Send + Sync {
    /// Fetch one page for `topic`, resuming after `after` when set.
    /// `needed` is echoed back as `still_needed` so the fetch loop can
    /// track its distance from the batch target.
    async fn fetch_page(&self, topic: &str, after: Option<&str>, needed: usize)
        -> Result<FetchPage>;
}

pub struct RedditClient {
    client: Client,
    config: ClientConfig,
}

impl RedditClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Url::parse(&config.feed_root)?;

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, config })
    }

    fn listing_url(&self, topic: &str, after: Option<&str>) -> String {
        let mut url = format!(
            "{}/r/{}/hot/.json?limit={}",
            self.config.feed_root, topic, UPSTREAM_PAGE_LIMIT
        );
        if let Some(after) = after {
            url.push_str("&after=");
            url.push_str(after);
        }
        url
    }
}

#[async_trait]
impl ListingApi for RedditClient {
    async fn fetch_page(&self, topic: &str, after: Option<&str>, needed: usize)
        -> Result<FetchPage>
    {
        let url = self.listing_url(topic, after);
        debug!("Fetching listing page: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            let topic = topic_from_url(response.url()).unwrap_or(topic).to_string();
            return Err(AggregatorError::TopicNotFound { topic });
        }

        if !status.is_success() {
            return Err(AggregatorError::Upstream {
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let listing: RedditResponse = response.json().await?;
        let posts = listing.data.children;
        let cursor = posts.last().map(|post| post.data.name.clone());
        let gifs = posts_to_gifs(&posts);

        debug!(
            "Page for /r/{} yielded {} playable items from {} posts",
            topic,
            gifs.len(),
            posts.len()
        );

        Ok(FetchPage { gifs, still_needed: needed, cursor })
    }
}

/// Recover the topic from a listing URL: the path segment after `r`.
fn topic_from_url(url: &Url) -> Option<&str> {
    let mut segments = url.path_segments()?;
    segments.find(|segment| *segment == "r")?;
    segments.next()
}
