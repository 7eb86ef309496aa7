use serde::{Deserialize, Serialize};

use crate::aggregator::DEFAULT_BATCH_SIZE;
use crate::topics::random_subreddit;

/// One listing response from the upstream content API:
/// `{ data: { children: [...] } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct RedditResponse {
    pub data: RedditListing,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RedditListing {
    pub children: Vec<RedditPost>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditPost {
    pub data: PostData,
}

/// Raw post record. Listing JSON is noisy, so every field defaults and all
/// nested media descriptors stay optional down to the innermost URL.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostData {
    /// Opaque id (`t3_...`), doubles as the pagination cursor.
    pub name: String,
    pub author: String,
    pub permalink: String,
    pub title: String,
    pub num_comments: u32,
    pub url: String,
    pub thumbnail: String,
    pub secure_media: Option<MediaEmbed>,
    pub media: Option<MediaEmbed>,
    pub preview: Option<Preview>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaEmbed {
    pub reddit_video: Option<RedditVideo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Preview {
    pub reddit_video_preview: Option<RedditVideo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RedditVideo {
    pub fallback_url: Option<String>,
}

/// A normalized, display-ready item. Only ever derived from a [`PostData`]
/// whose source resolved; see [`crate::normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gif {
    pub src: String,
    pub thumbnail: String,
    pub author: String,
    pub id: String,
    pub permalink: String,
    pub title: String,
    pub comment_count: u32,
}

/// Result of one upstream request: the playable items extracted from the
/// page, the count still needed to satisfy the batch target (echoed from
/// the request), and the cursor to resume from (`None` when the page had
/// no children).
#[derive(Debug, Clone)]
pub struct FetchPage {
    pub gifs: Vec<Gif>,
    pub still_needed: usize,
    pub cursor: Option<String>,
}

/// The single published state snapshot. Mutated only by the aggregator
/// actor; consumers hold watch receivers.
#[derive(Debug, Clone, Default)]
pub struct GifsState {
    /// Append-only within a topic, reset on topic change.
    pub gifs: Vec<Gif>,
    pub loading: bool,
    pub last_error: Option<String>,
    /// Id to resume pagination from. `None` after a completed fetch means
    /// upstream ran out of pages or the attempt budget did.
    pub cursor: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub feed_root: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            feed_root: "https://www.reddit.com".to_string(),
            user_agent: "gif-aggregator/0.1".to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Playable items one fetch sequence tries to accumulate.
    pub batch_size: usize,
    /// Topic served before any user input.
    pub default_topic: String,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            default_topic: random_subreddit().to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("Failed to load gifs for /r/{topic}")]
    TopicNotFound { topic: String },

    #[error("{status_text}")]
    Upstream { status_text: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
