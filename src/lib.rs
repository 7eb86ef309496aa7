pub mod aggregator;
pub mod client;
pub mod normalize;
pub mod topics;
pub mod types;

pub use aggregator::{GifAggregator, DEFAULT_BATCH_SIZE, MAX_FETCH_ATTEMPTS};
pub use client::{ListingApi, RedditClient, UPSTREAM_PAGE_LIMIT};
pub use normalize::{best_src_for_post, post_to_gif, posts_to_gifs, resolve_thumbnail, DEFAULT_THUMBNAIL};
pub use topics::{random_subreddit, SUBREDDITS};
pub use types::*;
