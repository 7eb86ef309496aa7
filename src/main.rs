use anyhow::Result;
use clap::Parser;
use gif_aggregator::{AggregatorConfig, ClientConfig, GifAggregator, RedditClient};
use std::sync::Arc;
use tracing::{error, info};

/// Pull batches of playable gifs from a subreddit and print them.
#[derive(Parser, Debug)]
#[command(name = "gif-aggregator")]
struct Args {
    /// Subreddit to load. Defaults to a random pick from the catalog.
    #[arg(long)]
    topic: Option<String>,

    /// Playable items to target per batch.
    #[arg(long, default_value_t = gif_aggregator::DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Number of batches to pull before exiting.
    #[arg(long, default_value_t = 1)]
    pages: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let client = Arc::new(RedditClient::new(ClientConfig::default())?);

    let mut config = AggregatorConfig::default();
    config.batch_size = args.batch_size;
    if let Some(topic) = args.topic {
        config.default_topic = topic;
    }

    let aggregator = GifAggregator::with_config(client, config);
    let mut state = aggregator.state();

    info!("Loading /r/{}", aggregator.topic());

    let mut seen = 0usize;
    let mut seen_cursor: Option<String> = None;

    for page in 0..args.pages {
        if page > 0 {
            aggregator.request_next_page();
        }

        let snapshot = state
            .wait_for(|s| {
                !s.loading
                    && (s.gifs.len() != seen || s.cursor != seen_cursor || s.last_error.is_some())
            })
            .await?
            .clone();

        if let Some(message) = &snapshot.last_error {
            error!("{}", message);
            break;
        }

        for gif in &snapshot.gifs[seen..] {
            info!("{} by u/{} ({} comments) -> {}", gif.title, gif.author, gif.comment_count, gif.src);
        }
        info!(
            "Batch {}: {} items total, cursor {:?}",
            page + 1,
            snapshot.gifs.len(),
            snapshot.cursor
        );

        seen = snapshot.gifs.len();
        seen_cursor = snapshot.cursor.clone();

        if snapshot.cursor.is_none() {
            info!("Upstream exhausted, stopping");
            break;
        }
    }

    Ok(())
}
