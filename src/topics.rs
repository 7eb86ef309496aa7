use crate::aggregator::Event;
use rand::Rng;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// Known-good topics for the startup default and the randomize action.
pub const SUBREDDITS: &[&str] = &[
    "gifs",
    "aww",
    "AnimalsBeingDerps",
    "BetterEveryLoop",
    "catgifs",
    "Eyebleach",
    "gifsthatkeepongiving",
    "interestingasfuck",
    "mechanical_gifs",
    "oddlysatisfying",
    "perfectloops",
    "shittyrobots",
    "wholesomegifs",
    "woahdude",
];

pub fn random_subreddit() -> &'static str {
    let index = rand::thread_rng().gen_range(0..SUBREDDITS.len());
    SUBREDDITS[index]
}

/// How long a topic edit must sit quiet before it becomes a topic change.
pub(crate) const DEBOUNCE: Duration = Duration::from_millis(300);

/// Spawn the topic selector task and return the edit channel.
///
/// The selector emits the default topic immediately, then forwards edits
/// once they have been quiet for [`DEBOUNCE`] and differ from the last
/// emitted topic. Empty or whitespace edits fall back to the default.
pub(crate) fn spawn_selector(
    default_topic: String,
    events: mpsc::UnboundedSender<Event>,
) -> mpsc::UnboundedSender<String> {
    let (edits_tx, mut edits_rx) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        let mut last_emitted = default_topic.clone();
        let _ = events.send(Event::TopicChanged(default_topic.clone()));

        let mut pending: Option<String> = None;
        let mut deadline = Instant::now();

        loop {
            tokio::select! {
                edit = edits_rx.recv() => match edit {
                    Some(text) => {
                        pending = Some(text);
                        deadline = Instant::now() + DEBOUNCE;
                    }
                    None => break,
                },
                _ = sleep_until(deadline), if pending.is_some() => {
                    let raw = pending.take().unwrap_or_default();
                    let topic = if raw.trim().is_empty() {
                        default_topic.clone()
                    } else {
                        raw
                    };

                    if topic == last_emitted {
                        debug!("Ignoring repeated topic /r/{}", topic);
                        continue;
                    }

                    last_emitted = topic.clone();
                    if events.send(Event::TopicChanged(topic)).is_err() {
                        break;
                    }
                }
            }
        }
    });

    edits_tx
}
