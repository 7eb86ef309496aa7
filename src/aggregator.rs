use crate::client::ListingApi;
use crate::topics::{random_subreddit, spawn_selector};
use crate::types::{AggregatorConfig, FetchPage, Gif, GifsState};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Playable items one fetch sequence tries to accumulate before yielding.
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Upper bound on upstream requests per fetch sequence. Keeps topics with
/// almost no playable content from fetching forever.
pub const MAX_FETCH_ATTEMPTS: usize = 15;

#[derive(Debug)]
pub(crate) enum Event {
    TopicChanged(String),
    PageRequested,
    SequenceDone { generation: u64, outcome: SequenceOutcome },
}

/// Everything one fetch sequence produced: the concatenated pages (absent
/// when the very first request failed) and the error that cut it short.
#[derive(Debug)]
pub(crate) struct SequenceOutcome {
    fetched: Option<FetchPage>,
    error: Option<String>,
}

/// The feed aggregation engine.
///
/// Consumes topic edits and pagination requests, owns the adaptive fetch
/// loop, and publishes one immutable [`GifsState`] snapshot per change over
/// a watch channel. All state mutation happens on a single actor task;
/// handles are cheap to clone into the view layer.
pub struct GifAggregator {
    edits: mpsc::UnboundedSender<String>,
    events: mpsc::UnboundedSender<Event>,
    state_rx: watch::Receiver<GifsState>,
    topic_rx: watch::Receiver<String>,
}

impl GifAggregator {
    pub fn new(api: Arc<dyn ListingApi>) -> Self {
        Self::with_config(api, AggregatorConfig::default())
    }

    pub fn with_config(api: Arc<dyn ListingApi>, config: AggregatorConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(GifsState::default());
        let (topic_tx, topic_rx) = watch::channel(config.default_topic.clone());

        let edits = spawn_selector(config.default_topic, events_tx.clone());

        let actor = Actor {
            api,
            batch_size: config.batch_size,
            events: events_tx.clone(),
            state: state_tx,
            topic_tx,
            topic: String::new(),
            generation: 0,
            in_flight: false,
            queued_pages: 0,
        };
        tokio::spawn(actor.run(events_rx));

        Self {
            edits,
            events: events_tx,
            state_rx,
            topic_rx,
        }
    }

    /// Submit a raw topic edit. Edits are debounced and deduplicated, so
    /// rapid keystrokes or repeated values trigger at most one fetch.
    pub fn change_topic(&self, text: impl Into<String>) {
        let _ = self.edits.send(text.into());
    }

    /// Submit a uniformly random topic from the catalog as an edit.
    pub fn randomize_topic(&self) {
        let _ = self.edits.send(random_subreddit().to_string());
    }

    /// Ask for the next batch from the current cursor. Requests issued
    /// while a fetch sequence is in flight are queued and served in
    /// arrival order.
    pub fn request_next_page(&self) {
        let _ = self.events.send(Event::PageRequested);
    }

    /// Subscribe to state snapshots.
    pub fn state(&self) -> watch::Receiver<GifsState> {
        self.state_rx.clone()
    }

    /// The topic the engine is currently serving.
    pub fn topic(&self) -> String {
        self.topic_rx.borrow().clone()
    }

    pub fn subscribe_topic(&self) -> watch::Receiver<String> {
        self.topic_rx.clone()
    }
}

/// Single owner of [`GifsState`]. One mutation entry point per event kind,
/// applied atomically; fetch sequences run on spawned tasks stamped with a
/// generation so completions for an abandoned topic are discarded.
struct Actor {
    api: Arc<dyn ListingApi>,
    batch_size: usize,
    events: mpsc::UnboundedSender<Event>,
    state: watch::Sender<GifsState>,
    topic_tx: watch::Sender<String>,
    topic: String,
    generation: u64,
    in_flight: bool,
    queued_pages: usize,
}

impl Actor {
    async fn run(mut self, mut events: mpsc::UnboundedReceiver<Event>) {
        while let Some(event) = events.recv().await {
            match event {
                Event::TopicChanged(topic) => self.on_topic_changed(topic),
                Event::PageRequested => self.on_page_requested(),
                Event::SequenceDone { generation, outcome } => {
                    self.on_sequence_done(generation, outcome)
                }
            }
        }
    }

    fn on_topic_changed(&mut self, topic: String) {
        info!("Loading /r/{}", topic);
        self.generation += 1;
        self.queued_pages = 0;
        self.topic = topic.clone();
        self.topic_tx.send_replace(topic);

        self.state.send_modify(|state| {
            state.gifs.clear();
            state.cursor = None;
            state.last_error = None;
            state.loading = true;
        });

        self.start_sequence(None);
    }

    fn on_page_requested(&mut self) {
        if self.topic.is_empty() {
            debug!("No topic resolved yet, ignoring page request");
            return;
        }

        if self.in_flight {
            self.queued_pages += 1;
            debug!(
                "Fetch in flight, queueing page request ({} waiting)",
                self.queued_pages
            );
            return;
        }

        let cursor = self.state.borrow().cursor.clone();
        self.state.send_modify(|state| state.loading = true);
        self.start_sequence(cursor);
    }

    fn on_sequence_done(&mut self, generation: u64, outcome: SequenceOutcome) {
        if generation != self.generation {
            debug!("Discarding results of superseded fetch sequence");
            return;
        }

        self.in_flight = false;
        if let Some(message) = &outcome.error {
            warn!("Fetch sequence for /r/{} failed: {}", self.topic, message);
        }

        self.state.send_modify(|state| {
            if let Some(page) = outcome.fetched {
                state.gifs.extend(page.gifs);
                state.cursor = page.cursor;
            }
            if let Some(message) = outcome.error {
                state.last_error = Some(message);
            }
            state.loading = false;
        });

        if self.queued_pages > 0 {
            self.queued_pages -= 1;
            let cursor = self.state.borrow().cursor.clone();
            self.state.send_modify(|state| state.loading = true);
            self.start_sequence(cursor);
        }
    }

    fn start_sequence(&mut self, cursor: Option<String>) {
        self.in_flight = true;
        let api = self.api.clone();
        let topic = self.topic.clone();
        let generation = self.generation;
        let target = self.batch_size;
        let events = self.events.clone();

        tokio::spawn(async move {
            let outcome = run_fetch_sequence(api.as_ref(), &topic, cursor, target).await;
            let _ = events.send(Event::SequenceDone { generation, outcome });
        });
    }
}

/// The adaptive multi-page loop: chain upstream requests until the batch
/// target is met, the cursor runs out, or the attempt budget is spent.
/// A request failure short-circuits the loop but keeps the pages already
/// accumulated.
async fn run_fetch_sequence(
    api: &dyn ListingApi,
    topic: &str,
    mut cursor: Option<String>,
    target: usize,
) -> SequenceOutcome {
    let mut gifs: Vec<Gif> = Vec::new();
    let mut needed = target;
    let mut fetched_any = false;
    let mut error = None;

    for attempt in 1..=MAX_FETCH_ATTEMPTS {
        match api.fetch_page(topic, cursor.as_deref(), needed).await {
            Ok(page) => {
                fetched_any = true;
                needed = page.still_needed.saturating_sub(page.gifs.len());
                cursor = page.cursor.clone();
                gifs.extend(page.gifs);

                debug!(
                    "Attempt {}/{} for /r/{}: {} collected, {} still needed",
                    attempt,
                    MAX_FETCH_ATTEMPTS,
                    topic,
                    gifs.len(),
                    needed
                );

                if needed == 0 || cursor.is_none() {
                    break;
                }
            }
            Err(err) => {
                error = Some(err.to_string());
                break;
            }
        }
    }

    let fetched = fetched_any.then(|| FetchPage { gifs, still_needed: needed, cursor });
    SequenceOutcome { fetched, error }
}
