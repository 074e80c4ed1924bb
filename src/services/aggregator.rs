use std::sync::OnceLock;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::{debug, error, info, warn};

use crate::domain::{Feed, Post, PostInsert};
use crate::errors::{GatorError, GatorResult};
use crate::shutdown::Shutdown;
use crate::sources::{FeedDocument, FeedFetcher, FeedItem};
use crate::storage::Store;

/// `pubDate` layout after the `Mon, ` prefix: RFC 1123 with a numeric zone,
/// e.g. `Mon, 02 Jan 2006 15:04:05 -0700`.
pub const PUB_DATE_FORMAT: &str = "%d %b %Y %H:%M:%S %z";

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// What happened to one feed's items during a tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    pub inserted: usize,
    pub duplicates: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to poll, or the store could not pick a feed.
    Idle,
    FetchFailed { url: String },
    MarkFailed { url: String },
    Ingested { url: String, stats: IngestStats },
}

/// Polls one feed per tick, oldest-fetched first, and stores new posts.
pub struct Aggregator<'a> {
    store: &'a Store,
    fetcher: &'a dyn FeedFetcher,
}

impl<'a> Aggregator<'a> {
    pub fn new(store: &'a Store, fetcher: &'a dyn FeedFetcher) -> Self {
        Self { store, fetcher }
    }

    /// Tick immediately, then every `interval`, until `shutdown` is cancelled.
    /// Nothing that goes wrong inside a tick stops the loop.
    pub fn run(&self, interval: Duration, shutdown: &Shutdown) {
        println!("Collecting feeds every {}...", format_interval(interval));
        info!(interval_ms = interval.as_millis() as u64, "aggregator started");

        while !shutdown.is_cancelled() {
            let started = Instant::now();
            self.tick();

            let remaining = interval.saturating_sub(started.elapsed());
            if shutdown.wait_timeout(remaining) {
                break;
            }
        }

        info!("aggregator stopped");
    }

    pub fn tick(&self) -> TickOutcome {
        let feed = match self.store.feeds.next_to_fetch() {
            Ok(Some(feed)) => feed,
            Ok(None) => {
                warn!("couldn't get next feed: no feeds registered");
                return TickOutcome::Idle;
            }
            Err(e) => {
                error!("couldn't get next feed: {}", e);
                return TickOutcome::Idle;
            }
        };

        let document = match self.fetcher.fetch(&feed.url) {
            Ok(document) => document,
            Err(e) => {
                error!(url = %feed.url, "couldn't fetch feed: {}", e);
                return TickOutcome::FetchFailed { url: feed.url };
            }
        };

        // Marked before the items are stored: a fetched feed moves to the back
        // of the queue even if some of its posts fail to save.
        if let Err(e) = self.store.feeds.mark_fetched(feed.id, Utc::now()) {
            error!(url = %feed.url, "couldn't mark feed fetched: {}", e);
            return TickOutcome::MarkFailed { url: feed.url };
        }

        println!("-------- Feed: '{}' ------->", feed.name);
        let stats = self.ingest(&feed, &document);
        println!("<------- Feed: '{}' --------", feed.name);

        info!(
            url = %feed.url,
            inserted = stats.inserted,
            duplicates = stats.duplicates,
            failed = stats.failed,
            "feed ingested"
        );

        TickOutcome::Ingested {
            url: feed.url,
            stats,
        }
    }

    fn ingest(&self, feed: &Feed, document: &FeedDocument) -> IngestStats {
        let mut stats = IngestStats::default();

        for item in &document.items {
            let Some(post) = post_from_item(feed, item) else {
                warn!(url = %feed.url, title = %item.title, "skipping item without a link");
                stats.failed += 1;
                continue;
            };

            match self.store.posts.add(&post) {
                Ok(PostInsert::Inserted) => {
                    println!(" * {}", post.title);
                    stats.inserted += 1;
                }
                Ok(PostInsert::Duplicate) => {
                    debug!(url = %post.url, "post already stored");
                    stats.duplicates += 1;
                }
                Err(e) => {
                    error!(url = %post.url, "couldn't create post: {}", e);
                    stats.failed += 1;
                }
            }
        }

        stats
    }
}

fn post_from_item(feed: &Feed, item: &FeedItem) -> Option<Post> {
    let link = item.link.as_deref().filter(|l| !l.is_empty())?;
    let published_at = item.pub_date.as_deref().and_then(parse_pub_date);

    Some(
        Post::new(feed.id, item.title.clone(), link.to_string())
            .with_description(item.description.clone().filter(|d| !d.is_empty()))
            .with_published_at(published_at),
    )
}

/// `None` when the date doesn't follow [`PUB_DATE_FORMAT`]. The weekday name
/// must be a real one, but it is not checked against the date.
pub fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    let (weekday, rest) = raw.trim().split_once(", ")?;
    if !WEEKDAYS.contains(&weekday) {
        return None;
    }

    DateTime::parse_from_str(rest, PUB_DATE_FORMAT)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn interval_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+(?:\.\d*)?|\.\d+)(ns|us|µs|μs|ms|s|m|h)").expect("valid interval regex")
    })
}

/// Parse a duration such as `30s`, `1m`, `1h30m`, `1.5h` or `250ms`.
pub fn parse_interval(raw: &str) -> GatorResult<Duration> {
    let invalid = || GatorError::InvalidArgument(format!("invalid duration: {:?}", raw));

    let mut rest = raw.trim();
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total_nanos = 0f64;
    while !rest.is_empty() {
        let caps = interval_pattern().captures(rest).ok_or_else(invalid)?;
        let value: f64 = caps[1].parse().map_err(|_| invalid())?;
        let unit_nanos = match &caps[2] {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            _ => 3600e9,
        };
        total_nanos += value * unit_nanos;
        rest = &rest[caps[0].len()..];
    }

    if !total_nanos.is_finite() || total_nanos >= u64::MAX as f64 {
        return Err(invalid());
    }
    let interval = Duration::from_nanos(total_nanos.round() as u64);
    if interval.is_zero() {
        return Err(GatorError::InvalidArgument(
            "duration must be greater than zero".to_string(),
        ));
    }
    Ok(interval)
}

fn format_interval(interval: Duration) -> String {
    let secs = interval.as_secs();
    if interval.subsec_nanos() != 0 || secs == 0 {
        return format!("{}ms", interval.as_millis());
    }

    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    let mut out = String::new();
    if h > 0 {
        out.push_str(&format!("{}h", h));
    }
    if m > 0 {
        out.push_str(&format!("{}m", m));
    }
    if s > 0 || out.is_empty() {
        out.push_str(&format!("{}s", s));
    }
    out
}
