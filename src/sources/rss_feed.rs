use std::sync::OnceLock;
use std::time::Duration;

use htmlescape::decode_html;
use regex::{Captures, Regex};
use reqwest::blocking::Client;
use rss::Channel;
use tracing::debug;

use crate::errors::{FetchCause, GatorError, GatorResult};
use crate::sources::traits::{FeedDocument, FeedFetcher, FeedItem};

/// Sent with every request so feed hosts can identify us.
pub const USER_AGENT: &str = "gator";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RssFetcher {
    client: Client,
}

impl RssFetcher {
    pub fn new(timeout: Duration) -> GatorResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| GatorError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    fn parse_bytes(bytes: &[u8]) -> Result<FeedDocument, rss::Error> {
        let channel = Channel::read_from(bytes)?;
        Ok(FeedDocument::from(channel))
    }
}

impl FeedFetcher for RssFetcher {
    fn fetch(&self, url: &str) -> GatorResult<FeedDocument> {
        debug!(url, "fetching feed");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| GatorError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatorError::fetch(url, FetchCause::Status(status)));
        }

        let bytes = response.bytes().map_err(|e| GatorError::fetch(url, e))?;
        Self::parse_bytes(&bytes).map_err(|e| GatorError::fetch(url, e))
    }
}

fn entity_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);")
            .expect("valid entity regex")
    })
}

/// Decode each HTML entity once. Bare `&` and unknown entities are kept verbatim.
fn unescape(text: &str) -> String {
    entity_pattern()
        .replace_all(text, |caps: &Captures<'_>| {
            decode_html(&caps[0]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

impl From<Channel> for FeedDocument {
    fn from(channel: Channel) -> Self {
        let items = channel
            .items()
            .iter()
            .map(|item| FeedItem {
                title: item.title().map(unescape).unwrap_or_default(),
                link: item.link().map(|l| l.trim().to_string()),
                description: item.description().map(unescape),
                pub_date: item.pub_date().map(str::to_string),
            })
            .collect();

        FeedDocument {
            title: unescape(channel.title()),
            link: channel.link().to_string(),
            description: unescape(channel.description()),
            items,
        }
    }
}
