pub mod traits;
pub mod rss_feed;

pub use traits::{FeedDocument, FeedFetcher, FeedItem};
pub use rss_feed::RssFetcher;
