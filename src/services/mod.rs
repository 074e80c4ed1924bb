pub mod aggregator;
pub mod feed_service;
pub mod post_service;
pub mod user_service;

pub use aggregator::{parse_interval, Aggregator, IngestStats, TickOutcome};
pub use feed_service::FeedService;
pub use post_service::{PostService, DEFAULT_BROWSE_LIMIT};
pub use user_service::UserService;
