mod connection;
mod user_repository;
mod feed_repository;
mod follow_repository;
mod post_repository;

pub use connection::SqliteStorage;
pub use user_repository::SqliteUserRepository;
pub use feed_repository::SqliteFeedRepository;
pub use follow_repository::SqliteFollowRepository;
pub use post_repository::SqlitePostRepository;
