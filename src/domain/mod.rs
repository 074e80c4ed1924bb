pub mod user;
pub mod feed;
pub mod follow;
pub mod post;

pub use user::User;
pub use feed::{Feed, FeedWithCreator};
pub use follow::Follow;
pub use post::{Post, PostInsert, PostWithFeed};
