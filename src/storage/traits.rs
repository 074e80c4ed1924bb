use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Feed, FeedWithCreator, Follow, Post, PostInsert, PostWithFeed, User};
use crate::errors::GatorResult;

#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    fn add(&self, user: &User) -> GatorResult<()>;
    fn get_by_name(&self, name: &str) -> GatorResult<Option<User>>;
    fn get_all(&self) -> GatorResult<Vec<User>>;
    /// Deletes every user; feeds, follows and posts go with them.
    fn delete_all(&self) -> GatorResult<()>;
}

#[cfg_attr(test, mockall::automock)]
pub trait FeedRepository: Send + Sync {
    fn add(&self, feed: &Feed) -> GatorResult<()>;
    fn get_by_url(&self, url: &str) -> GatorResult<Option<Feed>>;
    fn get_all(&self) -> GatorResult<Vec<FeedWithCreator>>;
    /// The feed fetched longest ago, never-fetched feeds first.
    fn next_to_fetch(&self) -> GatorResult<Option<Feed>>;
    fn mark_fetched(&self, id: Uuid, at: DateTime<Utc>) -> GatorResult<()>;
}

#[cfg_attr(test, mockall::automock)]
pub trait FollowRepository: Send + Sync {
    fn add(&self, follow: &Follow) -> GatorResult<()>;
    /// Returns false when the user was not following the feed.
    fn remove(&self, user_id: Uuid, feed_id: Uuid) -> GatorResult<bool>;
    fn get_for_user(&self, user_id: Uuid) -> GatorResult<Vec<FeedWithCreator>>;
}

#[cfg_attr(test, mockall::automock)]
pub trait PostRepository: Send + Sync {
    fn add(&self, post: &Post) -> GatorResult<PostInsert>;
    fn get_for_user(&self, user_id: Uuid, limit: usize) -> GatorResult<Vec<PostWithFeed>>;
}
