use url::Url;

use crate::domain::{Feed, FeedWithCreator, Follow, User};
use crate::errors::{GatorError, GatorResult};
use crate::storage::Store;

pub struct FeedService<'a> {
    store: &'a Store,
}

impl<'a> FeedService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Register a feed owned by `user` and follow it on their behalf.
    pub fn add(&self, user: &User, name: &str, url: &str) -> GatorResult<Feed> {
        validate_url(url)?;

        let feed = Feed::new(name.to_string(), url.to_string(), user.id);
        self.store
            .feeds
            .add(&feed)
            .map_err(|e| GatorError::persistence("couldn't add feed", e))?;

        self.store
            .follows
            .add(&Follow::new(user.id, feed.id))
            .map_err(|e| GatorError::persistence("couldn't follow feed", e))?;

        Ok(feed)
    }

    pub fn list(&self) -> GatorResult<Vec<FeedWithCreator>> {
        self.store
            .feeds
            .get_all()
            .map_err(|e| GatorError::persistence("couldn't get feeds", e))
    }

    /// Follow an already registered feed.
    pub fn follow(&self, user: &User, url: &str) -> GatorResult<FeedWithCreator> {
        let feed = self.find(url)?;

        self.store
            .follows
            .add(&Follow::new(user.id, feed.id))
            .map_err(|e| GatorError::persistence("couldn't follow feed", e))?;

        let creator = self
            .store
            .follows
            .get_for_user(user.id)?
            .into_iter()
            .find(|f| f.feed.id == feed.id)
            .map(|f| f.creator)
            .unwrap_or_default();

        Ok(FeedWithCreator { feed, creator })
    }

    pub fn following(&self, user: &User) -> GatorResult<Vec<FeedWithCreator>> {
        self.store
            .follows
            .get_for_user(user.id)
            .map_err(|e| GatorError::persistence("couldn't get following feeds", e))
    }

    /// Returns false when `user` wasn't following the feed.
    pub fn unfollow(&self, user: &User, url: &str) -> GatorResult<bool> {
        let feed = self.find(url)?;
        self.store
            .follows
            .remove(user.id, feed.id)
            .map_err(|e| GatorError::persistence("couldn't unfollow feed", e))
    }

    fn find(&self, url: &str) -> GatorResult<Feed> {
        self.store
            .feeds
            .get_by_url(url)?
            .ok_or_else(|| GatorError::FeedNotFound(url.to_string()))
    }
}

fn validate_url(url: &str) -> GatorResult<()> {
    let parsed = Url::parse(url)
        .map_err(|e| GatorError::InvalidArgument(format!("invalid feed url {}: {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(GatorError::InvalidArgument(format!(
            "unsupported url scheme: {}",
            scheme
        ))),
    }
}
