use crate::domain::{PostWithFeed, User};
use crate::errors::{GatorError, GatorResult};
use crate::storage::Store;

pub const DEFAULT_BROWSE_LIMIT: usize = 2;

pub struct PostService<'a> {
    store: &'a Store,
}

impl<'a> PostService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Newest posts across the feeds `user` follows.
    pub fn browse(&self, user: &User, limit: usize) -> GatorResult<Vec<PostWithFeed>> {
        self.store
            .posts
            .get_for_user(user.id, limit)
            .map_err(|e| GatorError::persistence("couldn't get posts for user", e))
    }
}
