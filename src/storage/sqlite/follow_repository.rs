use uuid::Uuid;

use crate::domain::{FeedWithCreator, Follow};
use crate::errors::{GatorError, GatorResult};
use crate::storage::sqlite::connection::is_unique_violation;
use crate::storage::sqlite::feed_repository::feed_with_creator_from_row;
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::FollowRepository;

pub struct SqliteFollowRepository {
    storage: SqliteStorage,
}

impl SqliteFollowRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

impl FollowRepository for SqliteFollowRepository {
    fn add(&self, follow: &Follow) -> GatorResult<()> {
        let conn = self.storage.connection()?;
        let inserted = conn.execute(
            "INSERT INTO feed_follows (id, user_id, feed_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                &follow.id,
                &follow.user_id,
                &follow.feed_id,
                &follow.created_at,
                &follow.updated_at,
            ),
        );

        match inserted {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(GatorError::AlreadyFollowing(follow.feed_id.to_string()))
            }
            Err(e) => Err(GatorError::from(e)),
        }
    }

    fn remove(&self, user_id: Uuid, feed_id: Uuid) -> GatorResult<bool> {
        let conn = self.storage.connection()?;
        let deleted = conn.execute(
            "DELETE FROM feed_follows WHERE user_id = ?1 AND feed_id = ?2",
            (&user_id, &feed_id),
        )?;
        Ok(deleted > 0)
    }

    fn get_for_user(&self, user_id: Uuid) -> GatorResult<Vec<FeedWithCreator>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT f.id, f.name, f.url, f.user_id, f.last_fetched_at, f.created_at, f.updated_at, u.name
             FROM feed_follows ff
             JOIN feeds f ON f.id = ff.feed_id
             JOIN users u ON u.id = f.user_id
             WHERE ff.user_id = ?1
             ORDER BY ff.created_at",
        )?;

        let feeds = stmt.query_map([user_id], feed_with_creator_from_row)?;
        feeds.collect::<Result<Vec<_>, _>>().map_err(GatorError::from)
    }
}
