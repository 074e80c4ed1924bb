use uuid::Uuid;

use crate::domain::{Post, PostInsert, PostWithFeed};
use crate::errors::{GatorError, GatorResult};
use crate::storage::sqlite::connection::is_unique_violation;
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::PostRepository;

pub struct SqlitePostRepository {
    storage: SqliteStorage,
}

impl SqlitePostRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

impl PostRepository for SqlitePostRepository {
    fn add(&self, post: &Post) -> GatorResult<PostInsert> {
        let conn = self.storage.connection()?;
        let inserted = conn.execute(
            "INSERT INTO posts (id, feed_id, title, url, description, published_at, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            (
                &post.id,
                &post.feed_id,
                &post.title,
                &post.url,
                &post.description,
                &post.published_at,
                &post.created_at,
                &post.updated_at,
            ),
        );

        // The URL constraint is the dedup mechanism, so a clash is not an error.
        match inserted {
            Ok(_) => Ok(PostInsert::Inserted),
            Err(e) if is_unique_violation(&e) => Ok(PostInsert::Duplicate),
            Err(e) => Err(GatorError::from(e)),
        }
    }

    fn get_for_user(&self, user_id: Uuid, limit: usize) -> GatorResult<Vec<PostWithFeed>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT p.id, p.feed_id, p.title, p.url, p.description, p.published_at, p.created_at, p.updated_at, f.name
             FROM posts p
             JOIN feed_follows ff ON ff.feed_id = p.feed_id
             JOIN feeds f ON f.id = p.feed_id
             WHERE ff.user_id = ?1
             ORDER BY p.published_at DESC NULLS LAST, p.created_at DESC
             LIMIT ?2",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let posts = stmt.query_map((&user_id, limit), |row| {
            Ok(PostWithFeed {
                post: Post {
                    id: row.get(0)?,
                    feed_id: row.get(1)?,
                    title: row.get(2)?,
                    url: row.get(3)?,
                    description: row.get(4)?,
                    published_at: row.get(5)?,
                    created_at: row.get(6)?,
                    updated_at: row.get(7)?,
                },
                feed_name: row.get(8)?,
            })
        })?;

        posts.collect::<Result<Vec<_>, _>>().map_err(GatorError::from)
    }
}
