use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Feed, FeedWithCreator};
use crate::errors::{GatorError, GatorResult};
use crate::storage::sqlite::connection::is_unique_violation;
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::FeedRepository;

const FEED_COLUMNS: &str =
    "f.id, f.name, f.url, f.user_id, f.last_fetched_at, f.created_at, f.updated_at";

pub struct SqliteFeedRepository {
    storage: SqliteStorage,
}

impl SqliteFeedRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

pub(crate) fn feed_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Feed> {
    Ok(Feed {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        user_id: row.get(3)?,
        last_fetched_at: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Expects the feed columns followed by the creator's name.
pub(crate) fn feed_with_creator_from_row(
    row: &rusqlite::Row<'_>,
) -> rusqlite::Result<FeedWithCreator> {
    Ok(FeedWithCreator {
        feed: feed_from_row(row)?,
        creator: row.get(7)?,
    })
}

impl FeedRepository for SqliteFeedRepository {
    fn add(&self, feed: &Feed) -> GatorResult<()> {
        let conn = self.storage.connection()?;
        let inserted = conn.execute(
            "INSERT INTO feeds (id, name, url, user_id, last_fetched_at, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            (
                &feed.id,
                &feed.name,
                &feed.url,
                &feed.user_id,
                &feed.last_fetched_at,
                &feed.created_at,
                &feed.updated_at,
            ),
        );

        match inserted {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(GatorError::FeedAlreadyExists(feed.url.clone())),
            Err(e) => Err(GatorError::from(e)),
        }
    }

    fn get_by_url(&self, url: &str) -> GatorResult<Option<Feed>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM feeds f WHERE f.url = ?1", FEED_COLUMNS))?;

        match stmt.query_row([url], feed_from_row) {
            Ok(feed) => Ok(Some(feed)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(GatorError::from(e)),
        }
    }

    fn get_all(&self) -> GatorResult<Vec<FeedWithCreator>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {}, u.name FROM feeds f JOIN users u ON u.id = f.user_id ORDER BY f.created_at",
            FEED_COLUMNS
        ))?;

        let feeds = stmt.query_map([], feed_with_creator_from_row)?;
        feeds.collect::<Result<Vec<_>, _>>().map_err(GatorError::from)
    }

    fn next_to_fetch(&self) -> GatorResult<Option<Feed>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM feeds f ORDER BY f.last_fetched_at ASC NULLS FIRST, f.created_at ASC LIMIT 1",
            FEED_COLUMNS
        ))?;

        match stmt.query_row([], feed_from_row) {
            Ok(feed) => Ok(Some(feed)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(GatorError::from(e)),
        }
    }

    fn mark_fetched(&self, id: Uuid, at: DateTime<Utc>) -> GatorResult<()> {
        let conn = self.storage.connection()?;
        let updated = conn.execute(
            "UPDATE feeds SET last_fetched_at = ?2, updated_at = ?2 WHERE id = ?1",
            (&id, &at),
        )?;

        if updated == 0 {
            return Err(GatorError::FeedNotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::storage::sqlite::SqliteUserRepository;
    use crate::storage::traits::UserRepository;
    use chrono::Duration;

    fn setup() -> (SqliteFeedRepository, User) {
        let storage = SqliteStorage::in_memory().unwrap();
        let users = SqliteUserRepository::new(storage.clone());
        let user = User::new("alice".to_string());
        users.add(&user).unwrap();
        (SqliteFeedRepository::new(storage), user)
    }

    fn feed(name: &str, url: &str, user: &User) -> Feed {
        Feed::new(name.to_string(), url.to_string(), user.id)
    }

    #[test]
    fn test_add_and_get_feed() {
        let (repo, user) = setup();
        let added = feed("Example", "https://example.com/feed", &user);
        repo.add(&added).unwrap();

        let retrieved = repo.get_by_url("https://example.com/feed").unwrap().unwrap();
        assert_eq!(retrieved, added);
        assert!(retrieved.last_fetched_at.is_none());
    }

    #[test]
    fn test_duplicate_url_rejected() {
        let (repo, user) = setup();
        repo.add(&feed("One", "https://example.com/feed", &user)).unwrap();

        let result = repo.add(&feed("Two", "https://example.com/feed", &user));

        assert!(matches!(result, Err(GatorError::FeedAlreadyExists(_))));
    }

    #[test]
    fn test_get_all_includes_creator() {
        let (repo, user) = setup();
        repo.add(&feed("One", "https://one.example.com/feed", &user)).unwrap();
        repo.add(&feed("Two", "https://two.example.com/feed", &user)).unwrap();

        let all = repo.get_all().unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|f| f.creator == "alice"));
    }

    #[test]
    fn test_next_to_fetch_empty() {
        let (repo, _) = setup();
        assert!(repo.next_to_fetch().unwrap().is_none());
    }

    #[test]
    fn test_never_fetched_feeds_come_first() {
        let (repo, user) = setup();
        let fetched = feed("Fetched", "https://fetched.example.com/feed", &user);
        let fresh_a = feed("Fresh A", "https://a.example.com/feed", &user);
        let fresh_b = feed("Fresh B", "https://b.example.com/feed", &user);
        repo.add(&fetched).unwrap();
        repo.add(&fresh_a).unwrap();
        repo.add(&fresh_b).unwrap();
        repo.mark_fetched(fetched.id, Utc::now() - Duration::days(30)).unwrap();

        let first = repo.next_to_fetch().unwrap().unwrap();
        assert!(first.id == fresh_a.id || first.id == fresh_b.id);
        repo.mark_fetched(first.id, Utc::now()).unwrap();

        let second = repo.next_to_fetch().unwrap().unwrap();
        assert_ne!(second.id, fetched.id);
        assert_ne!(second.id, first.id);
        repo.mark_fetched(second.id, Utc::now()).unwrap();

        let third = repo.next_to_fetch().unwrap().unwrap();
        assert_eq!(third.id, fetched.id);
    }

    #[test]
    fn test_oldest_fetch_wins() {
        let (repo, user) = setup();
        let older = feed("Older", "https://older.example.com/feed", &user);
        let newer = feed("Newer", "https://newer.example.com/feed", &user);
        repo.add(&newer).unwrap();
        repo.add(&older).unwrap();

        let now = Utc::now();
        repo.mark_fetched(newer.id, now).unwrap();
        repo.mark_fetched(older.id, now - Duration::minutes(5)).unwrap();

        assert_eq!(repo.next_to_fetch().unwrap().unwrap().id, older.id);
    }

    #[test]
    fn test_mark_fetched_updates_timestamps() {
        let (repo, user) = setup();
        let added = feed("Example", "https://example.com/feed", &user);
        repo.add(&added).unwrap();

        let at = Utc::now();
        repo.mark_fetched(added.id, at).unwrap();

        let retrieved = repo.get_by_url(&added.url).unwrap().unwrap();
        assert_eq!(retrieved.last_fetched_at, Some(at));
        assert_eq!(retrieved.updated_at, at);
    }

    #[test]
    fn test_mark_fetched_unknown_feed() {
        let (repo, _) = setup();
        let result = repo.mark_fetched(Uuid::new_v4(), Utc::now());
        assert!(matches!(result, Err(GatorError::FeedNotFound(_))));
    }
}
