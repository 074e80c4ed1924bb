use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: Uuid,
    pub feed_id: Uuid,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(feed_id: Uuid, title: String, url: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            feed_id,
            title,
            url,
            description: None,
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_published_at(mut self, published_at: Option<DateTime<Utc>>) -> Self {
        self.published_at = published_at;
        self
    }
}

/// A post joined with the name of the feed it came from.
#[derive(Debug, Clone)]
pub struct PostWithFeed {
    pub post: Post,
    pub feed_name: String,
}

/// Result of an idempotent post insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostInsert {
    Inserted,
    /// A post with the same URL is already stored.
    Duplicate,
}
