use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub user_id: Uuid,
    /// `None` until the aggregator has fetched the feed once.
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Feed {
    pub fn new(name: String, url: String, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            url,
            user_id,
            last_fetched_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A feed joined with the name of the user who added it.
#[derive(Debug, Clone)]
pub struct FeedWithCreator {
    pub feed: Feed,
    pub creator: String,
}
