use crate::errors::GatorResult;

/// A fetched RSS channel, normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDocument {
    pub title: String,
    pub link: String,
    pub description: String,
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: Option<String>,
    pub description: Option<String>,
    /// `pubDate` exactly as the source wrote it.
    pub pub_date: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
pub trait FeedFetcher: Send + Sync {
    /// Download and parse the document at `url`. Either the whole document or an error.
    fn fetch(&self, url: &str) -> GatorResult<FeedDocument>;
}
