use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatorError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Command errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Couldn't resolve current user: {0}")]
    UserResolution(String),

    // Lookup errors
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Feed not found: {0}")]
    FeedNotFound(String),

    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    #[error("Feed already exists: {0}")]
    FeedAlreadyExists(String),

    #[error("Already following: {0}")]
    AlreadyFollowing(String),

    // Network errors
    #[error("Couldn't fetch {url}: {cause}")]
    Fetch {
        url: String,
        #[source]
        cause: FetchCause,
    },

    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("{context}: {source}")]
    Persistence {
        context: String,
        #[source]
        source: Box<GatorError>,
    },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a single feed fetch failed.
#[derive(Error, Debug)]
pub enum FetchCause {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed feed document: {0}")]
    Document(#[from] rss::Error),
}

impl GatorError {
    pub fn fetch(url: &str, cause: impl Into<FetchCause>) -> Self {
        GatorError::Fetch {
            url: url.to_string(),
            cause: cause.into(),
        }
    }

    /// Wraps a store failure with what the caller was trying to do.
    pub fn persistence(context: impl Into<String>, source: GatorError) -> Self {
        GatorError::Persistence {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

pub type GatorResult<T> = Result<T, GatorError>;
