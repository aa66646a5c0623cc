//! Persistence seam for search counters.
//!
//! The trending aggregator only talks to [`SearchCountStore`], so the
//! embedded SQLite backend, the Appwrite backend and test fakes are
//! interchangeable.

use crate::clients::appwrite::AppwriteError;
use crate::models::SearchCounter;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CounterStoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Store request failed: {0}")]
    Transport(String),

    #[error("Store returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid store response: {0}")]
    Decode(String),

    #[error("Search counter for '{0}' was created concurrently and could not be re-read")]
    Conflict(String),
}

impl From<sea_orm::DbErr> for CounterStoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<AppwriteError> for CounterStoreError {
    fn from(err: AppwriteError) -> Self {
        match err {
            AppwriteError::Transport(e) => Self::Transport(e.to_string()),
            AppwriteError::Status { status, body } => Self::Status {
                status,
                message: body,
            },
            AppwriteError::Conflict(body) => Self::Status {
                status: 409,
                message: body,
            },
            AppwriteError::Decode(e) => Self::Decode(e.to_string()),
            AppwriteError::Endpoint(msg) => Self::Transport(msg),
        }
    }
}

/// Values written when a term is seen for the first time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSearchCounter {
    pub term: String,
    pub movie_id: i64,
    pub poster_url: String,
}

#[async_trait::async_trait]
pub trait SearchCountStore: Send + Sync {
    /// Adds one to the counter for `counter.term`, creating it with a count
    /// of 1 when it does not exist. An existing counter keeps its movie and
    /// poster.
    ///
    /// # Errors
    ///
    /// Returns [`CounterStoreError`] when the backing store is unreachable
    /// or rejects the write.
    async fn increment_or_insert(&self, counter: &NewSearchCounter)
    -> Result<(), CounterStoreError>;

    /// Counters ordered by count, highest first, at most `limit` of them.
    ///
    /// # Errors
    ///
    /// Returns [`CounterStoreError`] when the backing store is unreachable.
    async fn top(&self, limit: u64) -> Result<Vec<SearchCounter>, CounterStoreError>;

    async fn find(&self, term: &str) -> Result<Option<SearchCounter>, CounterStoreError>;

    /// Cheap round trip used by health checks.
    async fn ping(&self) -> Result<(), CounterStoreError>;
}
