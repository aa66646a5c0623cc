use serde::{Deserialize, Serialize};

/// Cumulative search count for one exact search term, plus the movie that
/// was the top hit the first time the term was searched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCounter {
    /// Store-assigned identifier (row id or document id).
    pub id: String,
    pub term: String,
    pub count: i64,
    pub movie_id: i64,
    pub poster_url: String,
}
