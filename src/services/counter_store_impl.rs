use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::clients::appwrite::{AppwriteClient, AppwriteError, CounterDocument};
use crate::db::Store;
use crate::models::SearchCounter;
use crate::services::counter_store::{CounterStoreError, NewSearchCounter, SearchCountStore};

/// Counters kept in the local `SQLite` database.
pub struct SeaOrmCounterStore {
    store: Store,
}

impl SeaOrmCounterStore {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SearchCountStore for SeaOrmCounterStore {
    async fn increment_or_insert(
        &self,
        counter: &NewSearchCounter,
    ) -> Result<(), CounterStoreError> {
        self.store
            .increment_search_count(&counter.term, counter.movie_id, &counter.poster_url)
            .await?;
        Ok(())
    }

    async fn top(&self, limit: u64) -> Result<Vec<SearchCounter>, CounterStoreError> {
        Ok(self.store.top_search_counters(limit).await?)
    }

    async fn find(&self, term: &str) -> Result<Option<SearchCounter>, CounterStoreError> {
        Ok(self.store.get_search_counter(term).await?)
    }

    async fn ping(&self) -> Result<(), CounterStoreError> {
        Ok(self.store.ping().await?)
    }
}

/// Counters kept in a hosted Appwrite collection.
///
/// Appwrite has no conditional update, so increments are read-then-write and
/// two concurrent searches for the same term can still lose one increment.
/// Creation uses a document id derived from the term, so concurrent first
/// searches collide on the id instead of producing duplicate documents.
pub struct AppwriteCounterStore {
    client: AppwriteClient,
}

impl AppwriteCounterStore {
    #[must_use]
    pub const fn new(client: AppwriteClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn document_id_for(term: &str) -> String {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, term.as_bytes()).to_string()
    }

    fn map_document(doc: CounterDocument) -> SearchCounter {
        SearchCounter {
            id: doc.id,
            term: doc.search_term,
            count: doc.count,
            movie_id: doc.movie_id,
            poster_url: doc.poster_url,
        }
    }
}

#[async_trait]
impl SearchCountStore for AppwriteCounterStore {
    async fn increment_or_insert(
        &self,
        counter: &NewSearchCounter,
    ) -> Result<(), CounterStoreError> {
        if let Some(existing) = self.client.list_by_term(&counter.term).await?.into_iter().next() {
            self.client
                .update_count(&existing.id, existing.count + 1)
                .await?;
            return Ok(());
        }

        let document_id = Self::document_id_for(&counter.term);
        let created = self
            .client
            .create_counter(
                &document_id,
                &counter.term,
                counter.movie_id,
                &counter.poster_url,
            )
            .await;

        match created {
            Ok(_) => {
                debug!("Created search counter {} for '{}'", document_id, counter.term);
                Ok(())
            }
            Err(AppwriteError::Conflict(_)) => {
                warn!(
                    "Search counter for '{}' was created concurrently, incrementing instead",
                    counter.term
                );
                let existing = match self.client.get_document(&document_id).await {
                    Ok(doc) => doc,
                    Err(AppwriteError::Status { status: 404, .. }) => {
                        return Err(CounterStoreError::Conflict(counter.term.clone()));
                    }
                    Err(e) => return Err(e.into()),
                };
                self.client
                    .update_count(&existing.id, existing.count + 1)
                    .await?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn top(&self, limit: u64) -> Result<Vec<SearchCounter>, CounterStoreError> {
        let documents = self.client.list_top(limit).await?;
        Ok(documents.into_iter().map(Self::map_document).collect())
    }

    async fn find(&self, term: &str) -> Result<Option<SearchCounter>, CounterStoreError> {
        let documents = self.client.list_by_term(term).await?;
        Ok(documents.into_iter().next().map(Self::map_document))
    }

    async fn ping(&self) -> Result<(), CounterStoreError> {
        self.client.list_top(1).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_is_stable_and_valid() {
        let id = AppwriteCounterStore::document_id_for("bat");
        assert_eq!(id, AppwriteCounterStore::document_id_for("bat"));
        assert_ne!(id, AppwriteCounterStore::document_id_for("Bat"));
        assert_eq!(id.len(), 36);
        assert!(id.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()));
    }
}
