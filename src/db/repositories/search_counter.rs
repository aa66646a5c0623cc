use crate::entities::{prelude::*, search_counters};
use crate::models::SearchCounter;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};

pub struct SearchCounterRepository {
    conn: DatabaseConnection,
}

impl SearchCounterRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: search_counters::Model) -> SearchCounter {
        SearchCounter {
            id: m.id.to_string(),
            term: m.term,
            count: m.count,
            movie_id: m.movie_id,
            poster_url: m.poster_url,
        }
    }

    /// Single-statement upsert. The unique index on `term` turns a second
    /// insert into `count = count + 1`, so concurrent callers neither
    /// duplicate rows nor lose increments.
    pub async fn increment_or_insert(
        &self,
        term: &str,
        movie_id: i64,
        poster_url: &str,
    ) -> Result<(), DbErr> {
        let now = chrono::Utc::now().to_rfc3339();

        let active_model = search_counters::ActiveModel {
            term: Set(term.to_string()),
            count: Set(1),
            movie_id: Set(movie_id),
            poster_url: Set(poster_url.to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        SearchCounters::insert(active_model)
            .on_conflict(
                OnConflict::column(search_counters::Column::Term)
                    .value(
                        search_counters::Column::Count,
                        Expr::col(search_counters::Column::Count).add(1),
                    )
                    .update_column(search_counters::Column::UpdatedAt)
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn find_by_term(&self, term: &str) -> Result<Option<SearchCounter>, DbErr> {
        let row = SearchCounters::find()
            .filter(search_counters::Column::Term.eq(term))
            .one(&self.conn)
            .await?;

        Ok(row.map(Self::map_model))
    }

    pub async fn top_by_count(&self, limit: u64) -> Result<Vec<SearchCounter>, DbErr> {
        let rows = SearchCounters::find()
            .order_by_desc(search_counters::Column::Count)
            .order_by_asc(search_counters::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }
}
