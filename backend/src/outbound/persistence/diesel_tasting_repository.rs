//! PostgreSQL-backed `TastingRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::ports::{PersistenceError, TastingListFilter, TastingRepository};
use crate::domain::Tasting;

use super::diesel_helpers::{map_diesel_error, map_pool_error, offset_for_db};
use super::models::{NewTastingRow, TastingChangeset, TastingRow};
use super::pool::DbPool;
use super::schema::tastings;

/// Diesel-backed implementation of the `TastingRepository` port.
#[derive(Clone)]
pub struct DieselTastingRepository {
    pool: DbPool,
}

impl DieselTastingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TastingRepository for DieselTastingRepository {
    async fn insert(&self, tasting: &Tasting) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(tastings::table)
            .values(NewTastingRow::from_domain(tasting))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, tasting: &Tasting) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(tastings::table.filter(tastings::id.eq(tasting.id)))
            .set(TastingChangeset::from_domain(tasting))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tasting>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TastingRow> = tastings::table
            .filter(tastings::id.eq(id))
            .select(TastingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(TastingRow::into_tasting).transpose()
    }

    async fn list(
        &self,
        filter: &TastingListFilter,
        page: PageRequest,
    ) -> Result<Vec<Tasting>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = tastings::table.select(TastingRow::as_select()).into_boxed();
        if let Some(company_id) = filter.company_id {
            query = query.filter(tastings::company_id.eq(company_id));
        }
        if let Some(promoter_id) = filter.promoter_id {
            query = query.filter(tastings::promoter_id.eq(promoter_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(tastings::status.eq(status.as_str()));
        }

        let rows: Vec<TastingRow> = query
            .order(tastings::starts_at.asc())
            .offset(offset_for_db(page.offset()))
            .limit(i64::from(page.limit()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(TastingRow::into_tasting).collect()
    }
}
