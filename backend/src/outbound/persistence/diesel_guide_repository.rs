//! PostgreSQL-backed `GuideRepository` implementation using Diesel ORM.
//!
//! The guides table carries a unique index on `tasting_id`, so the upsert
//! is expressed as `INSERT ... ON CONFLICT (tasting_id) DO UPDATE`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{GuideRepository, PersistenceError};
use crate::domain::Guide;

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{GuideChangeset, GuideRow, NewGuideRow};
use super::pool::DbPool;
use super::schema::guides;

/// Diesel-backed implementation of the `GuideRepository` port.
#[derive(Clone)]
pub struct DieselGuideRepository {
    pool: DbPool,
}

impl DieselGuideRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GuideRepository for DieselGuideRepository {
    async fn upsert(&self, guide: &Guide) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(guides::table)
            .values(NewGuideRow::from_domain(guide))
            .on_conflict(guides::tasting_id)
            .do_update()
            .set(GuideChangeset::from_domain(guide))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_tasting(
        &self,
        tasting_id: Uuid,
    ) -> Result<Option<Guide>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<GuideRow> = guides::table
            .filter(guides::tasting_id.eq(tasting_id))
            .select(GuideRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(GuideRow::into_guide))
    }

    async fn delete_by_tasting(&self, tasting_id: Uuid) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(guides::table.filter(guides::tasting_id.eq(tasting_id)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
