//! PostgreSQL-backed `CompanyRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::ports::{CompanyListFilter, CompanyRepository, PersistenceError};
use crate::domain::Company;

use super::diesel_helpers::{map_diesel_error, map_pool_error, offset_for_db};
use super::models::{CompanyChangeset, CompanyRow, NewCompanyRow};
use super::pool::DbPool;
use super::schema::companies;

/// Diesel-backed implementation of the `CompanyRepository` port.
#[derive(Clone)]
pub struct DieselCompanyRepository {
    pool: DbPool,
}

impl DieselCompanyRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyRepository for DieselCompanyRepository {
    async fn insert(&self, company: &Company) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(companies::table)
            .values(NewCompanyRow::from_domain(company))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, company: &Company) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(companies::table.filter(companies::id.eq(company.id)))
            .set(CompanyChangeset::from_domain(company))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CompanyRow> = companies::table
            .filter(companies::id.eq(id))
            .select(CompanyRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(CompanyRow::into_company).transpose()
    }

    async fn list(
        &self,
        filter: &CompanyListFilter,
        page: PageRequest,
    ) -> Result<Vec<Company>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = companies::table
            .select(CompanyRow::as_select())
            .into_boxed();
        if let Some(status) = filter.status {
            query = query.filter(companies::status.eq(status.as_str()));
        }

        let rows: Vec<CompanyRow> = query
            .order(companies::created_at.desc())
            .offset(offset_for_db(page.offset()))
            .limit(i64::from(page.limit()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(CompanyRow::into_company).collect()
    }
}
