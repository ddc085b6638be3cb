//! PostgreSQL-backed `ProductRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::ports::{PersistenceError, ProductListFilter, ProductRepository};
use crate::domain::Product;

use super::diesel_helpers::{map_diesel_error, map_pool_error, offset_for_db};
use super::models::{NewProductRow, ProductChangeset, ProductRow};
use super::pool::DbPool;
use super::schema::products;

/// Diesel-backed implementation of the `ProductRepository` port.
#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn insert(&self, product: &Product) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(products::table)
            .values(NewProductRow::from_domain(product))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, product: &Product) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(products::table.filter(products::id.eq(product.id)))
            .set(ProductChangeset::from_domain(product))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ProductRow> = products::table
            .filter(products::id.eq(id))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(ProductRow::into_product).transpose()
    }

    async fn list(
        &self,
        filter: &ProductListFilter,
        page: PageRequest,
    ) -> Result<Vec<Product>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = products::table.select(ProductRow::as_select()).into_boxed();
        if let Some(company_id) = filter.company_id {
            query = query.filter(products::company_id.eq(company_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(products::status.eq(status.as_str()));
        }

        let rows: Vec<ProductRow> = query
            .order(products::created_at.desc())
            .offset(offset_for_db(page.offset()))
            .limit(i64::from(page.limit()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }
}
