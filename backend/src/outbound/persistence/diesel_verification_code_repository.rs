//! PostgreSQL-backed `VerificationCodeRepository` implementation.
//!
//! Attempt counting and consumption are single conditional
//! `UPDATE` statements so concurrent confirmations of the same code
//! observe a consistent attempt count without advisory locks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{PersistenceError, VerificationCodeRepository};
use crate::domain::verification::MAX_TRIES;
use crate::domain::{EmailAddress, VerificationCode};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{NewVerificationCodeRow, VerificationCodeRow};
use super::pool::DbPool;
use super::schema::verification_codes;

/// Diesel-backed implementation of the `VerificationCodeRepository` port.
#[derive(Clone)]
pub struct DieselVerificationCodeRepository {
    pool: DbPool,
}

impl DieselVerificationCodeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VerificationCodeRepository for DieselVerificationCodeRepository {
    async fn put(&self, code: &VerificationCode) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Delete-then-insert in one transaction so at most one unconsumed
        // code exists per address at any instant.
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::delete(
                    verification_codes::table
                        .filter(verification_codes::email.eq(code.email.as_str()))
                        .filter(verification_codes::consumed_at.is_null()),
                )
                .execute(conn)
                .await?;

                diesel::insert_into(verification_codes::table)
                    .values(NewVerificationCodeRow::from_domain(code))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn find_latest_unconsumed(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<VerificationCode>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<VerificationCodeRow> = verification_codes::table
            .filter(verification_codes::email.eq(email.as_str()))
            .filter(verification_codes::consumed_at.is_null())
            .order(verification_codes::created_at.desc())
            .select(VerificationCodeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(VerificationCodeRow::into_code).transpose()
    }

    async fn record_failed_attempt(&self, id: Uuid) -> Result<Option<i16>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(
            verification_codes::table
                .filter(verification_codes::id.eq(id))
                .filter(verification_codes::consumed_at.is_null())
                .filter(verification_codes::tries.lt(MAX_TRIES)),
        )
        .set(verification_codes::tries.eq(verification_codes::tries + 1))
        .returning(verification_codes::tries)
        .get_result::<i16>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)
    }

    async fn consume(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            verification_codes::table
                .filter(verification_codes::id.eq(id))
                .filter(verification_codes::consumed_at.is_null())
                .filter(verification_codes::tries.lt(MAX_TRIES)),
        )
        .set(verification_codes::consumed_at.eq(Some(now)))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }
}
