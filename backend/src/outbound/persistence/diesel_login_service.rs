//! Database-backed `LoginService` implementation.
//!
//! Looks up the credential hash stored alongside the user row and
//! verifies the submitted password against it. Unknown addresses, wrong
//! passwords, and archived accounts all collapse into the same
//! `unauthorized` error so responses never reveal which emails exist.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::LoginService;
use crate::domain::user::UserStatus;
use crate::domain::{Error, LoginCredentials, User};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::UserRow;
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the `LoginService` port.
#[derive(Clone)]
pub struct DieselLoginService {
    pool: DbPool,
}

impl DieselLoginService {
    /// Create a new login service with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn rejected(reason: &'static str) -> Error {
    debug!(reason, "login rejected");
    Error::unauthorized("invalid credentials")
}

#[async_trait]
impl LoginService for DieselLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(credentials.email().as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let Some(row) = row else {
            return Err(rejected("unknown email"));
        };
        let (user, hash) = row.into_user_and_hash()?;
        if !hash.verify(credentials.password()) {
            return Err(rejected("password mismatch"));
        }
        if user.status() == UserStatus::Archived {
            return Err(rejected("archived account"));
        }
        Ok(user)
    }
}
