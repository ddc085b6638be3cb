//! Verification flow service: issuing and confirming email codes.
//!
//! The service owns the guard-chain policy; the repository owns the
//! atomic counters. Delivery of the plaintext code (email/SMS) is an
//! outer concern: handlers receive the plaintext in
//! [`PendingVerification`] and must not echo it to API clients.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use super::email::EmailAddress;
use super::ports::{PersistenceError, VerificationCodeRepository};
use super::verification::{CodeCheck, VerificationCode, MAX_TRIES};
use super::Error;

/// Receipt for a freshly requested verification code.
#[derive(Debug, Clone)]
pub struct PendingVerification {
    /// Identifier of the stored code record.
    pub id: Uuid,
    /// Instant the code stops being accepted.
    pub expires_at: DateTime<Utc>,
    /// Plaintext digits for the delivery channel only.
    pub plaintext: String,
}

/// Issues and confirms verification codes against the repository port.
#[derive(Clone)]
pub struct VerificationService {
    codes: Arc<dyn VerificationCodeRepository>,
}

fn map_persistence_error(error: PersistenceError) -> Error {
    warn!(error = %error, "verification repository failure");
    match error {
        PersistenceError::Conflict { .. } => Error::conflict("verification state conflict"),
        PersistenceError::Connection { .. } | PersistenceError::Query { .. } => {
            Error::internal("verification storage unavailable")
        }
    }
}

impl VerificationService {
    /// Create a service over a code repository.
    pub fn new(codes: Arc<dyn VerificationCodeRepository>) -> Self {
        Self { codes }
    }

    /// Issue a fresh code for `email`, superseding any outstanding one.
    pub async fn request(&self, email: EmailAddress) -> Result<PendingVerification, Error> {
        self.request_at(email, Utc::now()).await
    }

    /// Issue a fresh code with an explicit clock, for deterministic tests.
    pub async fn request_at(
        &self,
        email: EmailAddress,
        now: DateTime<Utc>,
    ) -> Result<PendingVerification, Error> {
        let issued = VerificationCode::issue(email, now);
        self.codes
            .put(&issued.record)
            .await
            .map_err(map_persistence_error)?;
        info!(
            code_id = %issued.record.id,
            email = %issued.record.email,
            "verification code issued"
        );
        Ok(PendingVerification {
            id: issued.record.id,
            expires_at: issued.record.expires_at,
            plaintext: issued.plaintext,
        })
    }

    /// Confirm a submitted code for `email`.
    ///
    /// Failure codes follow the guard chain: `not_found` when no code is
    /// outstanding (or it was already consumed), `exceeded_retries` when
    /// the code is burned, `expired` past the five-minute window, and
    /// `code_mismatch` for a wrong code with attempts remaining.
    pub async fn confirm(&self, email: &EmailAddress, submitted: &str) -> Result<(), Error> {
        self.confirm_at(email, submitted, Utc::now()).await
    }

    /// Confirm with an explicit clock, for deterministic tests.
    pub async fn confirm_at(
        &self,
        email: &EmailAddress,
        submitted: &str,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        let code = self
            .codes
            .find_latest_unconsumed(email)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::not_found("no verification code outstanding for this email"))?;

        match code.check(submitted, now) {
            CodeCheck::ExhaustedTries => {
                Err(Error::exceeded_retries("verification code attempts exhausted"))
            }
            CodeCheck::ExpiredCode => Err(Error::expired("verification code has expired")),
            CodeCheck::MismatchedCode => self.record_mismatch(code.id).await,
            CodeCheck::Match => {
                // The conditional consume is the authoritative check; a
                // racing confirmation may have won in the meantime.
                let consumed = self
                    .codes
                    .consume(code.id, now)
                    .await
                    .map_err(map_persistence_error)?;
                if consumed {
                    info!(code_id = %code.id, "verification code confirmed");
                    Ok(())
                } else {
                    Err(Error::not_found("verification code is no longer usable"))
                }
            }
        }
    }

    async fn record_mismatch(&self, code_id: Uuid) -> Result<(), Error> {
        let tries = self
            .codes
            .record_failed_attempt(code_id)
            .await
            .map_err(map_persistence_error)?;
        match tries {
            None => Err(Error::not_found("verification code is no longer usable")),
            Some(count) if count >= MAX_TRIES => {
                Err(Error::exceeded_retries("verification code attempts exhausted"))
            }
            Some(_) => Err(Error::code_mismatch("verification code does not match")),
        }
    }
}
