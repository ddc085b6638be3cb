//! Verification code entity and confirmation guard chain.
//!
//! A code is issued per email address, hashed at rest, valid for five
//! minutes, and burned after three incorrect attempts. The guard chain
//! lives on the entity so every adapter evaluates attempts identically;
//! attempt counting itself is delegated to the repository so racing
//! confirmations cannot under-count.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::email::EmailAddress;

/// Number of digits in a verification code.
pub const CODE_LEN: usize = 6;

/// Seconds a code stays valid after issue.
pub const CODE_TTL_SECS: i64 = 5 * 60;

/// Incorrect attempts allowed before a code is burned.
pub const MAX_TRIES: i16 = 3;

/// Byte length of per-code salts.
const SALT_LEN: usize = 16;

/// Outcome of evaluating a submitted code against a stored one.
///
/// `MismatchedCode` does not mutate the entity; callers must record the
/// failed attempt through the repository's atomic increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCheck {
    /// The submitted code matches and the record is usable.
    Match,
    /// The submitted code does not match.
    MismatchedCode,
    /// The record has already used up its attempts.
    ExhaustedTries,
    /// The record is past its expiry window.
    ExpiredCode,
}

/// Stored verification code record.
///
/// ## Invariants
/// - The plaintext code is never stored; only `SHA-256(salt || code)`.
/// - `tries` counts incorrect submissions, `0..=MAX_TRIES`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCode {
    /// Stable identifier.
    pub id: Uuid,
    /// Address the code was issued to.
    pub email: EmailAddress,
    /// Lowercase hex salt.
    pub salt: String,
    /// Lowercase hex `SHA-256(salt_bytes || code)`.
    pub code_hash: String,
    /// Instant the code stops being accepted.
    pub expires_at: DateTime<Utc>,
    /// Incorrect attempts recorded so far.
    pub tries: i16,
    /// Set once the code has been successfully confirmed.
    pub consumed_at: Option<DateTime<Utc>>,
    /// Issue timestamp.
    pub created_at: DateTime<Utc>,
}

/// A freshly issued code: the stored record plus the plaintext to
/// deliver to the user. The plaintext exists only in this value.
#[derive(Debug, Clone)]
pub struct IssuedCode {
    /// Record to persist.
    pub record: VerificationCode,
    /// Plaintext digits for delivery; never persisted or returned to
    /// API clients.
    pub plaintext: String,
}

impl VerificationCode {
    /// Issue a fresh code for `email` at `now`.
    pub fn issue(email: EmailAddress, now: DateTime<Utc>) -> IssuedCode {
        let mut rng = rand::thread_rng();
        let plaintext = format!("{:06}", rng.gen_range(0..1_000_000u32));

        let mut salt_bytes = [0u8; SALT_LEN];
        rng.fill_bytes(&mut salt_bytes);
        let salt = hex::encode(salt_bytes);
        let code_hash = digest_with_salt(&salt_bytes, &plaintext);

        let record = Self {
            id: Uuid::new_v4(),
            email,
            salt,
            code_hash,
            expires_at: now + Duration::seconds(CODE_TTL_SECS),
            tries: 0,
            consumed_at: None,
            created_at: now,
        };
        IssuedCode { record, plaintext }
    }

    /// Whether `submitted` hashes to the stored digest.
    pub fn matches(&self, submitted: &str) -> bool {
        let Ok(salt_bytes) = hex::decode(&self.salt) else {
            return false;
        };
        digest_with_salt(&salt_bytes, submitted.trim()) == self.code_hash
    }

    /// Evaluate the guard chain for a submitted code at `now`.
    ///
    /// Order matters: a burned code reports [`CodeCheck::ExhaustedTries`]
    /// even when the submitted digits are correct, and an expired one
    /// reports [`CodeCheck::ExpiredCode`] before the digits are compared.
    pub fn check(&self, submitted: &str, now: DateTime<Utc>) -> CodeCheck {
        if self.tries >= MAX_TRIES {
            return CodeCheck::ExhaustedTries;
        }
        if now > self.expires_at {
            return CodeCheck::ExpiredCode;
        }
        if !self.matches(submitted) {
            return CodeCheck::MismatchedCode;
        }
        CodeCheck::Match
    }
}

fn digest_with_salt(salt: &[u8], code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn email() -> EmailAddress {
        EmailAddress::new("guest@promo.plan").expect("valid email")
    }

    #[rstest]
    fn issue_produces_six_digits_and_hashes_them() {
        let now = Utc::now();
        let issued = VerificationCode::issue(email(), now);

        assert_eq!(issued.plaintext.len(), CODE_LEN);
        assert!(issued.plaintext.chars().all(|c| c.is_ascii_digit()));
        assert_ne!(issued.record.code_hash, issued.plaintext);
        assert_eq!(
            issued.record.expires_at,
            now + Duration::seconds(CODE_TTL_SECS)
        );
        assert!(issued.record.matches(&issued.plaintext));
    }

    #[rstest]
    fn matches_tolerates_surrounding_whitespace() {
        let issued = VerificationCode::issue(email(), Utc::now());
        let padded = format!("  {}  ", issued.plaintext);
        assert!(issued.record.matches(&padded));
    }

    #[rstest]
    fn check_accepts_correct_fresh_code() {
        let now = Utc::now();
        let issued = VerificationCode::issue(email(), now);
        assert_eq!(
            issued.record.check(&issued.plaintext, now),
            CodeCheck::Match
        );
    }

    #[rstest]
    fn check_reports_mismatch_before_consuming() {
        let now = Utc::now();
        let issued = VerificationCode::issue(email(), now);
        let wrong = if issued.plaintext == "000000" {
            "000001"
        } else {
            "000000"
        };
        assert_eq!(issued.record.check(wrong, now), CodeCheck::MismatchedCode);
    }

    #[rstest]
    fn check_rejects_expired_codes_even_when_correct() {
        let now = Utc::now();
        let issued = VerificationCode::issue(email(), now);
        let late = now + Duration::seconds(CODE_TTL_SECS + 1);
        assert_eq!(
            issued.record.check(&issued.plaintext, late),
            CodeCheck::ExpiredCode
        );
    }

    #[rstest]
    fn check_accepts_at_exact_expiry_boundary() {
        let now = Utc::now();
        let issued = VerificationCode::issue(email(), now);
        let boundary = now + Duration::seconds(CODE_TTL_SECS);
        assert_eq!(
            issued.record.check(&issued.plaintext, boundary),
            CodeCheck::Match
        );
    }

    #[rstest]
    fn exhausted_tries_mask_both_correct_and_incorrect_codes() {
        let now = Utc::now();
        let mut record = VerificationCode::issue(email(), now).record;
        record.tries = MAX_TRIES;
        assert_eq!(record.check("123456", now), CodeCheck::ExhaustedTries);
    }

    #[rstest]
    fn exhausted_wins_over_expired() {
        let now = Utc::now();
        let issued = VerificationCode::issue(email(), now);
        let mut record = issued.record;
        record.tries = MAX_TRIES;
        let late = now + Duration::seconds(CODE_TTL_SECS + 60);
        assert_eq!(
            record.check(&issued.plaintext, late),
            CodeCheck::ExhaustedTries
        );
    }
}
