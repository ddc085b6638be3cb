//! Authentication primitives: login credentials and password hashing.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::email::{EmailAddress, EmailValidationError};

/// Minimum accepted password length.
pub const PASSWORD_MIN: usize = 8;

/// Byte length of password salts.
const SALT_LEN: usize = 16;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or malformed.
    Email(EmailValidationError),
    /// Password was blank.
    EmptyPassword,
    /// Password was shorter than [`PASSWORD_MIN`].
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(err) => err.fmt(f),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for LoginValidationError {}

impl From<EmailValidationError> for LoginValidationError {
    fn from(value: EmailValidationError) -> Self {
        Self::Email(value)
    }
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is normalised and valid.
/// - `password` is non-empty but retains caller-provided whitespace to
///   avoid surprising credential comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used for user lookups.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// New password chosen at account creation or reset.
///
/// Unlike [`LoginCredentials`], new passwords enforce the minimum length
/// so weak secrets are rejected before they are ever hashed.
#[derive(Debug, Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate and wrap a candidate password.
    pub fn new(raw: impl Into<String>) -> Result<Self, LoginValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        if raw.chars().count() < PASSWORD_MIN {
            return Err(LoginValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self(Zeroizing::new(raw)))
    }

    /// Borrow the secret for hashing.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Salted SHA-256 digest of a password, stored as hex strings.
///
/// ## Invariants
/// - `salt` and `digest` are lowercase hex.
/// - The digest is `SHA-256(salt_bytes || password_bytes)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    salt: String,
    digest: String,
}

impl PasswordHash {
    /// Derive a hash for a freshly chosen password with a random salt.
    pub fn derive(password: &Password) -> Self {
        let mut salt_bytes = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt = hex::encode(salt_bytes);
        let digest = Self::digest_with_salt(&salt_bytes, password.as_str());
        Self { salt, digest }
    }

    /// Reconstruct a hash from stored hex columns.
    pub fn from_stored(salt: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            salt: salt.into(),
            digest: digest.into(),
        }
    }

    /// Check a login attempt against the stored digest.
    pub fn verify(&self, candidate: &str) -> bool {
        let Ok(salt_bytes) = hex::decode(&self.salt) else {
            return false;
        };
        Self::digest_with_salt(&salt_bytes, candidate) == self.digest
    }

    /// Stored salt as lowercase hex.
    pub fn salt(&self) -> &str {
        self.salt.as_str()
    }

    /// Stored digest as lowercase hex.
    pub fn digest(&self) -> &str {
        self.digest.as_str()
    }

    fn digest_with_salt(salt: &[u8], password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("not-an-email", "pw123456")]
    #[case("", "pw123456")]
    fn credentials_reject_bad_emails(#[case] email: &str, #[case] password: &str) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert!(matches!(err, LoginValidationError::Email(_)));
    }

    #[rstest]
    fn credentials_reject_empty_passwords() {
        let err = LoginCredentials::try_from_parts("a@b.co", "").expect_err("empty password");
        assert_eq!(err, LoginValidationError::EmptyPassword);
    }

    #[rstest]
    fn credentials_keep_password_whitespace() {
        let creds =
            LoginCredentials::try_from_parts("A@B.co", "  spaced  ").expect("valid inputs");
        assert_eq!(creds.email().as_str(), "a@b.co");
        assert_eq!(creds.password(), "  spaced  ");
    }

    #[rstest]
    #[case("", LoginValidationError::EmptyPassword)]
    #[case("short", LoginValidationError::PasswordTooShort { min: PASSWORD_MIN })]
    fn password_enforces_minimum(#[case] raw: &str, #[case] expected: LoginValidationError) {
        let err = Password::new(raw).expect_err("weak password rejected");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn hash_verifies_matching_password_only() {
        let password = Password::new("correct horse battery staple").expect("valid");
        let hash = PasswordHash::derive(&password);

        assert!(hash.verify("correct horse battery staple"));
        assert!(!hash.verify("wrong password"));
    }

    #[rstest]
    fn hashes_use_distinct_salts() {
        let password = Password::new("correct horse battery staple").expect("valid");
        let first = PasswordHash::derive(&password);
        let second = PasswordHash::derive(&password);
        assert_ne!(first.salt(), second.salt());
        assert_ne!(first.digest(), second.digest());
    }

    #[rstest]
    fn stored_round_trip_still_verifies() {
        let password = Password::new("another secret 42").expect("valid");
        let hash = PasswordHash::derive(&password);
        let restored = PasswordHash::from_stored(hash.salt(), hash.digest());
        assert!(restored.verify("another secret 42"));
    }
}
