//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (database, object store, authentication). Each trait exposes strongly
//! typed errors so adapters map their failures into predictable variants
//! instead of returning `anyhow::Result`.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageRequest;
use thiserror::Error;
use uuid::Uuid;

use super::auth::{LoginCredentials, PasswordHash};
use super::company::Company;
use super::email::EmailAddress;
use super::guide::Guide;
use super::product::Product;
use super::status::ResourceStatus;
use super::tasting::{Tasting, TastingStatus};
use super::user::{Role, User, UserId, UserStatus};
use super::verification::VerificationCode;
use super::Error;

/// Failures surfaced by persistence adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// Connection could not be established or was lost.
    #[error("repository connection failed: {message}")]
    Connection {
        /// Driver-level description, safe for logs only.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("repository query failed: {message}")]
    Query {
        /// Driver-level description, safe for logs only.
        message: String,
    },
    /// A uniqueness or foreign-key constraint rejected the write.
    #[error("repository constraint violated: {message}")]
    Conflict {
        /// Which constraint rejected the write.
        message: String,
    },
}

impl PersistenceError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for constraint violations.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

/// Failures surfaced by the object-store adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectStoreError {
    /// Underlying I/O failed.
    #[error("object store I/O failed: {message}")]
    Io {
        /// OS-level description, safe for logs only.
        message: String,
    },
    /// The requested object does not exist.
    #[error("object not found: {key}")]
    NotFound {
        /// Key that was requested.
        key: String,
    },
}

impl ObjectStoreError {
    /// Helper for I/O failures.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Helper for missing objects.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }
}

impl From<PersistenceError> for Error {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::Conflict { .. } => Error::conflict("resource already exists"),
            PersistenceError::Connection { .. } | PersistenceError::Query { .. } => {
                tracing::warn!(error = %err, "persistence failure surfaced to handler");
                Error::internal(err.to_string())
            }
        }
    }
}

impl From<ObjectStoreError> for Error {
    fn from(err: ObjectStoreError) -> Self {
        match err {
            ObjectStoreError::NotFound { .. } => Error::not_found("file not found"),
            ObjectStoreError::Io { .. } => {
                tracing::warn!(error = %err, "object store failure surfaced to handler");
                Error::internal(err.to_string())
            }
        }
    }
}

/// Validation errors returned when constructing [`ObjectKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectKeyValidationError {
    /// Key is empty after trimming whitespace.
    #[error("object key must not be empty")]
    Empty,
    /// Key contains a character outside the accepted set.
    #[error("object key may only contain letters, digits, '.', '_', '-', and '/'")]
    InvalidCharacters,
    /// Key contains an empty, `.`, or `..` path segment.
    #[error("object key must not contain relative path segments")]
    RelativeSegment,
}

/// Key addressing an object in the file store.
///
/// Keys look like `companies/3fa85f64/logo.png`: slash-separated
/// segments of letters, digits, dots, underscores, and hyphens. The
/// constructor rejects anything that could escape the store root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Validate and construct an [`ObjectKey`].
    ///
    /// # Examples
    /// ```
    /// use backend::domain::ports::ObjectKey;
    ///
    /// let key = ObjectKey::new("products/abc/shot.jpg").expect("valid key");
    /// assert_eq!(key.as_str(), "products/abc/shot.jpg");
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, ObjectKeyValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(ObjectKeyValidationError::Empty);
        }
        let valid_chars = raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '/'));
        if !valid_chars {
            return Err(ObjectKeyValidationError::InvalidCharacters);
        }
        for segment in raw.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(ObjectKeyValidationError::RelativeSegment);
            }
        }
        Ok(Self(raw))
    }

    /// Borrow the underlying key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Filters applied when listing users.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserListFilter {
    /// Restrict to a single role.
    pub role: Option<Role>,
    /// Restrict to a single status.
    pub status: Option<UserStatus>,
}

/// Filters applied when listing companies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompanyListFilter {
    /// Restrict to a single status.
    pub status: Option<ResourceStatus>,
}

/// Filters applied when listing products.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductListFilter {
    /// Restrict to one company's products.
    pub company_id: Option<Uuid>,
    /// Restrict to a single status.
    pub status: Option<ResourceStatus>,
}

/// Filters applied when listing tastings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TastingListFilter {
    /// Restrict to one company's tastings.
    pub company_id: Option<Uuid>,
    /// Restrict to tastings assigned to one promoter.
    pub promoter_id: Option<Uuid>,
    /// Restrict to a single lifecycle status.
    pub status: Option<TastingStatus>,
}

/// Persistence port for user aggregates.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user with their credential hash.
    ///
    /// Duplicate emails surface as [`PersistenceError::Conflict`].
    async fn insert(&self, user: &User, password: &PasswordHash) -> Result<(), PersistenceError>;

    /// Update an existing user. Returns `false` when no row matched.
    async fn update(&self, user: &User) -> Result<bool, PersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, PersistenceError>;

    /// Fetch a user by normalised email.
    async fn find_by_email(&self, email: &EmailAddress)
    -> Result<Option<User>, PersistenceError>;

    /// List users ordered by creation time, newest first.
    async fn list(
        &self,
        filter: &UserListFilter,
        page: PageRequest,
    ) -> Result<Vec<User>, PersistenceError>;
}

/// Persistence port for company aggregates.
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Insert a new company.
    ///
    /// Duplicate names surface as [`PersistenceError::Conflict`].
    async fn insert(&self, company: &Company) -> Result<(), PersistenceError>;

    /// Update an existing company. Returns `false` when no row matched.
    async fn update(&self, company: &Company) -> Result<bool, PersistenceError>;

    /// Fetch a company by identifier.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, PersistenceError>;

    /// List companies ordered by creation time, newest first.
    async fn list(
        &self,
        filter: &CompanyListFilter,
        page: PageRequest,
    ) -> Result<Vec<Company>, PersistenceError>;
}

/// Persistence port for product aggregates.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a new product.
    async fn insert(&self, product: &Product) -> Result<(), PersistenceError>;

    /// Update an existing product. Returns `false` when no row matched.
    async fn update(&self, product: &Product) -> Result<bool, PersistenceError>;

    /// Fetch a product by identifier.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, PersistenceError>;

    /// List products ordered by creation time, newest first.
    async fn list(
        &self,
        filter: &ProductListFilter,
        page: PageRequest,
    ) -> Result<Vec<Product>, PersistenceError>;
}

/// Persistence port for tasting aggregates.
#[async_trait]
pub trait TastingRepository: Send + Sync {
    /// Insert a new tasting.
    async fn insert(&self, tasting: &Tasting) -> Result<(), PersistenceError>;

    /// Update an existing tasting. Returns `false` when no row matched.
    async fn update(&self, tasting: &Tasting) -> Result<bool, PersistenceError>;

    /// Fetch a tasting by identifier.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tasting>, PersistenceError>;

    /// List tastings ordered by start time, soonest first.
    async fn list(
        &self,
        filter: &TastingListFilter,
        page: PageRequest,
    ) -> Result<Vec<Tasting>, PersistenceError>;
}

/// Persistence port for tasting guides.
#[async_trait]
pub trait GuideRepository: Send + Sync {
    /// Insert or replace the guide for its tasting.
    async fn upsert(&self, guide: &Guide) -> Result<(), PersistenceError>;

    /// Fetch the guide attached to a tasting.
    async fn find_by_tasting(&self, tasting_id: Uuid)
    -> Result<Option<Guide>, PersistenceError>;

    /// Delete the guide attached to a tasting. Returns `false` when no
    /// guide existed.
    async fn delete_by_tasting(&self, tasting_id: Uuid) -> Result<bool, PersistenceError>;
}

/// Persistence port for verification codes.
///
/// Attempt counting and consumption are conditional single-statement
/// updates so concurrent confirmations observe a consistent count.
#[async_trait]
pub trait VerificationCodeRepository: Send + Sync {
    /// Store a fresh code, superseding any outstanding unconsumed code
    /// for the same email.
    async fn put(&self, code: &VerificationCode) -> Result<(), PersistenceError>;

    /// Fetch the most recent unconsumed code for an email.
    async fn find_latest_unconsumed(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<VerificationCode>, PersistenceError>;

    /// Atomically record a failed attempt, returning the new attempt
    /// count, or `None` when the code no longer exists or is consumed.
    async fn record_failed_attempt(&self, id: Uuid) -> Result<Option<i16>, PersistenceError>;

    /// Atomically consume a code. Returns `false` when the code was
    /// already consumed, burned, or missing.
    async fn consume(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, PersistenceError>;
}

/// Authentication port resolving credentials to a user.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Check credentials and return the authenticated user.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;
}

/// Object storage port for uploaded files.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes under a key, replacing any existing object.
    async fn put(&self, key: &ObjectKey, bytes: &[u8]) -> Result<(), ObjectStoreError>;

    /// Read an object's bytes.
    async fn get(&self, key: &ObjectKey) -> Result<Vec<u8>, ObjectStoreError>;

    /// Delete an object. Returns `false` when it did not exist.
    async fn delete(&self, key: &ObjectKey) -> Result<bool, ObjectStoreError>;
}
