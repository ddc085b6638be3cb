//! Domain primitives and aggregates.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, plus the ports adapters implement. Keep types
//! validated at construction and document invariants and serialisation
//! contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode — API error response payload and stable codes.
//! - User, Company, Product, Tasting, Guide — the catalogue aggregates.
//! - VerificationCode / VerificationService — the email code flow.
//! - ports — repository, login and object-store traits.

pub mod auth;
pub mod company;
pub mod email;
pub mod error;
pub mod guide;
pub mod ports;
pub mod product;
pub mod status;
pub mod tasting;
pub mod user;
pub mod verification;
pub mod verification_service;

pub use self::auth::{LoginCredentials, LoginValidationError, Password, PasswordHash};
pub use self::company::{Company, CompanyValidationError};
pub use self::email::{EmailAddress, EmailValidationError};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::guide::{Guide, GuideValidationError};
pub use self::product::{Product, ProductValidationError};
pub use self::status::ResourceStatus;
pub use self::tasting::{InvalidTransition, Tasting, TastingStatus, TastingValidationError};
pub use self::user::{DisplayName, Role, User, UserParts, UserStatus, UserValidationError};
pub use self::verification::{CodeCheck, IssuedCode, VerificationCode};
pub use self::verification_service::{PendingVerification, VerificationService};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
