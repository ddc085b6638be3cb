//! User aggregate: identity, role, and account status.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::email::{EmailAddress, EmailValidationError};

/// Validation errors returned by the user constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The identifier was empty.
    EmptyId,
    /// The identifier was not a valid UUID.
    InvalidId,
    /// The display name was empty once trimmed.
    EmptyDisplayName,
    /// The display name was shorter than the minimum.
    DisplayNameTooShort {
        /// Minimum accepted length.
        min: usize,
    },
    /// The display name exceeded the maximum.
    DisplayNameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The display name contained characters outside the accepted set.
    DisplayNameInvalidCharacters,
    /// The role string was not recognised.
    UnknownRole,
    /// The status string was not recognised.
    UnknownStatus,
    /// The email failed validation.
    Email(EmailValidationError),
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::DisplayNameTooShort { min } => {
                write!(f, "display name must be at least {min} characters")
            }
            Self::DisplayNameTooLong { max } => {
                write!(f, "display name must be at most {max} characters")
            }
            Self::DisplayNameInvalidCharacters => write!(
                f,
                "display name may only contain letters, numbers, spaces, underscores, or hyphens",
            ),
            Self::UnknownRole => write!(f, "role must be admin, manager, or promoter"),
            Self::UnknownStatus => write!(f, "status must be active, invited, or archived"),
            Self::Email(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for UserValidationError {}

impl From<EmailValidationError> for UserValidationError {
    fn from(value: EmailValidationError) -> Self {
        Self::Email(value)
    }
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Wrap an already-validated UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Human readable display name for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

/// Minimum allowed length for a display name.
pub const DISPLAY_NAME_MIN: usize = 3;
/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 64;

static DISPLAY_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn display_name_regex() -> &'static Regex {
    DISPLAY_NAME_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        let pattern = "^[A-Za-z0-9_ -]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("display name regex failed to compile: {error}"))
    })
}

impl DisplayName {
    /// Validate and construct a [`DisplayName`] from owned input.
    pub fn new(display_name: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(display_name.into())
    }

    fn from_owned(display_name: String) -> Result<Self, UserValidationError> {
        if display_name.trim().is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }

        let length = display_name.chars().count();
        if length < DISPLAY_NAME_MIN {
            return Err(UserValidationError::DisplayNameTooShort {
                min: DISPLAY_NAME_MIN,
            });
        }
        if length > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }

        if !display_name_regex().is_match(&display_name) {
            return Err(UserValidationError::DisplayNameInvalidCharacters);
        }

        Ok(Self(display_name))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Access role granted to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access, including user management.
    Admin,
    /// Manages companies, products, and tastings for their company.
    Manager,
    /// Runs tastings in the field; read-mostly access.
    Promoter,
}

impl Role {
    /// Stable string form used by persistence.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Promoter => "promoter",
        }
    }

    /// Parse the stable string form.
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        match raw {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "promoter" => Ok(Self::Promoter),
            _ => Err(UserValidationError::UnknownRole),
        }
    }
}

/// Lifecycle status of a user account. Deletion is soft: accounts are
/// archived, never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Account can sign in.
    Active,
    /// Account created but the owner has not confirmed their email yet.
    Invited,
    /// Soft-deleted; sign-in refused.
    Archived,
}

impl UserStatus {
    /// Stable string form used by persistence.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Invited => "invited",
            Self::Archived => "archived",
        }
    }

    /// Parse the stable string form.
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        match raw {
            "active" => Ok(Self::Active),
            "invited" => Ok(Self::Invited),
            "archived" => Ok(Self::Archived),
            _ => Err(UserValidationError::UnknownStatus),
        }
    }
}

/// Application user.
///
/// ## Invariants
/// - `id` must be a valid UUID string.
/// - `email` is normalised and unique across the store.
/// - Promoters and managers may carry a `company_id`; admins never do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "UserDto", into = "UserDto")]
pub struct User {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: UserId,
    #[schema(value_type = String, example = "ada@promo.plan")]
    email: EmailAddress,
    #[schema(value_type = String, example = "Ada Lovelace")]
    display_name: DisplayName,
    role: Role,
    #[schema(value_type = Option<String>)]
    company_id: Option<Uuid>,
    status: UserStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Validated fields required to build a [`User`].
#[derive(Debug, Clone)]
pub struct UserParts {
    /// Stable identifier.
    pub id: UserId,
    /// Normalised email address.
    pub email: EmailAddress,
    /// Display name shown in the dashboard.
    pub display_name: DisplayName,
    /// Granted role.
    pub role: Role,
    /// Owning company for managers and promoters.
    pub company_id: Option<Uuid>,
    /// Account status.
    pub status: UserStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a [`User`] from validated components.
    pub fn new(parts: UserParts) -> Self {
        let UserParts {
            id,
            email,
            display_name,
            role,
            company_id,
            status,
            created_at,
            updated_at,
        } = parts;
        Self {
            id,
            email,
            display_name,
            role,
            company_id,
            status,
            created_at,
            updated_at,
        }
    }

    /// Create a fresh, active user with both timestamps set to `now`.
    pub fn create(
        email: EmailAddress,
        display_name: DisplayName,
        role: Role,
        company_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(UserParts {
            id: UserId::random(),
            email,
            display_name,
            role,
            company_id,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Normalised email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Display name shown to other users.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Granted role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Owning company, if any.
    pub fn company_id(&self) -> Option<Uuid> {
        self.company_id
    }

    /// Account status.
    pub fn status(&self) -> UserStatus {
        self.status
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Apply profile edits, bumping `updated_at`.
    pub fn update(
        &mut self,
        display_name: DisplayName,
        role: Role,
        company_id: Option<Uuid>,
        status: UserStatus,
        now: DateTime<Utc>,
    ) {
        self.display_name = display_name;
        self.role = role;
        self.company_id = company_id;
        self.status = status;
        self.updated_at = now;
    }

    /// Soft-delete the account.
    pub fn archive(&mut self, now: DateTime<Utc>) {
        self.status = UserStatus::Archived;
        self.updated_at = now;
    }

    /// Mark an invited account active once its email is confirmed.
    pub fn activate(&mut self, now: DateTime<Utc>) {
        self.status = UserStatus::Active;
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct UserDto {
    id: String,
    email: String,
    display_name: String,
    role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    company_id: Option<Uuid>,
    status: UserStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        let User {
            id,
            email,
            display_name,
            role,
            company_id,
            status,
            created_at,
            updated_at,
        } = value;
        Self {
            id: id.to_string(),
            email: email.into(),
            display_name: display_name.into(),
            role,
            company_id,
            status,
            created_at,
            updated_at,
        }
    }
}

impl TryFrom<UserDto> for User {
    type Error = UserValidationError;

    fn try_from(value: UserDto) -> Result<Self, Self::Error> {
        Ok(User::new(UserParts {
            id: UserId::new(value.id)?,
            email: EmailAddress::new(value.email)?,
            display_name: DisplayName::new(value.display_name)?,
            role: value.role,
            company_id: value.company_id,
            status: value.status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }))
    }
}
