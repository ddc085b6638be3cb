//! Company aggregate: the client businesses whose products get promoted.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::email::{EmailAddress, EmailValidationError};
use super::status::ResourceStatus;

/// Maximum accepted company name length.
pub const COMPANY_NAME_MAX: usize = 128;

/// Validation errors returned by the company constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanyValidationError {
    /// The name was empty once trimmed.
    EmptyName,
    /// The name exceeded [`COMPANY_NAME_MAX`].
    NameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The contact email failed validation.
    Email(EmailValidationError),
}

impl fmt::Display for CompanyValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "company name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "company name must be at most {max} characters")
            }
            Self::Email(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for CompanyValidationError {}

impl From<EmailValidationError> for CompanyValidationError {
    fn from(value: EmailValidationError) -> Self {
        Self::Email(value)
    }
}

fn validate_name(raw: &str) -> Result<String, CompanyValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CompanyValidationError::EmptyName);
    }
    if trimmed.chars().count() > COMPANY_NAME_MAX {
        return Err(CompanyValidationError::NameTooLong {
            max: COMPANY_NAME_MAX,
        });
    }
    Ok(trimmed.to_owned())
}

/// A client company.
///
/// ## Invariants
/// - `name` is trimmed, non-empty, unique across the store.
/// - `logo_key` is an object-store key set by the logo upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    /// Stable identifier.
    pub id: Uuid,
    /// Trimmed display name.
    pub name: String,
    /// Contact address shown on tasting paperwork.
    #[schema(value_type = String, example = "contact@acme.example")]
    pub contact_email: EmailAddress,
    /// Object-store key of the uploaded logo, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_key: Option<String>,
    /// Soft-delete status.
    pub status: ResourceStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Create a fresh active company with validated inputs.
    pub fn create(
        name: &str,
        contact_email: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, CompanyValidationError> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: validate_name(name)?,
            contact_email: EmailAddress::new(contact_email)?,
            logo_key: None,
            status: ResourceStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply edits, bumping `updated_at`.
    pub fn update(
        &mut self,
        name: &str,
        contact_email: &str,
        now: DateTime<Utc>,
    ) -> Result<(), CompanyValidationError> {
        self.name = validate_name(name)?;
        self.contact_email = EmailAddress::new(contact_email)?;
        self.updated_at = now;
        Ok(())
    }

    /// Record an uploaded logo's object-store key.
    pub fn set_logo_key(&mut self, key: String, now: DateTime<Utc>) {
        self.logo_key = Some(key);
        self.updated_at = now;
    }

    /// Soft-delete the company.
    pub fn archive(&mut self, now: DateTime<Utc>) {
        self.status = ResourceStatus::Archived;
        self.updated_at = now;
    }
}
