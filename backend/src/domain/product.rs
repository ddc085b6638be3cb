//! Product aggregate: items a company promotes at tastings.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::status::ResourceStatus;

/// Maximum accepted product name length.
pub const PRODUCT_NAME_MAX: usize = 128;

/// Maximum accepted product description length.
pub const PRODUCT_DESCRIPTION_MAX: usize = 2_000;

/// Validation errors returned by the product constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductValidationError {
    /// The name was empty once trimmed.
    EmptyName,
    /// The name exceeded [`PRODUCT_NAME_MAX`].
    NameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The description exceeded [`PRODUCT_DESCRIPTION_MAX`].
    DescriptionTooLong {
        /// Maximum accepted length.
        max: usize,
    },
}

impl fmt::Display for ProductValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "product name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "product name must be at most {max} characters")
            }
            Self::DescriptionTooLong { max } => {
                write!(f, "product description must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for ProductValidationError {}

fn validate_name(raw: &str) -> Result<String, ProductValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ProductValidationError::EmptyName);
    }
    if trimmed.chars().count() > PRODUCT_NAME_MAX {
        return Err(ProductValidationError::NameTooLong {
            max: PRODUCT_NAME_MAX,
        });
    }
    Ok(trimmed.to_owned())
}

fn validate_description(
    raw: Option<&str>,
) -> Result<Option<String>, ProductValidationError> {
    let Some(raw) = raw else { return Ok(None) };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > PRODUCT_DESCRIPTION_MAX {
        return Err(ProductValidationError::DescriptionTooLong {
            max: PRODUCT_DESCRIPTION_MAX,
        });
    }
    Ok(Some(trimmed.to_owned()))
}

/// A promotable product belonging to a company.
///
/// ## Invariants
/// - `name` is trimmed and non-empty.
/// - `image_key` is an object-store key set by the image upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Stable identifier.
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Trimmed display name.
    pub name: String,
    /// Optional marketing blurb.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Object-store key of the uploaded product shot, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_key: Option<String>,
    /// Soft-delete status.
    pub status: ResourceStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Create a fresh active product with validated inputs.
    pub fn create(
        company_id: Uuid,
        name: &str,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, ProductValidationError> {
        Ok(Self {
            id: Uuid::new_v4(),
            company_id,
            name: validate_name(name)?,
            description: validate_description(description)?,
            image_key: None,
            status: ResourceStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply edits, bumping `updated_at`.
    pub fn update(
        &mut self,
        name: &str,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), ProductValidationError> {
        self.name = validate_name(name)?;
        self.description = validate_description(description)?;
        self.updated_at = now;
        Ok(())
    }

    /// Record an uploaded product shot's object-store key.
    pub fn set_image_key(&mut self, key: String, now: DateTime<Utc>) {
        self.image_key = Some(key);
        self.updated_at = now;
    }

    /// Soft-delete the product.
    pub fn archive(&mut self, now: DateTime<Utc>) {
        self.status = ResourceStatus::Archived;
        self.updated_at = now;
    }
}
