//! Internal Diesel row structs and domain conversions.
//!
//! These types are implementation details of the persistence layer and
//! must never be exposed to the domain. Reads convert rows back into
//! validated domain values; a row that fails validation indicates a
//! corrupt store and surfaces as a query error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::auth::PasswordHash;
use crate::domain::ports::PersistenceError;
use crate::domain::user::{DisplayName, Role, UserId, UserStatus};
use crate::domain::{
    Company, EmailAddress, Guide, Product, ResourceStatus, Tasting, TastingStatus, User, UserParts,
    VerificationCode,
};

use super::schema::{companies, guides, products, tastings, users, verification_codes};

fn corrupt_row(table: &str, id: Uuid, detail: impl std::fmt::Display) -> PersistenceError {
    PersistenceError::query(format!("stored {table} row {id} invalid: {detail}"))
}

fn parse_resource_status(
    table: &str,
    id: Uuid,
    raw: &str,
) -> Result<ResourceStatus, PersistenceError> {
    ResourceStatus::parse(raw)
        .ok_or_else(|| corrupt_row(table, id, format_args!("unknown status {raw:?}")))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub company_id: Option<Uuid>,
    pub status: String,
    pub password_salt: String,
    pub password_digest: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    /// Rebuild the domain user, discarding the credential columns.
    pub(crate) fn into_user(self) -> Result<User, PersistenceError> {
        let email =
            EmailAddress::new(&self.email).map_err(|err| corrupt_row("users", self.id, err))?;
        let display_name = DisplayName::new(self.display_name)
            .map_err(|err| corrupt_row("users", self.id, err))?;
        let role = Role::parse(&self.role).map_err(|err| corrupt_row("users", self.id, err))?;
        let status =
            UserStatus::parse(&self.status).map_err(|err| corrupt_row("users", self.id, err))?;
        Ok(User::new(UserParts {
            id: UserId::from_uuid(self.id),
            email,
            display_name,
            role,
            company_id: self.company_id,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }))
    }

    /// Rebuild the stored credential hash alongside the user.
    pub(crate) fn into_user_and_hash(self) -> Result<(User, PasswordHash), PersistenceError> {
        let hash = PasswordHash::from_stored(self.password_salt.clone(), self.password_digest.clone());
        Ok((self.into_user()?, hash))
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub display_name: &'a str,
    pub role: &'a str,
    pub company_id: Option<Uuid>,
    pub status: &'a str,
    pub password_salt: &'a str,
    pub password_digest: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewUserRow<'a> {
    pub(crate) fn from_domain(user: &'a User, password: &'a PasswordHash) -> Self {
        Self {
            id: *user.id().as_uuid(),
            email: user.email().as_str(),
            display_name: user.display_name().as_ref(),
            role: user.role().as_str(),
            company_id: user.company_id(),
            status: user.status().as_str(),
            password_salt: password.salt(),
            password_digest: password.digest(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

/// Changeset for updating user records; `None` clears the column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserChangeset<'a> {
    pub display_name: &'a str,
    pub role: &'a str,
    pub company_id: Option<Uuid>,
    pub status: &'a str,
    pub updated_at: DateTime<Utc>,
}

impl<'a> UserChangeset<'a> {
    pub(crate) fn from_domain(user: &'a User) -> Self {
        Self {
            display_name: user.display_name().as_ref(),
            role: user.role().as_str(),
            company_id: user.company_id(),
            status: user.status().as_str(),
            updated_at: user.updated_at(),
        }
    }
}

// ---------------------------------------------------------------------------
// Companies
// ---------------------------------------------------------------------------

/// Row struct for reading from the companies table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = companies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CompanyRow {
    pub id: Uuid,
    pub name: String,
    pub contact_email: String,
    pub logo_key: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CompanyRow {
    pub(crate) fn into_company(self) -> Result<Company, PersistenceError> {
        let contact_email = EmailAddress::new(&self.contact_email)
            .map_err(|err| corrupt_row("companies", self.id, err))?;
        let status = parse_resource_status("companies", self.id, &self.status)?;
        Ok(Company {
            id: self.id,
            name: self.name,
            contact_email,
            logo_key: self.logo_key,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insertable struct for creating new company records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = companies)]
pub(crate) struct NewCompanyRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub contact_email: &'a str,
    pub logo_key: Option<&'a str>,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewCompanyRow<'a> {
    pub(crate) fn from_domain(company: &'a Company) -> Self {
        Self {
            id: company.id,
            name: &company.name,
            contact_email: company.contact_email.as_str(),
            logo_key: company.logo_key.as_deref(),
            status: company.status.as_str(),
            created_at: company.created_at,
            updated_at: company.updated_at,
        }
    }
}

/// Changeset for updating company records; `None` clears the column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = companies)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CompanyChangeset<'a> {
    pub name: &'a str,
    pub contact_email: &'a str,
    pub logo_key: Option<&'a str>,
    pub status: &'a str,
    pub updated_at: DateTime<Utc>,
}

impl<'a> CompanyChangeset<'a> {
    pub(crate) fn from_domain(company: &'a Company) -> Self {
        Self {
            name: &company.name,
            contact_email: company.contact_email.as_str(),
            logo_key: company.logo_key.as_deref(),
            status: company.status.as_str(),
            updated_at: company.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// Row struct for reading from the products table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_key: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRow {
    pub(crate) fn into_product(self) -> Result<Product, PersistenceError> {
        let status = parse_resource_status("products", self.id, &self.status)?;
        Ok(Product {
            id: self.id,
            company_id: self.company_id,
            name: self.name,
            description: self.description,
            image_key: self.image_key,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insertable struct for creating new product records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = products)]
pub(crate) struct NewProductRow<'a> {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub image_key: Option<&'a str>,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewProductRow<'a> {
    pub(crate) fn from_domain(product: &'a Product) -> Self {
        Self {
            id: product.id,
            company_id: product.company_id,
            name: &product.name,
            description: product.description.as_deref(),
            image_key: product.image_key.as_deref(),
            status: product.status.as_str(),
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Changeset for updating product records; `None` clears the column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProductChangeset<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub image_key: Option<&'a str>,
    pub status: &'a str,
    pub updated_at: DateTime<Utc>,
}

impl<'a> ProductChangeset<'a> {
    pub(crate) fn from_domain(product: &'a Product) -> Self {
        Self {
            name: &product.name,
            description: product.description.as_deref(),
            image_key: product.image_key.as_deref(),
            status: product.status.as_str(),
            updated_at: product.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Tastings
// ---------------------------------------------------------------------------

/// Row struct for reading from the tastings table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tastings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TastingRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub product_id: Uuid,
    pub promoter_id: Option<Uuid>,
    pub venue: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TastingRow {
    pub(crate) fn into_tasting(self) -> Result<Tasting, PersistenceError> {
        let status = TastingStatus::parse(&self.status)
            .map_err(|err| corrupt_row("tastings", self.id, err))?;
        Ok(Tasting {
            id: self.id,
            company_id: self.company_id,
            product_id: self.product_id,
            promoter_id: self.promoter_id,
            venue: self.venue,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insertable struct for creating new tasting records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tastings)]
pub(crate) struct NewTastingRow<'a> {
    pub id: Uuid,
    pub company_id: Uuid,
    pub product_id: Uuid,
    pub promoter_id: Option<Uuid>,
    pub venue: &'a str,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewTastingRow<'a> {
    pub(crate) fn from_domain(tasting: &'a Tasting) -> Self {
        Self {
            id: tasting.id,
            company_id: tasting.company_id,
            product_id: tasting.product_id,
            promoter_id: tasting.promoter_id,
            venue: &tasting.venue,
            starts_at: tasting.starts_at,
            ends_at: tasting.ends_at,
            status: tasting.status.as_str(),
            created_at: tasting.created_at,
            updated_at: tasting.updated_at,
        }
    }
}

/// Changeset for updating tasting records; `None` clears the column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tastings)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct TastingChangeset<'a> {
    pub promoter_id: Option<Uuid>,
    pub venue: &'a str,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: &'a str,
    pub updated_at: DateTime<Utc>,
}

impl<'a> TastingChangeset<'a> {
    pub(crate) fn from_domain(tasting: &'a Tasting) -> Self {
        Self {
            promoter_id: tasting.promoter_id,
            venue: &tasting.venue,
            starts_at: tasting.starts_at,
            ends_at: tasting.ends_at,
            status: tasting.status.as_str(),
            updated_at: tasting.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Guides
// ---------------------------------------------------------------------------

/// Row struct for reading from the guides table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = guides)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GuideRow {
    pub id: Uuid,
    pub tasting_id: Uuid,
    pub headline: String,
    pub steps: Vec<String>,
    pub attachment_keys: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GuideRow {
    pub(crate) fn into_guide(self) -> Guide {
        Guide {
            id: self.id,
            tasting_id: self.tasting_id,
            headline: self.headline,
            steps: self.steps,
            attachment_keys: self.attachment_keys,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Insertable struct for creating new guide records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = guides)]
pub(crate) struct NewGuideRow<'a> {
    pub id: Uuid,
    pub tasting_id: Uuid,
    pub headline: &'a str,
    pub steps: &'a [String],
    pub attachment_keys: &'a [String],
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewGuideRow<'a> {
    pub(crate) fn from_domain(guide: &'a Guide) -> Self {
        Self {
            id: guide.id,
            tasting_id: guide.tasting_id,
            headline: &guide.headline,
            steps: &guide.steps,
            attachment_keys: &guide.attachment_keys,
            created_at: guide.created_at,
            updated_at: guide.updated_at,
        }
    }
}

/// Changeset replacing a guide's content on upsert.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = guides)]
pub(crate) struct GuideChangeset<'a> {
    pub headline: &'a str,
    pub steps: &'a [String],
    pub attachment_keys: &'a [String],
    pub updated_at: DateTime<Utc>,
}

impl<'a> GuideChangeset<'a> {
    pub(crate) fn from_domain(guide: &'a Guide) -> Self {
        Self {
            headline: &guide.headline,
            steps: &guide.steps,
            attachment_keys: &guide.attachment_keys,
            updated_at: guide.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Verification codes
// ---------------------------------------------------------------------------

/// Row struct for reading from the verification_codes table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = verification_codes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VerificationCodeRow {
    pub id: Uuid,
    pub email: String,
    pub salt: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub tries: i16,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl VerificationCodeRow {
    pub(crate) fn into_code(self) -> Result<VerificationCode, PersistenceError> {
        let email = EmailAddress::new(&self.email)
            .map_err(|err| corrupt_row("verification_codes", self.id, err))?;
        Ok(VerificationCode {
            id: self.id,
            email,
            salt: self.salt,
            code_hash: self.code_hash,
            expires_at: self.expires_at,
            tries: self.tries,
            consumed_at: self.consumed_at,
            created_at: self.created_at,
        })
    }
}

/// Insertable struct for creating new verification code records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = verification_codes)]
pub(crate) struct NewVerificationCodeRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub salt: &'a str,
    pub code_hash: &'a str,
    pub expires_at: DateTime<Utc>,
    pub tries: i16,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl<'a> NewVerificationCodeRow<'a> {
    pub(crate) fn from_domain(code: &'a VerificationCode) -> Self {
        Self {
            id: code.id,
            email: code.email.as_str(),
            salt: &code.salt,
            code_hash: &code.code_hash,
            expires_at: code.expires_at,
            tries: code.tries,
            consumed_at: code.consumed_at,
            created_at: code.created_at,
        }
    }
}
