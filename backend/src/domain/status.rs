//! Shared soft-delete status for catalogue resources.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle status shared by companies and products.
///
/// Deleting a resource archives it; archived resources stay queryable
/// for audit but are excluded from default listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// Resource is live.
    Active,
    /// Resource is soft-deleted.
    Archived,
}

impl ResourceStatus {
    /// Stable string form used by persistence.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }

    /// Parse the stable string form.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "active" => Some(Self::Active),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}
