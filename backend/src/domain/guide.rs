//! Guide aggregate: the run sheet a promoter follows during a tasting.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Maximum accepted headline length.
pub const HEADLINE_MAX: usize = 160;

/// Maximum number of steps in a guide.
pub const STEPS_MAX: usize = 50;

/// Validation errors returned by the guide constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuideValidationError {
    /// The headline was empty once trimmed.
    EmptyHeadline,
    /// The headline exceeded [`HEADLINE_MAX`].
    HeadlineTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The guide had no steps.
    NoSteps,
    /// The guide had more than [`STEPS_MAX`] steps.
    TooManySteps {
        /// Maximum accepted count.
        max: usize,
    },
    /// A step was empty once trimmed.
    EmptyStep {
        /// Zero-based index of the offending step.
        index: usize,
    },
}

impl fmt::Display for GuideValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyHeadline => write!(f, "guide headline must not be empty"),
            Self::HeadlineTooLong { max } => {
                write!(f, "guide headline must be at most {max} characters")
            }
            Self::NoSteps => write!(f, "guide must contain at least one step"),
            Self::TooManySteps { max } => {
                write!(f, "guide must contain at most {max} steps")
            }
            Self::EmptyStep { index } => write!(f, "guide step {index} must not be empty"),
        }
    }
}

impl std::error::Error for GuideValidationError {}

fn validate_headline(raw: &str) -> Result<String, GuideValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GuideValidationError::EmptyHeadline);
    }
    if trimmed.chars().count() > HEADLINE_MAX {
        return Err(GuideValidationError::HeadlineTooLong { max: HEADLINE_MAX });
    }
    Ok(trimmed.to_owned())
}

fn validate_steps(raw: Vec<String>) -> Result<Vec<String>, GuideValidationError> {
    if raw.is_empty() {
        return Err(GuideValidationError::NoSteps);
    }
    if raw.len() > STEPS_MAX {
        return Err(GuideValidationError::TooManySteps { max: STEPS_MAX });
    }
    let mut steps = Vec::with_capacity(raw.len());
    for (index, step) in raw.into_iter().enumerate() {
        let trimmed = step.trim();
        if trimmed.is_empty() {
            return Err(GuideValidationError::EmptyStep { index });
        }
        steps.push(trimmed.to_owned());
    }
    Ok(steps)
}

/// Run sheet attached to a tasting. Exactly one guide per tasting.
///
/// ## Invariants
/// - `steps` is non-empty; each step is trimmed and non-empty.
/// - `attachment_keys` reference objects in the file store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Guide {
    /// Stable identifier.
    pub id: Uuid,
    /// Owning tasting; unique across guides.
    pub tasting_id: Uuid,
    /// One-line summary shown at the top of the run sheet.
    pub headline: String,
    /// Ordered instructions for the promoter.
    pub steps: Vec<String>,
    /// Object-store keys for supporting files (price lists, posters).
    pub attachment_keys: Vec<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Guide {
    /// Create a guide for a tasting with validated inputs.
    pub fn create(
        tasting_id: Uuid,
        headline: &str,
        steps: Vec<String>,
        attachment_keys: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, GuideValidationError> {
        Ok(Self {
            id: Uuid::new_v4(),
            tasting_id,
            headline: validate_headline(headline)?,
            steps: validate_steps(steps)?,
            attachment_keys,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the guide content, bumping `updated_at`.
    pub fn update(
        &mut self,
        headline: &str,
        steps: Vec<String>,
        attachment_keys: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<(), GuideValidationError> {
        self.headline = validate_headline(headline)?;
        self.steps = validate_steps(steps)?;
        self.attachment_keys = attachment_keys;
        self.updated_at = now;
        Ok(())
    }
}
