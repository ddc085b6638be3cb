//! Tasting aggregate: a scheduled promotional event with a status
//! lifecycle.
//!
//! Lifecycle: `draft → scheduled → active → completed`, with `cancelled`
//! reachable from any non-terminal state. Transition legality lives here
//! so adapters and handlers cannot corrupt the lifecycle.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Maximum accepted venue length.
pub const VENUE_MAX: usize = 200;

/// Validation errors returned by the tasting constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TastingValidationError {
    /// The venue was empty once trimmed.
    EmptyVenue,
    /// The venue exceeded [`VENUE_MAX`].
    VenueTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// `ends_at` was not after `starts_at`.
    InvalidWindow,
    /// The status string was not recognised.
    UnknownStatus,
}

impl fmt::Display for TastingValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyVenue => write!(f, "venue must not be empty"),
            Self::VenueTooLong { max } => write!(f, "venue must be at most {max} characters"),
            Self::InvalidWindow => write!(f, "tasting must end after it starts"),
            Self::UnknownStatus => write!(
                f,
                "status must be draft, scheduled, active, completed, or cancelled"
            ),
        }
    }
}

impl std::error::Error for TastingValidationError {}

/// Rejected lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move tasting from {from} to {to}")]
pub struct InvalidTransition {
    /// Status the tasting currently holds.
    pub from: TastingStatus,
    /// Status the caller asked for.
    pub to: TastingStatus,
}

/// Lifecycle status of a tasting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TastingStatus {
    /// Being drafted; not yet visible to promoters.
    Draft,
    /// Confirmed and on the calendar.
    Scheduled,
    /// Currently running.
    Active,
    /// Finished normally. Terminal.
    Completed,
    /// Called off. Terminal.
    Cancelled,
}

impl TastingStatus {
    /// Stable string form used by persistence.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse the stable string form.
    pub fn parse(raw: &str) -> Result<Self, TastingValidationError> {
        match raw {
            "draft" => Ok(Self::Draft),
            "scheduled" => Ok(Self::Scheduled),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(TastingValidationError::UnknownStatus),
        }
    }

    /// Whether the lifecycle permits moving to `next`.
    pub fn can_move_to(self, next: TastingStatus) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Scheduled)
                | (Self::Scheduled, Self::Active)
                | (Self::Active, Self::Completed)
                | (Self::Draft | Self::Scheduled | Self::Active, Self::Cancelled)
        )
    }
}

impl fmt::Display for TastingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn validate_venue(raw: &str) -> Result<String, TastingValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TastingValidationError::EmptyVenue);
    }
    if trimmed.chars().count() > VENUE_MAX {
        return Err(TastingValidationError::VenueTooLong { max: VENUE_MAX });
    }
    Ok(trimmed.to_owned())
}

fn validate_window(
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
) -> Result<(), TastingValidationError> {
    if ends_at <= starts_at {
        return Err(TastingValidationError::InvalidWindow);
    }
    Ok(())
}

/// A promotional tasting event.
///
/// ## Invariants
/// - `ends_at > starts_at`.
/// - `status` only changes along the documented lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tasting {
    /// Stable identifier.
    pub id: Uuid,
    /// Company the event promotes for.
    pub company_id: Uuid,
    /// Product being tasted.
    pub product_id: Uuid,
    /// Assigned promoter, if one has been booked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promoter_id: Option<Uuid>,
    /// Venue description (store name, address).
    pub venue: String,
    /// Scheduled start.
    pub starts_at: DateTime<Utc>,
    /// Scheduled end.
    pub ends_at: DateTime<Utc>,
    /// Lifecycle status.
    pub status: TastingStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Tasting {
    /// Create a draft tasting with validated inputs.
    pub fn create(
        company_id: Uuid,
        product_id: Uuid,
        venue: &str,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, TastingValidationError> {
        validate_window(starts_at, ends_at)?;
        Ok(Self {
            id: Uuid::new_v4(),
            company_id,
            product_id,
            promoter_id: None,
            venue: validate_venue(venue)?,
            starts_at,
            ends_at,
            status: TastingStatus::Draft,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply edits to the schedulable fields, bumping `updated_at`.
    pub fn update(
        &mut self,
        venue: &str,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        promoter_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<(), TastingValidationError> {
        validate_window(starts_at, ends_at)?;
        self.venue = validate_venue(venue)?;
        self.starts_at = starts_at;
        self.ends_at = ends_at;
        self.promoter_id = promoter_id;
        self.updated_at = now;
        Ok(())
    }

    /// Move the tasting along its lifecycle.
    pub fn transition(
        &mut self,
        next: TastingStatus,
        now: DateTime<Utc>,
    ) -> Result<(), InvalidTransition> {
        if !self.status.can_move_to(next) {
            return Err(InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    fn sample_tasting() -> Tasting {
        let now = Utc::now();
        Tasting::create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Riverside Market, stand 4",
            now + Duration::days(1),
            now + Duration::days(1) + Duration::hours(3),
            now,
        )
        .expect("valid tasting")
    }

    #[rstest]
    fn rejects_inverted_windows() {
        let now = Utc::now();
        let err = Tasting::create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Somewhere",
            now + Duration::hours(2),
            now + Duration::hours(1),
            now,
        )
        .expect_err("inverted window rejected");
        assert_eq!(err, TastingValidationError::InvalidWindow);
    }

    #[rstest]
    fn rejects_blank_venues() {
        let now = Utc::now();
        let err = Tasting::create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "   ",
            now,
            now + Duration::hours(1),
            now,
        )
        .expect_err("blank venue rejected");
        assert_eq!(err, TastingValidationError::EmptyVenue);
    }

    #[rstest]
    #[case(TastingStatus::Draft, TastingStatus::Scheduled, true)]
    #[case(TastingStatus::Scheduled, TastingStatus::Active, true)]
    #[case(TastingStatus::Active, TastingStatus::Completed, true)]
    #[case(TastingStatus::Draft, TastingStatus::Cancelled, true)]
    #[case(TastingStatus::Scheduled, TastingStatus::Cancelled, true)]
    #[case(TastingStatus::Active, TastingStatus::Cancelled, true)]
    #[case(TastingStatus::Draft, TastingStatus::Active, false)]
    #[case(TastingStatus::Draft, TastingStatus::Completed, false)]
    #[case(TastingStatus::Completed, TastingStatus::Cancelled, false)]
    #[case(TastingStatus::Cancelled, TastingStatus::Scheduled, false)]
    #[case(TastingStatus::Scheduled, TastingStatus::Draft, false)]
    fn lifecycle_rules(
        #[case] from: TastingStatus,
        #[case] to: TastingStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_move_to(to), allowed);
    }

    #[rstest]
    fn transition_updates_status_and_timestamp() {
        let mut tasting = sample_tasting();
        let later = tasting.updated_at + Duration::seconds(30);
        tasting
            .transition(TastingStatus::Scheduled, later)
            .expect("legal transition");
        assert_eq!(tasting.status, TastingStatus::Scheduled);
        assert_eq!(tasting.updated_at, later);
    }

    #[rstest]
    fn illegal_transition_reports_both_states() {
        let mut tasting = sample_tasting();
        let err = tasting
            .transition(TastingStatus::Completed, Utc::now())
            .expect_err("illegal transition rejected");
        assert_eq!(err.from, TastingStatus::Draft);
        assert_eq!(err.to, TastingStatus::Completed);
    }
}
