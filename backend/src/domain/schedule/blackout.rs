//! Blackout dates: ranges during which no matches may be scheduled.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Who a blackout applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope", content = "ids")]
pub enum BlackoutScope {
    /// Applies to every match in the league/season.
    All,
    /// Applies only to matches involving one of the listed teams.
    Teams(Vec<Uuid>),
    /// Applies only to matches at the given venue.
    Venue(Uuid),
}

/// Validation errors raised by [`BlackoutDate::try_new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlackoutValidationError {
    /// The range is inverted.
    #[error("blackout end date {end} precedes start date {start}")]
    EndBeforeStart {
        /// First blacked-out date.
        start: NaiveDate,
        /// Last blacked-out date.
        end: NaiveDate,
    },
}

/// An inclusive date range during which applicable matches must not be played.
///
/// Invariant: `end_date >= start_date`, enforced by [`BlackoutDate::try_new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackoutDate {
    /// Stable identifier.
    pub id: Uuid,
    /// First blacked-out date (inclusive).
    pub start_date: NaiveDate,
    /// Last blacked-out date (inclusive).
    pub end_date: NaiveDate,
    /// Who the range applies to.
    pub scope: BlackoutScope,
    /// Free-text reason shown in conflict descriptions.
    pub reason: Option<String>,
}

impl BlackoutDate {
    /// Create a validated blackout range.
    pub fn try_new(
        id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        scope: BlackoutScope,
        reason: Option<String>,
    ) -> Result<Self, BlackoutValidationError> {
        if end_date < start_date {
            return Err(BlackoutValidationError::EndBeforeStart {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            id,
            start_date,
            end_date,
            scope,
            reason,
        })
    }

    /// Whether `date` falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Whether the blackout applies to a match with the given participants.
    ///
    /// Venue-scoped blackouts only apply once a venue is assigned; matches
    /// without a venue pass them.
    pub fn applies_to(&self, home: Uuid, away: Uuid, venue: Option<Uuid>) -> bool {
        match &self.scope {
            BlackoutScope::All => true,
            BlackoutScope::Teams(teams) => teams.contains(&home) || teams.contains(&away),
            BlackoutScope::Venue(blocked) => venue.is_some_and(|v| v == *blocked),
        }
    }

    /// Whether a match on `date` with the given participants is blocked.
    pub fn blocks(&self, date: NaiveDate, home: Uuid, away: Uuid, venue: Option<Uuid>) -> bool {
        self.contains(date) && self.applies_to(home, away, venue)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for blackout ranges.

    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("valid date literal")
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = BlackoutDate::try_new(
            Uuid::new_v4(),
            date("2025-01-10"),
            date("2025-01-08"),
            BlackoutScope::All,
            None,
        )
        .expect_err("inverted range");
        assert!(matches!(err, BlackoutValidationError::EndBeforeStart { .. }));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let blackout = BlackoutDate::try_new(
            Uuid::new_v4(),
            date("2025-01-08"),
            date("2025-01-10"),
            BlackoutScope::All,
            None,
        )
        .expect("valid range");

        assert!(blackout.contains(date("2025-01-08")));
        assert!(blackout.contains(date("2025-01-10")));
        assert!(!blackout.contains(date("2025-01-11")));
    }

    #[test]
    fn team_scope_only_blocks_participants() {
        let team = Uuid::new_v4();
        let other = Uuid::new_v4();
        let blackout = BlackoutDate::try_new(
            Uuid::new_v4(),
            date("2025-01-01"),
            date("2025-01-01"),
            BlackoutScope::Teams(vec![team]),
            None,
        )
        .expect("valid range");

        assert!(blackout.blocks(date("2025-01-01"), team, other, None));
        assert!(!blackout.blocks(date("2025-01-01"), other, other, None));
    }

    #[test]
    fn venue_scope_passes_unassigned_matches() {
        let venue = Uuid::new_v4();
        let blackout = BlackoutDate::try_new(
            Uuid::new_v4(),
            date("2025-01-01"),
            date("2025-01-01"),
            BlackoutScope::Venue(venue),
            None,
        )
        .expect("valid range");

        let (home, away) = (Uuid::new_v4(), Uuid::new_v4());
        assert!(blackout.blocks(date("2025-01-01"), home, away, Some(venue)));
        assert!(!blackout.blocks(date("2025-01-01"), home, away, None));
    }
}
