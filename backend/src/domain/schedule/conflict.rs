//! Conflict detection and deterministic auto-resolution for draft schedules.
//!
//! Detection is a pure scan over a draft's matches plus the blackout set and
//! the season's already-published fixtures. It is idempotent: the output is
//! ordered by (matchday, display order, kickoff, match id) and re-running it
//! on unchanged inputs reproduces the same conflict set.

use chrono::{DateTime, Days, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::blackout::BlackoutDate;
use super::draft::DraftMatch;

/// Minimum days between two matches of the same team.
pub const MIN_REST_DAYS: i64 = 2;
/// Two matches at one venue within this many hours clash.
pub const VENUE_CLASH_WINDOW_HOURS: i64 = 4;
/// Upper bound on auto-resolution passes before giving up.
const MAX_RESOLUTION_PASSES: usize = 16;

/// Category of a detected conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Match date intersects an applicable blackout window.
    BlackoutViolation,
    /// Same team appears in two matches on one calendar date.
    DoubleBooking,
    /// Fewer than [`MIN_REST_DAYS`] between a team's consecutive matches.
    RestPeriod,
    /// Two matches share a venue with kickoffs inside the clash window.
    VenueClash,
}

impl ConflictKind {
    /// Stable wire name for persistence and payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BlackoutViolation => "blackout_violation",
            Self::DoubleBooking => "double_booking",
            Self::RestPeriod => "rest_period",
            Self::VenueClash => "venue_clash",
        }
    }

    /// Parse a stable wire name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "blackout_violation" => Some(Self::BlackoutViolation),
            "double_booking" => Some(Self::DoubleBooking),
            "rest_period" => Some(Self::RestPeriod),
            "venue_clash" => Some(Self::VenueClash),
            _ => None,
        }
    }
}

/// How serious a conflict is. `Error` blocks submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictSeverity {
    /// Informational only; never counted against the draft.
    Info,
    /// Should be fixed; counted but does not block submission.
    Warning,
    /// Must be fixed before the draft can be submitted.
    Error,
}

impl ConflictSeverity {
    /// Stable wire name for persistence and payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    /// Parse a stable wire name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "info" => Some(Self::Info),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// One detected problem attached to a draft match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleConflict {
    /// The match the conflict is attached to.
    pub draft_match_id: Uuid,
    /// Category.
    pub kind: ConflictKind,
    /// Severity class.
    pub severity: ConflictSeverity,
    /// Human-readable description.
    pub description: String,
    /// Whether the deterministic resolution pass may move the match.
    pub auto_resolvable: bool,
    /// Suggested manual fix.
    pub suggested_resolution: Option<String>,
}

/// An already-published match in the season, checked against the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedFixture {
    /// Match identifier.
    pub match_id: Uuid,
    /// Home side.
    pub home_team_id: Uuid,
    /// Away side.
    pub away_team_id: Uuid,
    /// Scheduled kickoff.
    pub kickoff: DateTime<Utc>,
    /// Assigned venue, if any.
    pub venue_id: Option<Uuid>,
}

impl PublishedFixture {
    fn involves(&self, team: Uuid) -> bool {
        self.home_team_id == team || self.away_team_id == team
    }
}

/// Scan the draft's matches and return every conflict, deterministically
/// ordered.
pub fn detect_conflicts(
    matches: &[DraftMatch],
    blackouts: &[BlackoutDate],
    published: &[PublishedFixture],
) -> Vec<ScheduleConflict> {
    let mut ordered: Vec<&DraftMatch> = matches.iter().collect();
    ordered.sort_by_key(|m| (m.matchday, m.display_order, m.kickoff, m.id));

    let mut conflicts = Vec::new();
    for subject in &ordered {
        check_blackouts(subject, blackouts, &mut conflicts);
        check_double_booking(subject, &ordered, published, &mut conflicts);
        check_rest_period(subject, &ordered, &mut conflicts);
        check_venue_clash(subject, &ordered, published, &mut conflicts);
    }
    conflicts
}

/// Count of unresolved conflicts at warning severity or above.
pub fn unresolved_count(conflicts: &[ScheduleConflict]) -> u32 {
    let count = conflicts
        .iter()
        .filter(|c| c.severity >= ConflictSeverity::Warning)
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Whether any error-severity conflict remains; these block submission.
pub fn has_blocking(conflicts: &[ScheduleConflict]) -> bool {
    conflicts
        .iter()
        .any(|c| c.severity == ConflictSeverity::Error)
}

fn check_blackouts(
    subject: &DraftMatch,
    blackouts: &[BlackoutDate],
    conflicts: &mut Vec<ScheduleConflict>,
) {
    let date = subject.kickoff.date_naive();
    for blackout in blackouts {
        if blackout.blocks(date, subject.home_team_id, subject.away_team_id, subject.venue_id) {
            let reason = blackout
                .reason
                .clone()
                .unwrap_or_else(|| "blackout period".to_owned());
            conflicts.push(ScheduleConflict {
                draft_match_id: subject.id,
                kind: ConflictKind::BlackoutViolation,
                severity: ConflictSeverity::Error,
                description: format!("match on {date} falls inside blackout: {reason}"),
                auto_resolvable: true,
                suggested_resolution: Some("shift the match to the next open date".to_owned()),
            });
        }
    }
}

fn check_double_booking(
    subject: &DraftMatch,
    ordered: &[&DraftMatch],
    published: &[PublishedFixture],
    conflicts: &mut Vec<ScheduleConflict>,
) {
    let date = subject.kickoff.date_naive();
    let clashes_in_draft = ordered.iter().any(|other| {
        other.id != subject.id
            && other.kickoff.date_naive() == date
            && shares_team(subject, other)
    });
    let clashes_published = published.iter().any(|existing| {
        existing.kickoff.date_naive() == date
            && (existing.involves(subject.home_team_id) || existing.involves(subject.away_team_id))
    });
    if clashes_in_draft || clashes_published {
        let against = if clashes_published {
            " (against a published match)"
        } else {
            ""
        };
        conflicts.push(ScheduleConflict {
            draft_match_id: subject.id,
            kind: ConflictKind::DoubleBooking,
            severity: ConflictSeverity::Error,
            description: format!("a team has multiple matches scheduled on {date}{against}"),
            auto_resolvable: false,
            suggested_resolution: Some("reschedule one of the matches".to_owned()),
        });
    }
}

fn check_rest_period(
    subject: &DraftMatch,
    ordered: &[&DraftMatch],
    conflicts: &mut Vec<ScheduleConflict>,
) {
    for other in ordered {
        if other.id == subject.id || !shares_team(subject, other) {
            continue;
        }
        let gap = (other.kickoff.date_naive() - subject.kickoff.date_naive())
            .num_days()
            .abs();
        // Same-day pairs are already a double booking.
        if gap >= 1 && gap < MIN_REST_DAYS {
            conflicts.push(ScheduleConflict {
                draft_match_id: subject.id,
                kind: ConflictKind::RestPeriod,
                severity: ConflictSeverity::Warning,
                description: format!(
                    "less than {MIN_REST_DAYS} days of rest before the match on {}",
                    other.kickoff.date_naive()
                ),
                auto_resolvable: true,
                suggested_resolution: Some(format!(
                    "push the later match until at least {MIN_REST_DAYS} days separate them"
                )),
            });
        }
    }
}

fn check_venue_clash(
    subject: &DraftMatch,
    ordered: &[&DraftMatch],
    published: &[PublishedFixture],
    conflicts: &mut Vec<ScheduleConflict>,
) {
    let Some(venue) = subject.venue_id else {
        return;
    };
    let window = chrono::Duration::hours(VENUE_CLASH_WINDOW_HOURS).num_seconds();
    let near = |other_kickoff: DateTime<Utc>| {
        (other_kickoff - subject.kickoff).num_seconds().abs() < window
    };
    let clash_in_draft = ordered
        .iter()
        .any(|other| other.id != subject.id && other.venue_id == Some(venue) && near(other.kickoff));
    let clash_published = published
        .iter()
        .any(|existing| existing.venue_id == Some(venue) && near(existing.kickoff));
    if clash_in_draft || clash_published {
        conflicts.push(ScheduleConflict {
            draft_match_id: subject.id,
            kind: ConflictKind::VenueClash,
            severity: ConflictSeverity::Error,
            description: format!(
                "venue is booked within {VENUE_CLASH_WINDOW_HOURS} hours of this kickoff"
            ),
            auto_resolvable: false,
            suggested_resolution: Some("use a different venue or adjust the kickoff".to_owned()),
        });
    }
}

fn shares_team(a: &DraftMatch, b: &DraftMatch) -> bool {
    let teams = [a.home_team_id, a.away_team_id];
    teams.contains(&b.home_team_id) || teams.contains(&b.away_team_id)
}

/// Outcome of a deterministic auto-resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionOutcome {
    /// Matches moved, with their new kickoffs, in the order they were moved.
    pub shifted: Vec<(Uuid, DateTime<Utc>)>,
    /// Conflicts remaining after the pass.
    pub remaining: Vec<ScheduleConflict>,
}

/// Resolve auto-resolvable conflicts by shifting matches forward.
///
/// The pass is deterministic: conflicts are taken in detection order, one
/// shift at a time, and full detection is re-run after every shift. A shift
/// that would introduce a new conflict of equal or higher severity is
/// reverted and its conflict left for manual editing. Non-auto-resolvable
/// conflicts are never touched.
pub fn auto_resolve(
    matches: &mut [DraftMatch],
    blackouts: &[BlackoutDate],
    published: &[PublishedFixture],
) -> ResolutionOutcome {
    let mut shifted = Vec::new();
    let mut skipped: Vec<(Uuid, ConflictKind)> = Vec::new();

    for _ in 0..MAX_RESOLUTION_PASSES {
        let conflicts = detect_conflicts(matches, blackouts, published);
        let Some(next) = conflicts.iter().find(|c| {
            c.auto_resolvable && !skipped.contains(&(c.draft_match_id, c.kind))
        }) else {
            return ResolutionOutcome {
                shifted,
                remaining: conflicts,
            };
        };
        let target = (next.draft_match_id, next.kind);
        let severity = next.severity;
        let before = severity_histogram(&conflicts);

        let Some(new_kickoff) = propose_shift(matches, target, blackouts) else {
            skipped.push(target);
            continue;
        };
        let Some(old_kickoff) = apply_kickoff(matches, target.0, new_kickoff) else {
            skipped.push(target);
            continue;
        };

        let after = severity_histogram(&detect_conflicts(matches, blackouts, published));
        if introduces_worse(before, after, severity) {
            // Revert and leave the conflict for manual editing.
            apply_kickoff(matches, target.0, old_kickoff);
            skipped.push(target);
        } else {
            shifted.push((target.0, new_kickoff));
        }
    }

    ResolutionOutcome {
        remaining: detect_conflicts(matches, blackouts, published),
        shifted,
    }
}

/// Counts of (error, warning) conflicts.
fn severity_histogram(conflicts: &[ScheduleConflict]) -> (usize, usize) {
    let errors = conflicts
        .iter()
        .filter(|c| c.severity == ConflictSeverity::Error)
        .count();
    let warnings = conflicts
        .iter()
        .filter(|c| c.severity == ConflictSeverity::Warning)
        .count();
    (errors, warnings)
}

/// A shift must strictly reduce conflicts at the resolved severity without
/// raising the count at any equal or higher severity.
fn introduces_worse(before: (usize, usize), after: (usize, usize), resolved: ConflictSeverity) -> bool {
    match resolved {
        ConflictSeverity::Error => after.0 >= before.0,
        _ => after.0 > before.0 || after.1 >= before.1,
    }
}

/// Compute the new kickoff for the conflicted match, or None when the kind
/// has no deterministic fix.
fn propose_shift(
    matches: &[DraftMatch],
    target: (Uuid, ConflictKind),
    blackouts: &[BlackoutDate],
) -> Option<DateTime<Utc>> {
    let subject = matches.iter().find(|m| m.id == target.0)?;
    match target.1 {
        ConflictKind::BlackoutViolation => {
            // Advance one day at a time to the next open date.
            let mut kickoff = subject.kickoff;
            for _ in 0..366 {
                kickoff = kickoff.checked_add_days(Days::new(1))?;
                let clear = !blackouts.iter().any(|b| {
                    b.blocks(
                        kickoff.date_naive(),
                        subject.home_team_id,
                        subject.away_team_id,
                        subject.venue_id,
                    )
                });
                if clear {
                    return Some(kickoff);
                }
            }
            None
        }
        ConflictKind::RestPeriod => {
            // Push the later of the offending pair until the gap holds.
            let neighbour = matches
                .iter()
                .filter(|other| other.id != subject.id && shares_team(subject, other))
                .map(|other| other.kickoff)
                .filter(|k| {
                    let gap = (k.date_naive() - subject.kickoff.date_naive()).num_days().abs();
                    gap >= 1 && gap < MIN_REST_DAYS
                })
                .min()?;
            let later = subject.kickoff.max(neighbour);
            let earlier = subject.kickoff.min(neighbour);
            if subject.kickoff != later {
                // The neighbour is the later match; its own conflict entry
                // will drive the shift.
                return None;
            }
            let needed = MIN_REST_DAYS - (later.date_naive() - earlier.date_naive()).num_days();
            later.checked_add_days(Days::new(u64::try_from(needed).ok()?))
        }
        ConflictKind::DoubleBooking | ConflictKind::VenueClash => None,
    }
}

/// Set the kickoff of a match, returning the previous value.
fn apply_kickoff(
    matches: &mut [DraftMatch],
    id: Uuid,
    kickoff: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let subject = matches.iter_mut().find(|m| m.id == id)?;
    let old = subject.kickoff;
    subject.kickoff = kickoff;
    Some(old)
}
