//! Schedule draft aggregate and its status machine.
//!
//! A draft is a named, versioned schedule proposal owning its matches and
//! conflicts. Status transitions are checked centrally through
//! [`DraftStatus::ensure_can`] so every guard violation produces the same
//! error shape naming the current and requested states.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Lifecycle states of a schedule draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    /// Editable proposal.
    Draft,
    /// Submitted, awaiting review.
    PendingApproval,
    /// Review passed; publishable.
    Approved,
    /// Review failed; editable again and resubmittable.
    Rejected,
    /// Converted to real matches. Terminal.
    Published,
}

impl DraftStatus {
    /// Stable wire name for persistence and payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Published => "published",
        }
    }

    /// Parse a stable wire name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "pending_approval" => Some(Self::PendingApproval),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "published" => Some(Self::Published),
            _ => None,
        }
    }

    /// The complete transition table for the draft workflow.
    pub fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::PendingApproval)
                | (Self::PendingApproval, Self::Approved | Self::Rejected)
                | (Self::Rejected, Self::Draft)
                | (Self::Approved, Self::Published)
        )
    }

    /// Guard helper returning a typed error when the transition is illegal.
    pub fn ensure_can(self, next: Self) -> Result<(), InvalidDraftTransition> {
        if self.can_transition(next) {
            Ok(())
        } else {
            Err(InvalidDraftTransition {
                current: self,
                requested: next,
            })
        }
    }

    /// Whether matches may be edited or reordered in this state.
    ///
    /// Rejected drafts are editable: the first edit moves them back to
    /// [`DraftStatus::Draft`].
    pub fn is_editable(self) -> bool {
        matches!(self, Self::Draft | Self::Rejected)
    }
}

/// A draft status transition rejected by the guard table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("draft cannot move from {} to {}", current.as_str(), requested.as_str())]
pub struct InvalidDraftTransition {
    /// State the draft is currently in.
    pub current: DraftStatus,
    /// State the caller asked for.
    pub requested: DraftStatus,
}

/// Actions recorded in the approval log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftAction {
    /// Draft created by a generation request.
    Created,
    /// Draft submitted for approval.
    Submitted,
    /// Reviewer approved the draft.
    Approved,
    /// Reviewer rejected the draft.
    Rejected,
    /// Draft converted to real matches.
    Published,
    /// Matches edited, reordered, or imported.
    Modified,
    /// Draft removed.
    Deleted,
}

impl DraftAction {
    /// Stable wire name for persistence and payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Published => "published",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        }
    }

    /// Parse a stable wire name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created" => Some(Self::Created),
            "submitted" => Some(Self::Submitted),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "published" => Some(Self::Published),
            "modified" => Some(Self::Modified),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }
}

/// Parameters the draft was generated with, kept for reproducibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    /// Date of the first matchday.
    pub start_date: NaiveDate,
    /// Days between consecutive matchdays.
    pub interval_days: u32,
    /// Whether a reversed second rotation was appended.
    pub double_round_robin: bool,
    /// Seed used to permute the team order, if any.
    pub shuffle_seed: Option<u64>,
    /// Whether blackout windows were skipped during generation.
    pub respect_blackouts: bool,
}

/// A named schedule proposal for one league and season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDraft {
    /// Stable identifier.
    pub id: Uuid,
    /// Owning league.
    pub league_id: Uuid,
    /// Owning season.
    pub season_id: Uuid,
    /// Human-readable name.
    pub name: String,
    /// Current workflow state.
    pub status: DraftStatus,
    /// Parameters the fixtures were generated with.
    pub params: GenerationParams,
    /// Cached count of unresolved conflicts at warning severity or above.
    pub conflict_count: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// When the draft was submitted for approval, if ever.
    pub submitted_at: Option<DateTime<Utc>>,
    /// When a reviewer acted on the draft, if ever.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Identity of the reviewer who approved or rejected.
    pub reviewed_by: Option<String>,
    /// Reason supplied on rejection.
    pub rejection_reason: Option<String>,
}

/// One proposed match inside a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftMatch {
    /// Stable identifier.
    pub id: Uuid,
    /// Owning draft.
    pub draft_id: Uuid,
    /// Home side.
    pub home_team_id: Uuid,
    /// Away side.
    pub away_team_id: Uuid,
    /// Proposed kickoff.
    pub kickoff: DateTime<Utc>,
    /// Assigned venue, if any.
    pub venue_id: Option<Uuid>,
    /// 1-based matchday number.
    pub matchday: u32,
    /// Position within the matchday.
    pub display_order: u32,
    /// Whether conflict detection flagged this match.
    pub has_conflict: bool,
}

/// Immutable record of an action taken against a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalLogEntry {
    /// Stable identifier.
    pub id: Uuid,
    /// Draft the action was taken against.
    pub draft_id: Uuid,
    /// What happened.
    pub action: DraftAction,
    /// Who did it, when known.
    pub actor: Option<String>,
    /// Free-text notes (approval notes, rejection reason, summaries).
    pub notes: Option<String>,
    /// When it happened.
    pub created_at: DateTime<Utc>,
}
