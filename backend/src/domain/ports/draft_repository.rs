//! Port for schedule draft persistence and the publish conversion.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::schedule::{
    ApprovalLogEntry, DraftMatch, PublishedFixture, ScheduleConflict, ScheduleDraft,
};

/// Errors raised by draft repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftRepositoryError {
    /// Repository connection could not be established.
    #[error("draft repository connection failed: {message}")]
    Connection {
        /// Adapter failure detail.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("draft repository query failed: {message}")]
    Query {
        /// Adapter failure detail.
        message: String,
    },
    /// The publish conversion could not complete; nothing was written.
    #[error("draft publish conversion failed: {message}")]
    Conversion {
        /// What stopped the conversion.
        message: String,
    },
}

impl DraftRepositoryError {
    /// Build a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Build a query error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Build a conversion error.
    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion {
            message: message.into(),
        }
    }
}

/// Port for draft storage.
///
/// Mutations that touch several tables (draft row, matches, conflicts, log)
/// are single methods so adapters can wrap them in one transaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DraftRepository: Send + Sync {
    /// Persist a freshly generated draft with its matches, conflicts, and
    /// creation log entry.
    async fn insert_draft(
        &self,
        draft: &ScheduleDraft,
        matches: &[DraftMatch],
        conflicts: &[ScheduleConflict],
        log: &ApprovalLogEntry,
    ) -> Result<(), DraftRepositoryError>;

    /// Find a draft by id.
    async fn find_draft(&self, draft_id: Uuid)
    -> Result<Option<ScheduleDraft>, DraftRepositoryError>;

    /// Drafts belonging to a season, newest first.
    async fn list_drafts(&self, season_id: Uuid)
    -> Result<Vec<ScheduleDraft>, DraftRepositoryError>;

    /// Matches of a draft ordered by matchday then display order.
    async fn list_matches(&self, draft_id: Uuid) -> Result<Vec<DraftMatch>, DraftRepositoryError>;

    /// Conflicts currently attached to a draft.
    async fn list_conflicts(
        &self,
        draft_id: Uuid,
    ) -> Result<Vec<ScheduleConflict>, DraftRepositoryError>;

    /// Update the draft row and append a log entry.
    async fn update_draft(
        &self,
        draft: &ScheduleDraft,
        log: &ApprovalLogEntry,
    ) -> Result<(), DraftRepositoryError>;

    /// Replace a draft's matches and conflicts and append a log entry.
    async fn replace_matches(
        &self,
        draft: &ScheduleDraft,
        matches: &[DraftMatch],
        conflicts: &[ScheduleConflict],
        log: &ApprovalLogEntry,
    ) -> Result<(), DraftRepositoryError>;

    /// Remove a draft and its matches and conflicts; the log entry survives.
    async fn delete_draft(
        &self,
        draft_id: Uuid,
        log: &ApprovalLogEntry,
    ) -> Result<(), DraftRepositoryError>;

    /// Approval log for a draft, oldest first.
    async fn list_approval_log(
        &self,
        draft_id: Uuid,
    ) -> Result<Vec<ApprovalLogEntry>, DraftRepositoryError>;

    /// Convert an approved draft into real matches and games.
    ///
    /// All-or-nothing: on any failure nothing is written and the draft stays
    /// approved. Returns the created match ids in draft order.
    async fn publish(
        &self,
        draft: &ScheduleDraft,
        matches: &[DraftMatch],
        log: &ApprovalLogEntry,
    ) -> Result<Vec<Uuid>, DraftRepositoryError>;

    /// Published fixtures of a season, for cross-draft conflict checks.
    async fn list_published_fixtures(
        &self,
        season_id: Uuid,
    ) -> Result<Vec<PublishedFixture>, DraftRepositoryError>;
}

/// Fixture implementation for tests that do not exercise draft persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDraftRepository;

#[async_trait]
impl DraftRepository for FixtureDraftRepository {
    async fn insert_draft(
        &self,
        _draft: &ScheduleDraft,
        _matches: &[DraftMatch],
        _conflicts: &[ScheduleConflict],
        _log: &ApprovalLogEntry,
    ) -> Result<(), DraftRepositoryError> {
        Ok(())
    }

    async fn find_draft(
        &self,
        _draft_id: Uuid,
    ) -> Result<Option<ScheduleDraft>, DraftRepositoryError> {
        Ok(None)
    }

    async fn list_drafts(
        &self,
        _season_id: Uuid,
    ) -> Result<Vec<ScheduleDraft>, DraftRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_matches(&self, _draft_id: Uuid) -> Result<Vec<DraftMatch>, DraftRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_conflicts(
        &self,
        _draft_id: Uuid,
    ) -> Result<Vec<ScheduleConflict>, DraftRepositoryError> {
        Ok(Vec::new())
    }

    async fn update_draft(
        &self,
        _draft: &ScheduleDraft,
        _log: &ApprovalLogEntry,
    ) -> Result<(), DraftRepositoryError> {
        Ok(())
    }

    async fn replace_matches(
        &self,
        _draft: &ScheduleDraft,
        _matches: &[DraftMatch],
        _conflicts: &[ScheduleConflict],
        _log: &ApprovalLogEntry,
    ) -> Result<(), DraftRepositoryError> {
        Ok(())
    }

    async fn delete_draft(
        &self,
        _draft_id: Uuid,
        _log: &ApprovalLogEntry,
    ) -> Result<(), DraftRepositoryError> {
        Ok(())
    }

    async fn list_approval_log(
        &self,
        _draft_id: Uuid,
    ) -> Result<Vec<ApprovalLogEntry>, DraftRepositoryError> {
        Ok(Vec::new())
    }

    async fn publish(
        &self,
        _draft: &ScheduleDraft,
        matches: &[DraftMatch],
        _log: &ApprovalLogEntry,
    ) -> Result<Vec<Uuid>, DraftRepositoryError> {
        Ok(matches.iter().map(|_| Uuid::new_v4()).collect())
    }

    async fn list_published_fixtures(
        &self,
        _season_id: Uuid,
    ) -> Result<Vec<PublishedFixture>, DraftRepositoryError> {
        Ok(Vec::new())
    }
}
