//! Port for reading season context: teams, venues, and blackout windows.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::schedule::BlackoutDate;

/// Errors raised by season repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeasonRepositoryError {
    /// Repository connection could not be established.
    #[error("season repository connection failed: {message}")]
    Connection {
        /// Adapter failure detail.
        message: String,
    },
    /// Query failed during execution.
    #[error("season repository query failed: {message}")]
    Query {
        /// Adapter failure detail.
        message: String,
    },
}

impl SeasonRepositoryError {
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
}

/// A team as the scheduler sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRef {
    /// Stable identifier.
    pub id: Uuid,
    /// Display name, also used in exports.
    pub name: String,
}

/// A venue as the scheduler sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueRef {
    /// Stable identifier.
    pub id: Uuid,
    /// Display name, also used in exports.
    pub name: String,
}

/// Port for reading the season context the scheduler works against.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeasonRepository: Send + Sync {
    /// Whether the season exists.
    async fn season_exists(&self, season_id: Uuid) -> Result<bool, SeasonRepositoryError>;

    /// Teams registered for the season.
    async fn list_teams(&self, season_id: Uuid) -> Result<Vec<TeamRef>, SeasonRepositoryError>;

    /// Venues available to the season.
    async fn list_venues(&self, season_id: Uuid) -> Result<Vec<VenueRef>, SeasonRepositoryError>;

    /// Blackout windows applying to the season.
    async fn list_blackouts(
        &self,
        season_id: Uuid,
    ) -> Result<Vec<BlackoutDate>, SeasonRepositoryError>;
}

/// Fixture implementation for tests that do not exercise season reads.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSeasonRepository;

#[async_trait]
impl SeasonRepository for FixtureSeasonRepository {
    async fn season_exists(&self, _season_id: Uuid) -> Result<bool, SeasonRepositoryError> {
        Ok(true)
    }

    async fn list_teams(&self, _season_id: Uuid) -> Result<Vec<TeamRef>, SeasonRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_venues(&self, _season_id: Uuid) -> Result<Vec<VenueRef>, SeasonRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_blackouts(
        &self,
        _season_id: Uuid,
    ) -> Result<Vec<BlackoutDate>, SeasonRepositoryError> {
        Ok(Vec::new())
    }
}
