//! Diesel-backed implementation of the season context port.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{SeasonRepository, SeasonRepositoryError, TeamRef, VenueRef};
use crate::domain::schedule::{BlackoutDate, BlackoutScope};

use super::error_mapping::DbFault;
use super::models::BlackoutDateRow;
use super::pool::{DbPool, PoolError};
use super::schema::{blackout_dates, seasons, teams, venues};

/// PostgreSQL adapter for season context reads.
#[derive(Clone)]
pub struct DieselSeasonRepository {
    pool: DbPool,
}

impl DieselSeasonRepository {
    /// Create a new repository backed by the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn fault_error(fault: DbFault) -> SeasonRepositoryError {
    match fault {
        DbFault::Query(message) => SeasonRepositoryError::query(message),
        DbFault::Connection(message) => SeasonRepositoryError::connection(message),
    }
}

fn pool_error(error: PoolError) -> SeasonRepositoryError {
    fault_error(DbFault::from_pool(error))
}

fn map_query_error(error: diesel::result::Error) -> SeasonRepositoryError {
    fault_error(DbFault::from_diesel(error))
}

/// Rebuild a domain blackout from its storage columns.
///
/// The scope discriminator and its payload live in separate columns; a
/// discriminator without its payload is a storage corruption and maps to a
/// query error rather than a silent default.
fn blackout_from_row(row: BlackoutDateRow) -> Result<BlackoutDate, SeasonRepositoryError> {
    let scope = match row.scope.as_str() {
        "all" => BlackoutScope::All,
        "teams" => BlackoutScope::Teams(row.team_ids.ok_or_else(|| {
            SeasonRepositoryError::query(format!("blackout {} has team scope without team ids", row.id))
        })?),
        "venue" => BlackoutScope::Venue(row.venue_id.ok_or_else(|| {
            SeasonRepositoryError::query(format!("blackout {} has venue scope without a venue id", row.id))
        })?),
        other => {
            return Err(SeasonRepositoryError::query(format!(
                "blackout {} has unknown scope '{other}'",
                row.id
            )));
        }
    };

    BlackoutDate::try_new(row.id, row.start_date, row.end_date, scope, row.reason)
        .map_err(|err| SeasonRepositoryError::query(format!("blackout {} is invalid: {err}", row.id)))
}

#[async_trait]
impl SeasonRepository for DieselSeasonRepository {
    async fn season_exists(&self, season_id: Uuid) -> Result<bool, SeasonRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        let found: Option<Uuid> = seasons::table
            .find(season_id)
            .select(seasons::id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;

        Ok(found.is_some())
    }

    async fn list_teams(&self, season_id: Uuid) -> Result<Vec<TeamRef>, SeasonRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        let rows: Vec<(Uuid, String)> = teams::table
            .filter(teams::season_id.eq(season_id))
            .select((teams::id, teams::name))
            .order(teams::name.asc())
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| TeamRef { id, name })
            .collect())
    }

    async fn list_venues(&self, season_id: Uuid) -> Result<Vec<VenueRef>, SeasonRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        let rows: Vec<(Uuid, String)> = venues::table
            .filter(venues::season_id.eq(season_id))
            .select((venues::id, venues::name))
            .order(venues::name.asc())
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| VenueRef { id, name })
            .collect())
    }

    async fn list_blackouts(
        &self,
        season_id: Uuid,
    ) -> Result<Vec<BlackoutDate>, SeasonRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(pool_error)?;

        let rows: Vec<BlackoutDateRow> = blackout_dates::table
            .filter(blackout_dates::season_id.eq(season_id))
            .select(BlackoutDateRow::as_select())
            .order(blackout_dates::start_date.asc())
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;

        rows.into_iter().map(blackout_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion coverage; pool-backed paths are exercised in
    //! integration environments with a live database.

    use chrono::NaiveDate;
    use rstest::rstest;

    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("valid date literal")
    }

    fn row(scope: &str, team_ids: Option<Vec<Uuid>>, venue_id: Option<Uuid>) -> BlackoutDateRow {
        BlackoutDateRow {
            id: Uuid::new_v4(),
            season_id: Uuid::new_v4(),
            start_date: date("2025-01-08"),
            end_date: date("2025-01-10"),
            scope: scope.to_owned(),
            team_ids,
            venue_id,
            reason: Some("arena maintenance".to_owned()),
        }
    }

    #[rstest]
    fn all_scope_converts() {
        let blackout = blackout_from_row(row("all", None, None)).expect("valid row");
        assert_eq!(blackout.scope, BlackoutScope::All);
        assert_eq!(blackout.reason.as_deref(), Some("arena maintenance"));
    }

    #[rstest]
    fn team_scope_carries_its_ids() {
        let team = Uuid::new_v4();
        let blackout = blackout_from_row(row("teams", Some(vec![team]), None)).expect("valid row");
        assert_eq!(blackout.scope, BlackoutScope::Teams(vec![team]));
    }

    #[rstest]
    fn venue_scope_carries_its_id() {
        let venue = Uuid::new_v4();
        let blackout = blackout_from_row(row("venue", None, Some(venue))).expect("valid row");
        assert_eq!(blackout.scope, BlackoutScope::Venue(venue));
    }

    #[rstest]
    #[case("teams", None, None)]
    #[case("venue", None, None)]
    #[case("weekend", None, None)]
    fn malformed_scopes_map_to_query_errors(
        #[case] scope: &str,
        #[case] team_ids: Option<Vec<Uuid>>,
        #[case] venue_id: Option<Uuid>,
    ) {
        let err = blackout_from_row(row(scope, team_ids, venue_id)).expect_err("corrupt row");
        assert!(matches!(err, SeasonRepositoryError::Query { .. }));
    }

    #[rstest]
    fn inverted_range_maps_to_query_error() {
        let mut bad = row("all", None, None);
        bad.end_date = date("2025-01-01");
        let err = blackout_from_row(bad).expect_err("inverted range");
        assert!(matches!(err, SeasonRepositoryError::Query { .. }));
    }
}
