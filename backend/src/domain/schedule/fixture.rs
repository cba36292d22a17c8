//! Round-robin fixture generation (circle method).
//!
//! Pure function of its inputs: the generator never touches persistence, so
//! re-running with the same team order, parameters, and blackout set yields
//! the same fixtures.

use chrono::{Days, NaiveDate};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use thiserror::Error;
use uuid::Uuid;

use super::blackout::BlackoutDate;

/// Parameters controlling a fixture generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureParams {
    /// Date of the first matchday.
    pub start_date: NaiveDate,
    /// Days between consecutive matchdays; must be at least 1.
    pub interval_days: u32,
    /// Append a second rotation with home/away reversed.
    pub double_round_robin: bool,
    /// Permute the team order with this seed before rotation begins.
    pub shuffle_seed: Option<u64>,
    /// Skip matchdays that fall inside an applicable blackout window.
    pub respect_blackouts: bool,
}

/// One generated pairing: who plays whom, on which matchday, on which date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureSlot {
    /// Home side.
    pub home: Uuid,
    /// Away side.
    pub away: Uuid,
    /// 1-based matchday number.
    pub matchday: u32,
    /// Calendar date of the matchday.
    pub date: NaiveDate,
}

/// Failures raised by [`generate_fixtures`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixtureError {
    /// A round robin needs at least two teams.
    #[error("at least 2 teams are required to generate fixtures, got {count}")]
    InsufficientTeams {
        /// Number of teams supplied.
        count: usize,
    },
    /// The matchday interval must be positive.
    #[error("matchday interval must be at least 1 day, got {days}")]
    InvalidInterval {
        /// Requested interval.
        days: u32,
    },
}

/// Generate a balanced round robin over `teams`.
///
/// Uses the circle method: one team is held fixed while the rest rotate each
/// round, producing `n - 1` matchdays that cover every unordered pair exactly
/// once. Odd team counts get a bye slot that never emits a match. With
/// `double_round_robin` a second full rotation is appended with home and away
/// reversed. When a matchday date falls inside an applicable blackout window
/// it is advanced in whole `interval_days` steps until clear, shifting all
/// later matchdays and preserving the cadence.
pub fn generate_fixtures(
    teams: &[Uuid],
    params: &FixtureParams,
    blackouts: &[BlackoutDate],
) -> Result<Vec<FixtureSlot>, FixtureError> {
    if teams.len() < 2 {
        return Err(FixtureError::InsufficientTeams { count: teams.len() });
    }
    if params.interval_days == 0 {
        return Err(FixtureError::InvalidInterval {
            days: params.interval_days,
        });
    }

    let mut order: Vec<Uuid> = teams.to_vec();
    if let Some(seed) = params.shuffle_seed {
        let mut rng = SmallRng::seed_from_u64(seed);
        order.shuffle(&mut rng);
    }

    let rounds = rotate_rounds(&order);
    let mut matchdays: Vec<Vec<(Uuid, Uuid)>> = rounds;
    if params.double_round_robin {
        let second_leg: Vec<Vec<(Uuid, Uuid)>> = matchdays
            .iter()
            .map(|pairs| pairs.iter().map(|&(home, away)| (away, home)).collect())
            .collect();
        matchdays.extend(second_leg);
    }

    let interval = Days::new(u64::from(params.interval_days));
    let mut date = params.start_date;
    let mut fixtures = Vec::new();
    for (index, pairings) in matchdays.iter().enumerate() {
        if params.respect_blackouts {
            while matchday_blocked(date, pairings, blackouts) {
                date = advance(date, interval);
            }
        }
        let matchday = to_matchday(index);
        for &(home, away) in pairings {
            fixtures.push(FixtureSlot {
                home,
                away,
                matchday,
                date,
            });
        }
        date = advance(date, interval);
    }

    Ok(fixtures)
}

/// Circle-method rotation producing `n - 1` rounds of pairings.
fn rotate_rounds(order: &[Uuid]) -> Vec<Vec<(Uuid, Uuid)>> {
    // A None slot is the bye for odd team counts.
    let mut circle: Vec<Option<Uuid>> = order.iter().copied().map(Some).collect();
    if circle.len() % 2 != 0 {
        circle.push(None);
    }
    let n = circle.len();

    let mut rounds = Vec::with_capacity(n - 1);
    for _ in 0..n - 1 {
        let pairings = (0..n / 2)
            .filter_map(|i| match (circle.get(i), circle.get(n - 1 - i)) {
                (Some(&Some(home)), Some(&Some(away))) => Some((home, away)),
                _ => None,
            })
            .collect();
        rounds.push(pairings);

        // Keep the first slot fixed, rotate the rest one step.
        if let Some(last) = circle.pop() {
            circle.insert(1, last);
        }
    }
    rounds
}

/// Whether any blackout blocks this matchday for any of its pairings.
fn matchday_blocked(
    date: NaiveDate,
    pairings: &[(Uuid, Uuid)],
    blackouts: &[BlackoutDate],
) -> bool {
    blackouts.iter().any(|blackout| {
        pairings
            .iter()
            .any(|&(home, away)| blackout.blocks(date, home, away, None))
    })
}

fn advance(date: NaiveDate, interval: Days) -> NaiveDate {
    // checked_add_days only fails at the end of the representable calendar.
    date.checked_add_days(interval).unwrap_or(date)
}

fn to_matchday(index: usize) -> u32 {
    u32::try_from(index).map_or(u32::MAX, |i| i.saturating_add(1))
}
