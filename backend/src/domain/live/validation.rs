//! Reconciliation-time score validation.
//!
//! Compares the recorded score to the sum of primary player stats per team.
//! Mismatches never block reconciliation; they surface as warnings in the
//! report so the administrator can decide.

use serde::Serialize;
use uuid::Uuid;

use super::events::PlayerGameStat;
use super::game::{Game, GameStatus};

/// Result of validating a game's score against its player stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreValidationReport {
    /// Whether the recorded score agrees with the player stat totals.
    pub is_valid: bool,
    /// Human-readable findings, mismatches and advisories alike.
    pub warnings: Vec<String>,
}

/// Validate `game`'s score against the primary stat totals in `stats`.
///
/// A team's total only participates when it is positive, so sports that do
/// not track per-player scoring validate clean. A tied final score produces
/// an advisory warning without failing the report.
pub fn validate_score(game: &Game, stats: &[PlayerGameStat]) -> ScoreValidationReport {
    let mut warnings = Vec::new();
    let mut score_agrees = true;

    let home_total = primary_total(stats, game.home_team_id);
    let away_total = primary_total(stats, game.away_team_id);

    if home_total > 0 && home_total != game.home_score {
        score_agrees = false;
        warnings.push(format!(
            "home score ({}) does not match player stats total ({home_total})",
            game.home_score
        ));
    }
    if away_total > 0 && away_total != game.away_score {
        score_agrees = false;
        warnings.push(format!(
            "away score ({}) does not match player stats total ({away_total})",
            game.away_score
        ));
    }

    if game.home_score == game.away_score
        && matches!(game.status, GameStatus::Final | GameStatus::Reconciled)
    {
        warnings.push("game ended in a tie; verify ties are allowed".to_owned());
    }

    ScoreValidationReport {
        is_valid: score_agrees,
        warnings,
    }
}

fn primary_total(stats: &[PlayerGameStat], team_id: Uuid) -> i32 {
    stats
        .iter()
        .filter(|stat| stat.team_id == team_id && stat.kind.is_primary())
        .map(|stat| stat.value)
        .sum()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::domain::live::StatKind;

    fn stat(game: &Game, team_id: Uuid, kind: StatKind, value: i32) -> PlayerGameStat {
        PlayerGameStat {
            id: Uuid::new_v4(),
            game_id: game.id,
            player_id: Uuid::new_v4(),
            team_id,
            kind,
            value,
        }
    }

    fn finished_game(home: i32, away: i32) -> Game {
        let mut g = Game::scheduled(
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 21, 0, 0).single().expect("valid");
        g.start(now).expect("start");
        g.apply_score(home, away, now).expect("score");
        g.end(now).expect("end");
        g
    }

    #[test]
    fn matching_stat_totals_validate_clean() {
        let game = finished_game(1, 0);
        let stats = vec![stat(&game, game.home_team_id, StatKind::Goals, 1)];

        let report = validate_score(&game, &stats);
        assert!(report.is_valid);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn mismatched_total_warns_without_blocking() {
        let game = finished_game(3, 1);
        let stats = vec![
            stat(&game, game.home_team_id, StatKind::Points, 2),
            stat(&game, game.away_team_id, StatKind::Points, 1),
        ];

        let report = validate_score(&game, &stats);
        assert!(!report.is_valid);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("home score (3)"));
    }

    #[test]
    fn absent_stats_do_not_fail_validation() {
        let game = finished_game(2, 1);
        let report = validate_score(&game, &[]);
        assert!(report.is_valid);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn secondary_stats_are_excluded_from_totals() {
        let game = finished_game(1, 0);
        let stats = vec![
            stat(&game, game.home_team_id, StatKind::Goals, 1),
            stat(&game, game.home_team_id, StatKind::Assists, 4),
            stat(&game, game.home_team_id, StatKind::Fouls, 2),
        ];

        let report = validate_score(&game, &stats);
        assert!(report.is_valid);
    }

    #[test]
    fn tied_final_produces_an_advisory() {
        let game = finished_game(2, 2);
        let report = validate_score(&game, &[]);
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("tie"));
    }
}
