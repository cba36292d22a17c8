//! The live game aggregate and its status machine.
//!
//! Transitions are checked through one central guard so an out-of-order call
//! always fails the same way, naming the current state and the requested
//! action, with no partial mutation. Score changes go through
//! [`Game::apply_score`], which reports the old and new scores so callers can
//! append the audit row before persisting the new state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Lifecycle states of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Published but not yet started.
    Scheduled,
    /// Clock running.
    InProgress,
    /// Between halves.
    Halftime,
    /// Extra period after a tied regulation.
    Overtime,
    /// Play finished; score awaiting confirmation.
    Final,
    /// Score confirmed by an administrator. Terminal.
    Reconciled,
}

impl GameStatus {
    /// Stable wire name for persistence and payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::Halftime => "halftime",
            Self::Overtime => "overtime",
            Self::Final => "final",
            Self::Reconciled => "reconciled",
        }
    }

    /// Parse a stable wire name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "scheduled" => Some(Self::Scheduled),
            "in_progress" => Some(Self::InProgress),
            "halftime" => Some(Self::Halftime),
            "overtime" => Some(Self::Overtime),
            "final" => Some(Self::Final),
            "reconciled" => Some(Self::Reconciled),
            _ => None,
        }
    }

    /// Whether play is live and scores may change.
    pub fn is_active(self) -> bool {
        matches!(self, Self::InProgress | Self::Halftime | Self::Overtime)
    }
}

/// A transition rejected by the game status guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameTransitionError {
    /// The requested action is not legal in the current state.
    #[error("cannot {requested} while game is {}", current.as_str())]
    InvalidTransition {
        /// State the game is currently in.
        current: GameStatus,
        /// Action the caller asked for.
        requested: &'static str,
    },
    /// Overtime from a finished game requires a tied regulation score.
    #[error("overtime after the final whistle requires a tied score, got {home}-{away}")]
    OvertimeRequiresTie {
        /// Recorded home score.
        home: i32,
        /// Recorded away score.
        away: i32,
    },
}

/// Cumulative score snapshot taken at the end of a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodScore {
    /// 1-based period number.
    pub period: u32,
    /// Home score when the period closed.
    pub home: i32,
    /// Away score when the period closed.
    pub away: i32,
}

/// Outcome of an accepted score change, used to build the audit row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreChange {
    /// Score before the change.
    pub previous_home: i32,
    /// Score before the change.
    pub previous_away: i32,
    /// Score after the change.
    pub new_home: i32,
    /// Score after the change.
    pub new_away: i32,
}

/// Immutable audit row recorded for every accepted score change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreUpdate {
    /// Stable identifier.
    pub id: Uuid,
    /// Game the change belongs to.
    pub game_id: Uuid,
    /// Who reported the change, when known.
    pub actor: Option<String>,
    /// Home score before.
    pub previous_home_score: i32,
    /// Away score before.
    pub previous_away_score: i32,
    /// Home score after.
    pub new_home_score: i32,
    /// Away score after.
    pub new_away_score: i32,
    /// Free-text notes.
    pub notes: Option<String>,
    /// When the change was recorded.
    pub created_at: DateTime<Utc>,
}

/// A single game's live scoring state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    /// Stable identifier.
    pub id: Uuid,
    /// Owning season.
    pub season_id: Uuid,
    /// Published match this game was created from, when applicable.
    pub match_id: Option<Uuid>,
    /// Home side.
    pub home_team_id: Uuid,
    /// Away side.
    pub away_team_id: Uuid,
    /// Current lifecycle state.
    pub status: GameStatus,
    /// Current home score.
    pub home_score: i32,
    /// Current away score.
    pub away_score: i32,
    /// Home score at the end of regulation, captured on overtime or final.
    pub home_score_regulation: Option<i32>,
    /// Away score at the end of regulation.
    pub away_score_regulation: Option<i32>,
    /// Cumulative score snapshots at each period boundary.
    pub period_scores: Vec<PeriodScore>,
    /// Whether the game went past regulation.
    pub went_to_overtime: bool,
    /// Number of overtime periods played.
    pub overtime_periods: u32,
    /// 1-based period currently being played; 0 before the game starts.
    pub current_period: u32,
    /// Free-form clock display, e.g. "12:34".
    pub game_clock: Option<String>,
    /// When the score last changed.
    pub last_score_update: Option<DateTime<Utc>>,
    /// Whether an administrator confirmed the final score.
    pub is_reconciled: bool,
    /// Who confirmed it.
    pub reconciled_by: Option<String>,
    /// When it was confirmed.
    pub reconciled_at: Option<DateTime<Utc>>,
}

impl Game {
    /// Create a freshly scheduled game between two teams.
    pub fn scheduled(
        id: Uuid,
        season_id: Uuid,
        match_id: Option<Uuid>,
        home_team_id: Uuid,
        away_team_id: Uuid,
    ) -> Self {
        Self {
            id,
            season_id,
            match_id,
            home_team_id,
            away_team_id,
            status: GameStatus::Scheduled,
            home_score: 0,
            away_score: 0,
            home_score_regulation: None,
            away_score_regulation: None,
            period_scores: Vec::new(),
            went_to_overtime: false,
            overtime_periods: 0,
            current_period: 0,
            game_clock: None,
            last_score_update: None,
            is_reconciled: false,
            reconciled_by: None,
            reconciled_at: None,
        }
    }

    fn guard(&self, allowed: &[GameStatus], requested: &'static str) -> Result<(), GameTransitionError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(GameTransitionError::InvalidTransition {
                current: self.status,
                requested,
            })
        }
    }

    /// Begin play. `scheduled -> in_progress`, first period.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), GameTransitionError> {
        self.guard(&[GameStatus::Scheduled], "start")?;
        self.status = GameStatus::InProgress;
        self.current_period = 1;
        self.last_score_update = Some(now);
        Ok(())
    }

    /// Pause at the half. `in_progress -> halftime`, snapshotting the period.
    pub fn set_halftime(&mut self) -> Result<(), GameTransitionError> {
        self.guard(&[GameStatus::InProgress], "set halftime")?;
        self.close_period();
        self.status = GameStatus::Halftime;
        Ok(())
    }

    /// Resume play. `halftime -> in_progress`, next period.
    pub fn resume(&mut self) -> Result<(), GameTransitionError> {
        self.guard(&[GameStatus::Halftime], "resume")?;
        self.status = GameStatus::InProgress;
        self.current_period = self.current_period.saturating_add(1);
        Ok(())
    }

    /// Enter an overtime period.
    ///
    /// Legal from live play, or from `final` when the recorded score is tied.
    /// The regulation score snapshot is captured the first time overtime
    /// begins and never overwritten.
    pub fn start_overtime(&mut self) -> Result<(), GameTransitionError> {
        self.guard(
            &[GameStatus::InProgress, GameStatus::Overtime, GameStatus::Final],
            "start overtime",
        )?;
        if self.status == GameStatus::Final && self.home_score != self.away_score {
            return Err(GameTransitionError::OvertimeRequiresTie {
                home: self.home_score,
                away: self.away_score,
            });
        }
        if self.home_score_regulation.is_none() {
            self.home_score_regulation = Some(self.home_score);
            self.away_score_regulation = Some(self.away_score);
        }
        self.close_period();
        self.status = GameStatus::Overtime;
        self.went_to_overtime = true;
        self.overtime_periods = self.overtime_periods.saturating_add(1);
        self.current_period = self.current_period.saturating_add(1);
        Ok(())
    }

    /// End play. Any active status moves to `final`.
    pub fn end(&mut self, now: DateTime<Utc>) -> Result<(), GameTransitionError> {
        self.guard(
            &[GameStatus::InProgress, GameStatus::Halftime, GameStatus::Overtime],
            "end",
        )?;
        if self.home_score_regulation.is_none() {
            self.home_score_regulation = Some(self.home_score);
            self.away_score_regulation = Some(self.away_score);
        }
        if self.status != GameStatus::Halftime {
            self.close_period();
        }
        self.status = GameStatus::Final;
        self.last_score_update = Some(now);
        Ok(())
    }

    /// Confirm the final score. `final -> reconciled`. Terminal.
    pub fn reconcile(&mut self, actor: &str, now: DateTime<Utc>) -> Result<(), GameTransitionError> {
        self.guard(&[GameStatus::Final], "reconcile")?;
        self.status = GameStatus::Reconciled;
        self.is_reconciled = true;
        self.reconciled_by = Some(actor.to_owned());
        self.reconciled_at = Some(now);
        Ok(())
    }

    /// Apply a score change while play is live.
    ///
    /// Returns the old and new scores so the caller can append the audit row
    /// before the game row is persisted.
    pub fn apply_score(
        &mut self,
        home_score: i32,
        away_score: i32,
        now: DateTime<Utc>,
    ) -> Result<ScoreChange, GameTransitionError> {
        self.guard(
            &[GameStatus::InProgress, GameStatus::Halftime, GameStatus::Overtime],
            "update the score",
        )?;
        let change = ScoreChange {
            previous_home: self.home_score,
            previous_away: self.away_score,
            new_home: home_score,
            new_away: away_score,
        };
        self.home_score = home_score;
        self.away_score = away_score;
        self.last_score_update = Some(now);
        Ok(change)
    }

    fn close_period(&mut self) {
        if self.current_period == 0 {
            return;
        }
        self.period_scores.push(PeriodScore {
            period: self.current_period,
            home: self.home_score,
            away: self.away_score,
        });
    }
}

#[cfg(test)]
mod tests {
    //! State machine coverage: legal path, guards, and no partial mutation.

    use rstest::rstest;

    use super::*;

    fn now() -> DateTime<Utc> {
        chrono::TimeZone::with_ymd_and_hms(&Utc, 2025, 3, 1, 19, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn game() -> Game {
        Game::scheduled(Uuid::new_v4(), Uuid::new_v4(), None, Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn full_lifecycle_walks_every_state() {
        let mut g = game();
        g.start(now()).expect("start");
        assert_eq!(g.status, GameStatus::InProgress);
        assert_eq!(g.current_period, 1);

        g.apply_score(1, 0, now()).expect("score");
        g.set_halftime().expect("halftime");
        assert_eq!(g.status, GameStatus::Halftime);
        assert_eq!(g.period_scores, vec![PeriodScore { period: 1, home: 1, away: 0 }]);

        g.resume().expect("resume");
        assert_eq!(g.current_period, 2);

        g.apply_score(1, 1, now()).expect("score");
        g.end(now()).expect("end");
        assert_eq!(g.status, GameStatus::Final);
        assert_eq!(g.home_score_regulation, Some(1));
        assert_eq!(g.away_score_regulation, Some(1));

        g.reconcile("admin", now()).expect("reconcile");
        assert_eq!(g.status, GameStatus::Reconciled);
        assert!(g.is_reconciled);
        assert_eq!(g.reconciled_by.as_deref(), Some("admin"));
    }

    #[test]
    fn overtime_from_live_play_freezes_regulation_once() {
        let mut g = game();
        g.start(now()).expect("start");
        g.apply_score(2, 2, now()).expect("score");

        g.start_overtime().expect("first overtime");
        assert_eq!(g.status, GameStatus::Overtime);
        assert!(g.went_to_overtime);
        assert_eq!(g.overtime_periods, 1);
        assert_eq!(g.home_score_regulation, Some(2));

        g.apply_score(3, 3, now()).expect("score");
        g.start_overtime().expect("second overtime");
        assert_eq!(g.overtime_periods, 2);
        // Regulation snapshot is never overwritten.
        assert_eq!(g.home_score_regulation, Some(2));
        assert_eq!(g.away_score_regulation, Some(2));
    }

    #[test]
    fn overtime_from_a_tied_final_reopens_the_game() {
        let mut g = game();
        g.start(now()).expect("start");
        g.apply_score(1, 1, now()).expect("score");
        g.end(now()).expect("end");

        g.start_overtime().expect("overtime from tied final");
        assert_eq!(g.status, GameStatus::Overtime);
    }

    #[test]
    fn overtime_from_a_decided_final_is_refused() {
        let mut g = game();
        g.start(now()).expect("start");
        g.apply_score(2, 1, now()).expect("score");
        g.end(now()).expect("end");

        let err = g.start_overtime().expect_err("decided game");
        assert_eq!(err, GameTransitionError::OvertimeRequiresTie { home: 2, away: 1 });
        assert_eq!(g.status, GameStatus::Final);
    }

    #[rstest]
    #[case::resume_before_halftime("resume")]
    #[case::reconcile_before_final("reconcile")]
    fn out_of_order_calls_leave_state_unchanged(#[case] action: &str) {
        let mut g = game();
        g.start(now()).expect("start");
        let before = g.clone();

        let err = match action {
            "resume" => g.resume().expect_err("not at halftime"),
            _ => g.reconcile("admin", now()).expect_err("not final"),
        };
        assert!(matches!(err, GameTransitionError::InvalidTransition { .. }));
        assert_eq!(g, before);
    }

    #[test]
    fn guard_error_names_state_and_action() {
        let mut g = game();
        let err = g.resume().expect_err("scheduled game");
        assert_eq!(err.to_string(), "cannot resume while game is scheduled");
    }

    #[test]
    fn score_change_is_refused_before_start_and_after_final() {
        let mut g = game();
        assert!(g.apply_score(1, 0, now()).is_err());

        g.start(now()).expect("start");
        g.end(now()).expect("end");
        assert!(g.apply_score(5, 5, now()).is_err());
        assert_eq!((g.home_score, g.away_score), (0, 0));
    }

    #[test]
    fn accepted_score_change_reports_old_and_new() {
        let mut g = game();
        g.start(now()).expect("start");
        let change = g.apply_score(1, 0, now()).expect("score");
        assert_eq!(
            change,
            ScoreChange {
                previous_home: 0,
                previous_away: 0,
                new_home: 1,
                new_away: 0,
            }
        );
        assert_eq!(g.last_score_update, Some(now()));
    }

    #[rstest]
    #[case(GameStatus::Scheduled)]
    #[case(GameStatus::InProgress)]
    #[case(GameStatus::Halftime)]
    #[case(GameStatus::Overtime)]
    #[case(GameStatus::Final)]
    #[case(GameStatus::Reconciled)]
    fn status_wire_names_round_trip(#[case] status: GameStatus) {
        assert_eq!(GameStatus::parse(status.as_str()), Some(status));
    }
}
