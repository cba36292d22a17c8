//! Live game scoring: the game state machine, its event records, and
//! reconciliation-time score validation.
//!
//! [`game`] holds the [`Game`] aggregate and its transition table, [`events`]
//! the append-only records produced during play, and [`validation`] the
//! reconciliation check comparing the recorded score to player stats.

pub mod events;
pub mod game;
pub mod validation;

pub use self::events::{GameEvent, GameEventKind, Penalty, PlayerGameStat, StatKind};
pub use self::game::{
    Game, GameStatus, GameTransitionError, PeriodScore, ScoreChange, ScoreUpdate,
};
pub use self::validation::{ScoreValidationReport, validate_score};
