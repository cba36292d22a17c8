//! Append-only records produced during live play: events, penalties, and
//! per-player stat lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of timestamped occurrences within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEventKind {
    /// A score.
    Goal,
    /// A team timeout.
    Timeout,
    /// A player substitution.
    Substitution,
    /// A period began.
    PeriodStart,
    /// A period ended.
    PeriodEnd,
    /// An overtime period began.
    OvertimeStart,
    /// The final whistle.
    GameEnd,
    /// A penalty or foul; paired with a [`Penalty`] row.
    Penalty,
}

impl GameEventKind {
    /// Stable wire name for persistence and payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Goal => "goal",
            Self::Timeout => "timeout",
            Self::Substitution => "substitution",
            Self::PeriodStart => "period_start",
            Self::PeriodEnd => "period_end",
            Self::OvertimeStart => "overtime_start",
            Self::GameEnd => "game_end",
            Self::Penalty => "penalty",
        }
    }

    /// Parse a stable wire name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "goal" => Some(Self::Goal),
            "timeout" => Some(Self::Timeout),
            "substitution" => Some(Self::Substitution),
            "period_start" => Some(Self::PeriodStart),
            "period_end" => Some(Self::PeriodEnd),
            "overtime_start" => Some(Self::OvertimeStart),
            "game_end" => Some(Self::GameEnd),
            "penalty" => Some(Self::Penalty),
            _ => None,
        }
    }
}

/// A timestamped occurrence within a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEvent {
    /// Stable identifier.
    pub id: Uuid,
    /// Game the event belongs to.
    pub game_id: Uuid,
    /// What happened.
    pub kind: GameEventKind,
    /// Team involved, when applicable.
    pub team_id: Option<Uuid>,
    /// Player involved, when applicable.
    pub player_id: Option<Uuid>,
    /// 1-based period the event happened in.
    pub period: Option<u32>,
    /// Clock display at the time, e.g. "04:12".
    pub game_clock: Option<String>,
    /// Free-form detail payload.
    pub details: serde_json::Value,
    /// Human-readable summary.
    pub description: Option<String>,
    /// When the event was recorded.
    pub occurred_at: DateTime<Utc>,
}

/// A penalty or foul recorded against a team or player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Penalty {
    /// Stable identifier.
    pub id: Uuid,
    /// Game the penalty belongs to.
    pub game_id: Uuid,
    /// Penalised team.
    pub team_id: Uuid,
    /// Penalised player, when identified.
    pub player_id: Option<Uuid>,
    /// Sport-specific penalty name.
    pub penalty_type: String,
    /// 1-based period it was called in.
    pub period: Option<u32>,
    /// Clock display at the time.
    pub game_clock: Option<String>,
    /// Penalty minutes, for sports that track them.
    pub minutes: Option<u32>,
    /// Sport-specific severity label.
    pub severity: Option<String>,
    /// Human-readable summary.
    pub description: Option<String>,
    /// Whether the player was ejected.
    pub resulted_in_ejection: bool,
    /// When the penalty was recorded.
    pub created_at: DateTime<Utc>,
}

/// Stat categories tracked per player per game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    /// Points scored (basketball-style sports).
    Points,
    /// Goals scored (football-style sports).
    Goals,
    /// Assists.
    Assists,
    /// Saves.
    Saves,
    /// Fouls committed.
    Fouls,
}

impl StatKind {
    /// Stable wire name for persistence and payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::Goals => "goals",
            Self::Assists => "assists",
            Self::Saves => "saves",
            Self::Fouls => "fouls",
        }
    }

    /// Parse a stable wire name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "points" => Some(Self::Points),
            "goals" => Some(Self::Goals),
            "assists" => Some(Self::Assists),
            "saves" => Some(Self::Saves),
            "fouls" => Some(Self::Fouls),
            _ => None,
        }
    }

    /// Whether the stat counts toward the team score.
    pub fn is_primary(self) -> bool {
        matches!(self, Self::Points | Self::Goals)
    }
}

/// One player's value for one stat category in one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerGameStat {
    /// Stable identifier.
    pub id: Uuid,
    /// Game the stat belongs to.
    pub game_id: Uuid,
    /// Player the stat belongs to.
    pub player_id: Uuid,
    /// Team the player appeared for.
    pub team_id: Uuid,
    /// Stat category.
    pub kind: StatKind,
    /// Recorded value.
    pub value: i32,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(GameEventKind::Goal)]
    #[case(GameEventKind::PeriodStart)]
    #[case(GameEventKind::OvertimeStart)]
    #[case(GameEventKind::Penalty)]
    fn event_wire_names_round_trip(#[case] kind: GameEventKind) {
        assert_eq!(GameEventKind::parse(kind.as_str()), Some(kind));
    }

    #[rstest]
    #[case(StatKind::Points, true)]
    #[case(StatKind::Goals, true)]
    #[case(StatKind::Assists, false)]
    #[case(StatKind::Saves, false)]
    #[case(StatKind::Fouls, false)]
    fn only_points_and_goals_count_toward_the_score(#[case] kind: StatKind, #[case] primary: bool) {
        assert_eq!(kind.is_primary(), primary);
    }
}
