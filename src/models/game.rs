//! Match (game) and Round records, plus the slot addressing used by the bracket.

use crate::models::team::TeamId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Unique identifier for a round.
pub type RoundId = Uuid;

/// One of the two team positions within a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Home,
    Away,
}

impl Slot {
    /// Slot in round r+1 fed by the match at 1-based `position` in round r.
    pub fn fed_by(position: u32) -> Self {
        if position % 2 == 1 {
            Slot::Home
        } else {
            Slot::Away
        }
    }
}

/// Lifecycle state of a match. Only ever moves forward.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    Completed,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStatus::Scheduled => write!(f, "scheduled"),
            MatchStatus::Live => write!(f, "live"),
            MatchStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A round of play. For cup format the ordinal is the bracket depth.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub tournament_id: TournamentId,
    /// 1-based, strictly increasing within a tournament.
    pub ordinal: u32,
    pub created_at: DateTime<Utc>,
}

impl Round {
    pub fn new(tournament_id: TournamentId, ordinal: u32, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            ordinal,
            created_at,
        }
    }
}

/// A single match between a home and an away team.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub round_id: RoundId,
    pub round_ordinal: u32,
    /// 1-based index within the round; fixes the bracket slot this match feeds.
    pub position: u32,
    /// None while waiting for an upstream winner (or the empty side of a bye).
    pub home: Option<TeamId>,
    pub away: Option<TeamId>,
    pub status: MatchStatus,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    /// Set iff completed and not a draw.
    pub winner: Option<TeamId>,
    pub is_bye: bool,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub venue: Option<String>,
    /// Bumped on every mutation; callers echo it back when recording a score.
    pub version: u64,
}

impl GameMatch {
    /// A scheduled match in `round`; slots may be left empty for bracket feeders.
    pub fn new(round: &Round, position: u32, home: Option<TeamId>, away: Option<TeamId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id: round.tournament_id,
            round_id: round.id,
            round_ordinal: round.ordinal,
            position,
            home,
            away,
            status: MatchStatus::Scheduled,
            home_score: None,
            away_score: None,
            winner: None,
            is_bye: false,
            scheduled_at: None,
            venue: None,
            version: 0,
        }
    }

    /// An unopposed advancement: completed on creation with `team` as winner and no score.
    pub fn bye(round: &Round, position: u32, team: TeamId) -> Self {
        Self {
            status: MatchStatus::Completed,
            winner: Some(team),
            is_bye: true,
            ..Self::new(round, position, Some(team), None)
        }
    }

    pub fn team_in(&self, slot: Slot) -> Option<TeamId> {
        match slot {
            Slot::Home => self.home,
            Slot::Away => self.away,
        }
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut Option<TeamId> {
        match slot {
            Slot::Home => &mut self.home,
            Slot::Away => &mut self.away,
        }
    }

    /// Both slots filled (a playable pairing).
    pub fn is_ready(&self) -> bool {
        self.home.is_some() && self.away.is_some()
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.home == Some(team) || self.away == Some(team)
    }

    /// The team that lost a decided match, if any.
    pub fn loser(&self) -> Option<TeamId> {
        let winner = self.winner?;
        if self.home == Some(winner) {
            self.away
        } else {
            self.home
        }
    }

    /// Completed with no winner.
    pub fn is_draw(&self) -> bool {
        self.status == MatchStatus::Completed && !self.is_bye && self.winner.is_none()
    }

    pub(crate) fn touch(&mut self) {
        self.version += 1;
    }
}
