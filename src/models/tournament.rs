//! Tournament, Format, settings and the error type shared by all operations.

use crate::models::game::{GameMatch, MatchId, MatchStatus, Round};
use crate::models::team::{Team, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How an error should be surfaced to the caller.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Bad or insufficient input; never retried automatically.
    Validation,
    /// Stale version or invalid state transition; caller re-fetches and retries.
    Conflict,
    NotFound,
    /// Internal bug (bracket construction or concurrency control).
    Invariant,
}

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Generation needs at least two teams.
    NotEnoughTeams { count: usize },
    /// The same team was listed twice in a generation input.
    DuplicateTeam(TeamId),
    /// A team with this name already exists (names are unique, case-insensitive).
    DuplicateTeamName,
    /// Team name or a member name is blank.
    EmptyName,
    /// A team needs at least one participant.
    EmptyRoster,
    /// Team id is not registered in this tournament.
    TeamNotFound(TeamId),
    /// Withdrawn teams cannot be scheduled.
    TeamWithdrawn(TeamId),
    /// A friendly match needs two different teams.
    SameTeam,
    /// At least one match has left `scheduled`, so the schedule is fixed.
    ScheduleLocked,
    /// Format cannot change once matches exist.
    FormatLocked,
    /// Operation is not available for this tournament's format.
    WrongFormat { expected: Format, actual: Format },
    /// "Fun" tournaments have no generator.
    NoGenerator(Format),
    /// Elimination matches must have a decisive score.
    DrawNotAllowed,
    /// The caller's version is behind the stored one.
    StaleVersion { expected: u64, actual: u64 },
    /// The match cannot perform `action` from its current status.
    InvalidTransition { status: MatchStatus, action: &'static str },
    /// A slot is still waiting for an upstream winner.
    MatchNotReady(MatchId),
    /// Bye matches never start or take scores.
    ByeMatch(MatchId),
    MatchNotFound(MatchId),
    TournamentNotFound(Uuid),
    /// Propagation target already holds a different team.
    SlotOccupied { match_id: MatchId, occupant: TeamId, incoming: TeamId },
    /// Bracket structure is missing the match a winner should feed.
    MissingDownstream { round: u32, position: u32 },
    /// A champion other than this final's winner was already recorded.
    ChampionConflict { recorded: TeamId, incoming: TeamId },
    /// Shared state lock was poisoned by a panicking writer.
    StateUnavailable,
    /// CSV rendering failed.
    Export(String),
}

impl TournamentError {
    pub fn kind(&self) -> ErrorKind {
        use TournamentError::*;
        match self {
            NotEnoughTeams { .. }
            | DuplicateTeam(_)
            | DuplicateTeamName
            | EmptyName
            | EmptyRoster
            | TeamWithdrawn(_)
            | SameTeam
            | ScheduleLocked
            | FormatLocked
            | WrongFormat { .. }
            | NoGenerator(_)
            | DrawNotAllowed => ErrorKind::Validation,
            StaleVersion { .. } | InvalidTransition { .. } | MatchNotReady(_) | ByeMatch(_) => {
                ErrorKind::Conflict
            }
            TeamNotFound(_) | MatchNotFound(_) | TournamentNotFound(_) => ErrorKind::NotFound,
            SlotOccupied { .. }
            | MissingDownstream { .. }
            | ChampionConflict { .. }
            | StateUnavailable
            | Export(_) => ErrorKind::Invariant,
        }
    }
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::NotEnoughTeams { count } => {
                write!(f, "Need at least 2 teams to generate a schedule (got {})", count)
            }
            TournamentError::DuplicateTeam(id) => write!(f, "Team {} is listed more than once", id),
            TournamentError::DuplicateTeamName => write!(f, "A team with this name already exists"),
            TournamentError::EmptyName => write!(f, "Names must not be empty"),
            TournamentError::EmptyRoster => write!(f, "A team needs at least one member"),
            TournamentError::TeamNotFound(id) => write!(f, "Team {} not found", id),
            TournamentError::TeamWithdrawn(id) => write!(f, "Team {} has withdrawn", id),
            TournamentError::SameTeam => write!(f, "A team cannot play itself"),
            TournamentError::ScheduleLocked => {
                write!(f, "Matches have already started; the schedule can no longer be regenerated")
            }
            TournamentError::FormatLocked => write!(f, "Format cannot change once matches exist"),
            TournamentError::WrongFormat { expected, actual } => {
                write!(f, "Operation requires {} format, tournament is {}", expected, actual)
            }
            TournamentError::NoGenerator(format) => {
                write!(f, "{} tournaments have no schedule generator; add matches manually", format)
            }
            TournamentError::DrawNotAllowed => write!(
                f,
                "Elimination matches must have a decisive score, caller must supply tie-break score or extra-time result"
            ),
            TournamentError::StaleVersion { expected, actual } => write!(
                f,
                "Match was modified concurrently (expected version {}, found {}); reload and retry",
                expected, actual
            ),
            TournamentError::InvalidTransition { status, action } => {
                write!(f, "Cannot {} a match that is {}", action, status)
            }
            TournamentError::MatchNotReady(_) => {
                write!(f, "Match is still waiting for both teams")
            }
            TournamentError::ByeMatch(_) => write!(f, "Bye matches cannot be played"),
            TournamentError::MatchNotFound(id) => write!(f, "Match {} not found", id),
            TournamentError::TournamentNotFound(id) => write!(f, "Tournament {} not found", id),
            TournamentError::SlotOccupied { match_id, occupant, incoming } => write!(
                f,
                "Slot in match {} already holds team {} (tried to place {})",
                match_id, occupant, incoming
            ),
            TournamentError::MissingDownstream { round, position } => {
                write!(f, "No match at round {} position {}", round, position)
            }
            TournamentError::ChampionConflict { recorded, incoming } => write!(
                f,
                "Champion already recorded as {} (tried to record {})",
                recorded, incoming
            ),
            TournamentError::StateUnavailable => write!(f, "Tournament state is unavailable"),
            TournamentError::Export(msg) => write!(f, "Export failed: {}", msg),
        }
    }
}

impl std::error::Error for TournamentError {}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Tournament format; selects which generator runs.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// Unstructured list of friendly matches.
    #[default]
    Fun,
    /// Single-elimination bracket.
    Cup,
    /// Round-robin league.
    Liga,
}

impl Format {
    /// Draws are rejected and winners advance.
    pub fn is_elimination(self) -> bool {
        self == Format::Cup
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Fun => write!(f, "fun"),
            Format::Cup => write!(f, "cup"),
            Format::Liga => write!(f, "liga"),
        }
    }
}

/// League table points per result.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            win: 3,
            draw: 1,
            loss: 0,
        }
    }
}

/// Per-tournament policy.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentSettings {
    /// Allow recording a score straight from `scheduled` without starting the match.
    pub allow_skip_live: bool,
    pub scoring: ScoringRules,
}

/// Full tournament state: teams, rounds, matches and result.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub format: Format,
    pub venue: Option<String>,
    pub description: Option<String>,
    pub settings: TournamentSettings,
    /// Registration order; withdrawn teams stay in the list.
    pub teams: Vec<Team>,
    /// Ordered by ordinal.
    pub rounds: Vec<Round>,
    /// Ordered by (round ordinal, position).
    pub matches: Vec<GameMatch>,
    /// Winner of the cup final.
    pub champion: Option<TeamId>,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Create an empty tournament with default settings.
    pub fn new(name: impl Into<String>, format: Format) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            format,
            venue: None,
            description: None,
            settings: TournamentSettings::default(),
            teams: Vec::new(),
            rounds: Vec::new(),
            matches: Vec::new(),
            champion: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_settings(mut self, settings: TournamentSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn team_mut(&mut self, id: TeamId) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.id == id)
    }

    /// Active teams in registration order.
    pub fn active_team_ids(&self) -> Vec<TeamId> {
        self.teams.iter().filter(|t| t.is_active()).map(|t| t.id).collect()
    }

    pub fn get_match(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub(crate) fn match_index(&self, id: MatchId) -> Result<usize, TournamentError> {
        self.matches
            .iter()
            .position(|m| m.id == id)
            .ok_or(TournamentError::MatchNotFound(id))
    }

    /// Number of rounds generated so far.
    pub fn round_count(&self) -> u32 {
        self.rounds.last().map(|r| r.ordinal).unwrap_or(0)
    }

    /// True once any non-bye match has left `scheduled`.
    pub fn has_started(&self) -> bool {
        self.matches
            .iter()
            .any(|m| !m.is_bye && m.status != MatchStatus::Scheduled)
    }

    /// Matches that count toward results (completed, not byes).
    pub fn completed_matches(&self) -> impl Iterator<Item = &GameMatch> + '_ {
        self.matches
            .iter()
            .filter(|m| m.status == MatchStatus::Completed && !m.is_bye)
    }
}
