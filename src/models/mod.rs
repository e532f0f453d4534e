//! Data structures for the engine: tournaments, teams, rounds, matches.

mod game;
mod team;
mod tournament;

pub use game::{GameMatch, MatchId, MatchStatus, Round, RoundId, Slot};
pub use team::{Team, TeamId, TeamStatus};
pub use tournament::{
    ErrorKind, Format, ScoringRules, Tournament, TournamentError, TournamentId,
    TournamentSettings,
};
