//! Tournament bracket and schedule engine: models, generators, match lifecycle and a shared store.

pub mod logic;
pub mod models;
pub mod store;

pub use logic::{
    add_friendly_match, bracket_view, build_bracket, build_round_robin, compute_standings,
    create_tournament, draw_seeds, generate_bracket, generate_round_robin, generate_schedule,
    get_standings, propagate_winner, record_score, register_team, reschedule_match, round_label,
    seeding_order, set_format, set_match_venue, standings_csv, start_match, update_live_score,
    withdraw_team, Advance, BracketView, GenerationOptions, MatchState, MatchView, NewTournament,
    RoundView, Schedule, StandingsRow, TeamRef,
};
pub use models::{
    ErrorKind, Format, GameMatch, MatchId, MatchStatus, Round, RoundId, ScoringRules, Slot, Team,
    TeamId, TeamStatus, Tournament, TournamentError, TournamentId, TournamentSettings,
};
pub use store::TournamentStore;
