//! Tournament business logic: setup, generators, match lifecycle, advancement, standings, views.

mod advancement;
mod bracket;
mod match_state;
mod round_robin;
mod setup;
mod standings;
mod view;

pub use advancement::{propagate_winner, Advance};
pub use bracket::{build_bracket, draw_seeds, generate_bracket, seeding_order};
pub use match_state::{
    record_score, reschedule_match, set_match_venue, start_match, update_live_score,
};
pub use round_robin::{build_round_robin, generate_round_robin};
pub use setup::{
    add_friendly_match, create_tournament, generate_schedule, register_team, set_format,
    withdraw_team, GenerationOptions, NewTournament, Schedule,
};
pub use standings::{compute_standings, get_standings, standings_csv, StandingsRow};
pub use view::{bracket_view, round_label, BracketView, MatchState, MatchView, RoundView, TeamRef};
