//! Read-only projection of rounds and matches for rendering.

use crate::models::{Format, GameMatch, MatchId, MatchStatus, RoundId, TeamId, Tournament, TournamentId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// How the UI should draw a match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    Completed,
    /// Scheduled or live.
    Pending,
    Bye,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TeamRef {
    pub id: TeamId,
    pub name: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MatchView {
    pub id: MatchId,
    pub position: u32,
    pub home: Option<TeamRef>,
    pub away: Option<TeamRef>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub winner: Option<TeamId>,
    pub status: MatchStatus,
    pub state: MatchState,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub venue: Option<String>,
    /// Echo back when recording a score.
    pub version: u64,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RoundView {
    pub id: RoundId,
    pub ordinal: u32,
    pub label: String,
    pub matches: Vec<MatchView>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BracketView {
    pub tournament_id: TournamentId,
    pub name: String,
    pub format: Format,
    pub champion: Option<TeamRef>,
    pub rounds: Vec<RoundView>,
}

/// Group the tournament's matches by round, in ordinal then position order.
pub fn bracket_view(tournament: &Tournament) -> BracketView {
    let total = tournament.round_count();
    let rounds = tournament
        .rounds
        .iter()
        .map(|round| {
            let mut matches: Vec<MatchView> = tournament
                .matches
                .iter()
                .filter(|m| m.round_id == round.id)
                .map(|m| match_view(tournament, m))
                .collect();
            matches.sort_by_key(|m| m.position);
            RoundView {
                id: round.id,
                ordinal: round.ordinal,
                label: round_label(tournament.format, round.ordinal, total),
                matches,
            }
        })
        .collect();

    BracketView {
        tournament_id: tournament.id,
        name: tournament.name.clone(),
        format: tournament.format,
        champion: tournament.champion.map(|id| team_ref(tournament, id)),
        rounds,
    }
}

/// Display label for a round: "Final", "Semi-finals", ... for cup, "Week N" for league.
pub fn round_label(format: Format, ordinal: u32, total_rounds: u32) -> String {
    match format {
        Format::Cup => match total_rounds.saturating_sub(ordinal) {
            0 => "Final".to_string(),
            1 => "Semi-finals".to_string(),
            2 => "Quarter-finals".to_string(),
            remaining => format!("Round of {}", 2u64 << remaining.min(62)),
        },
        Format::Liga => format!("Week {}", ordinal),
        Format::Fun => "Matches".to_string(),
    }
}

fn match_view(tournament: &Tournament, m: &GameMatch) -> MatchView {
    let state = if m.is_bye {
        MatchState::Bye
    } else if m.status == MatchStatus::Completed {
        MatchState::Completed
    } else {
        MatchState::Pending
    };
    MatchView {
        id: m.id,
        position: m.position,
        home: m.home.map(|id| team_ref(tournament, id)),
        away: m.away.map(|id| team_ref(tournament, id)),
        home_score: m.home_score,
        away_score: m.away_score,
        winner: m.winner,
        status: m.status,
        state,
        scheduled_at: m.scheduled_at,
        venue: m.venue.clone(),
        version: m.version,
    }
}

fn team_ref(tournament: &Tournament, id: TeamId) -> TeamRef {
    let name = tournament
        .team(id)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| id.to_string());
    TeamRef { id, name }
}
