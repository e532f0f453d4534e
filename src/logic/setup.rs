//! Setup phase: tournament creation, team registration and format-dispatched generation.

use crate::logic::{bracket, round_robin};
use crate::models::{
    Format, GameMatch, MatchId, Round, Team, TeamId, Tournament, TournamentError,
    TournamentSettings,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Input for creating a tournament.
#[derive(Clone, Debug, Deserialize)]
pub struct NewTournament {
    pub name: String,
    #[serde(default)]
    pub format: Format,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub settings: TournamentSettings,
}

/// Optional stamping applied to generated matches.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// Kickoff of round 1; later rounds follow every `days_between_rounds`.
    pub first_round_at: Option<DateTime<Utc>>,
    pub days_between_rounds: u32,
    /// Default venue for every generated match.
    pub venue: Option<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            first_round_at: None,
            days_between_rounds: 7,
            venue: None,
        }
    }
}

impl GenerationOptions {
    /// Kickoff time for a round, if a first-round time was given.
    pub fn kickoff_for(&self, ordinal: u32) -> Option<DateTime<Utc>> {
        let offset = i64::from(ordinal.saturating_sub(1)) * i64::from(self.days_between_rounds);
        self.first_round_at.map(|start| start + Duration::days(offset))
    }

    pub(crate) fn stamp(&self, m: &mut GameMatch) {
        m.scheduled_at = self.kickoff_for(m.round_ordinal);
        m.venue = self.venue.clone();
    }
}

/// Rounds and matches produced by one generation pass.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Schedule {
    pub rounds: Vec<Round>,
    pub matches: Vec<GameMatch>,
}

/// Create an empty tournament from validated input (name must be non-blank).
pub fn create_tournament(input: NewTournament) -> Result<Tournament, TournamentError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(TournamentError::EmptyName);
    }
    let mut tournament = Tournament::new(name, input.format).with_settings(input.settings);
    tournament.venue = input.venue;
    tournament.description = input.description;
    log::info!("Created {} tournament {} ({})", tournament.format, tournament.name, tournament.id);
    Ok(tournament)
}

/// Register a team. Names are unique (case-insensitive); the roster needs at least one member.
pub fn register_team(
    tournament: &mut Tournament,
    name: &str,
    members: &[String],
) -> Result<TeamId, TournamentError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TournamentError::EmptyName);
    }
    if members.is_empty() {
        return Err(TournamentError::EmptyRoster);
    }
    let members: Vec<String> = members.iter().map(|m| m.trim().to_string()).collect();
    if members.iter().any(|m| m.is_empty()) {
        return Err(TournamentError::EmptyName);
    }
    if tournament.teams.iter().any(|t| t.name.eq_ignore_ascii_case(name)) {
        return Err(TournamentError::DuplicateTeamName);
    }
    let team = Team::new(tournament.id, name, members);
    let id = team.id;
    tournament.teams.push(team);
    Ok(id)
}

/// Withdraw a team from future generation. Existing matches are kept.
pub fn withdraw_team(tournament: &mut Tournament, team_id: TeamId) -> Result<(), TournamentError> {
    let team = tournament
        .team_mut(team_id)
        .ok_or(TournamentError::TeamNotFound(team_id))?;
    if team.is_active() {
        team.withdraw();
        log::info!("Team {} withdrew from tournament {}", team.name, team.tournament_id);
    }
    Ok(())
}

/// Change the format; only while no matches exist.
pub fn set_format(tournament: &mut Tournament, format: Format) -> Result<(), TournamentError> {
    if !tournament.matches.is_empty() && tournament.format != format {
        return Err(TournamentError::FormatLocked);
    }
    tournament.format = format;
    Ok(())
}

/// Generate the schedule for the tournament's format from its active teams
/// (registration order doubles as seed order for cup).
pub fn generate_schedule(
    tournament: &mut Tournament,
    options: &GenerationOptions,
) -> Result<Schedule, TournamentError> {
    let teams = tournament.active_team_ids();
    match tournament.format {
        Format::Cup => bracket::generate_bracket(tournament, &teams, options),
        Format::Liga => round_robin::generate_round_robin(tournament, &teams, options),
        Format::Fun => Err(TournamentError::NoGenerator(Format::Fun)),
    }
}

/// Add a single friendly match ("fun" format). All friendlies share round 1.
pub fn add_friendly_match(
    tournament: &mut Tournament,
    home: TeamId,
    away: TeamId,
    scheduled_at: Option<DateTime<Utc>>,
    venue: Option<String>,
) -> Result<MatchId, TournamentError> {
    require_format(tournament, Format::Fun)?;
    if home == away {
        return Err(TournamentError::SameTeam);
    }
    validate_roster(tournament, &[home, away], 2)?;

    if tournament.rounds.is_empty() {
        tournament.rounds.push(Round::new(tournament.id, 1, Utc::now()));
    }
    let round = &tournament.rounds[0];
    let position = tournament.matches.len() as u32 + 1;
    let mut m = GameMatch::new(round, position, Some(home), Some(away));
    m.scheduled_at = scheduled_at;
    m.venue = venue.or_else(|| tournament.venue.clone());
    let id = m.id;
    tournament.matches.push(m);
    Ok(id)
}

pub(crate) fn require_format(tournament: &Tournament, expected: Format) -> Result<(), TournamentError> {
    if tournament.format != expected {
        return Err(TournamentError::WrongFormat {
            expected,
            actual: tournament.format,
        });
    }
    Ok(())
}

/// Every id registered, active and listed once; at least `min` teams.
pub(crate) fn validate_roster(
    tournament: &Tournament,
    team_ids: &[TeamId],
    min: usize,
) -> Result<(), TournamentError> {
    if team_ids.len() < min {
        return Err(TournamentError::NotEnoughTeams {
            count: team_ids.len(),
        });
    }
    let mut seen = HashSet::with_capacity(team_ids.len());
    for &id in team_ids {
        if !seen.insert(id) {
            return Err(TournamentError::DuplicateTeam(id));
        }
        let team = tournament.team(id).ok_or(TournamentError::TeamNotFound(id))?;
        if !team.is_active() {
            return Err(TournamentError::TeamWithdrawn(id));
        }
    }
    Ok(())
}

/// Regeneration is only allowed while nothing has been played.
pub(crate) fn ensure_regenerable(tournament: &Tournament) -> Result<(), TournamentError> {
    if tournament.has_started() {
        return Err(TournamentError::ScheduleLocked);
    }
    Ok(())
}

/// Swap a freshly generated schedule in, superseding the previous one.
pub(crate) fn install(tournament: &mut Tournament, schedule: Schedule) -> Schedule {
    if !tournament.matches.is_empty() {
        log::info!(
            "Superseding {} existing match(es) in tournament {}",
            tournament.matches.len(),
            tournament.id
        );
    }
    tournament.rounds = schedule.rounds.clone();
    tournament.matches = schedule.matches.clone();
    tournament.champion = None;
    schedule
}
