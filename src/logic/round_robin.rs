//! League schedule generation (circle method).

use crate::logic::setup::{
    ensure_regenerable, install, require_format, validate_roster, GenerationOptions, Schedule,
};
use crate::models::{Format, GameMatch, Round, TeamId, Tournament, TournamentError, TournamentId};
use chrono::Utc;

/// Generate the league schedule for `team_ids` and install it.
pub fn generate_round_robin(
    tournament: &mut Tournament,
    team_ids: &[TeamId],
    options: &GenerationOptions,
) -> Result<Schedule, TournamentError> {
    require_format(tournament, Format::Liga)?;
    validate_roster(tournament, team_ids, 2)?;
    ensure_regenerable(tournament)?;

    let schedule = build_round_robin(tournament.id, team_ids, options)?;
    log::info!(
        "Generated league schedule for tournament {}: {} teams, {} rounds, {} matches",
        tournament.id,
        team_ids.len(),
        schedule.rounds.len(),
        schedule.matches.len()
    );
    Ok(install(tournament, schedule))
}

/// Build an all-pairs schedule without touching any tournament.
///
/// With an odd count a placeholder joins the circle; whoever meets it sits the round out.
/// The first team stays fixed while the rest rotate one step per round.
pub fn build_round_robin(
    tournament_id: TournamentId,
    team_ids: &[TeamId],
    options: &GenerationOptions,
) -> Result<Schedule, TournamentError> {
    if team_ids.len() < 2 {
        return Err(TournamentError::NotEnoughTeams {
            count: team_ids.len(),
        });
    }
    let mut circle: Vec<Option<TeamId>> = team_ids.iter().copied().map(Some).collect();
    if circle.len() % 2 == 1 {
        circle.push(None);
    }
    let slots = circle.len();
    let now = Utc::now();

    let mut rounds = Vec::with_capacity(slots - 1);
    let mut matches = Vec::with_capacity(team_ids.len() * (team_ids.len() - 1) / 2);
    for r in 0..slots - 1 {
        let round = Round::new(tournament_id, r as u32 + 1, now);
        let mut position = 0;
        for i in 0..slots / 2 {
            let (Some(a), Some(b)) = (circle[i], circle[slots - 1 - i]) else {
                continue;
            };
            // The fixed team swaps sides every round; rotating pairs alternate by table
            // position. Keeps every team's home and away counts within two of each other.
            let a_home = if i == 0 { r % 2 == 0 } else { i % 2 == 1 };
            let (home, away) = if a_home { (a, b) } else { (b, a) };
            position += 1;
            let mut m = GameMatch::new(&round, position, Some(home), Some(away));
            options.stamp(&mut m);
            matches.push(m);
        }
        rounds.push(round);
        circle[1..].rotate_right(1);
    }

    Ok(Schedule { rounds, matches })
}
