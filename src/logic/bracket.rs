//! Single-elimination bracket generation with seeding and byes.

use crate::logic::advancement::advance;
use crate::logic::setup::{
    ensure_regenerable, install, require_format, validate_roster, GenerationOptions, Schedule,
};
use crate::models::{Format, GameMatch, Round, TeamId, Tournament, TournamentError, TournamentId};
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;

/// Generate the cup bracket from `seeds` (best seed first) and install it.
///
/// 1. Validate the roster (≥ 2 registered, active, distinct teams) and that nothing has started.
/// 2. Build the bracket off to the side, resolving round-1 byes into round 2.
/// 3. Swap it in, superseding any previous (unplayed) bracket.
pub fn generate_bracket(
    tournament: &mut Tournament,
    seeds: &[TeamId],
    options: &GenerationOptions,
) -> Result<Schedule, TournamentError> {
    require_format(tournament, Format::Cup)?;
    validate_roster(tournament, seeds, 2)?;
    ensure_regenerable(tournament)?;

    let schedule = build_bracket(tournament.id, seeds, options)?;
    log::info!(
        "Generated cup bracket for tournament {}: {} teams, {} rounds, {} byes",
        tournament.id,
        seeds.len(),
        schedule.rounds.len(),
        schedule.matches.iter().filter(|m| m.is_bye).count()
    );
    Ok(install(tournament, schedule))
}

/// Build a bracket for `seeds` without touching any tournament.
///
/// Empty seed positions (N+1..P) hand byes to the top seeds they are drawn against.
/// Round 1 byes are completed and already advanced into round 2.
pub fn build_bracket(
    tournament_id: TournamentId,
    seeds: &[TeamId],
    options: &GenerationOptions,
) -> Result<Schedule, TournamentError> {
    if seeds.len() < 2 {
        return Err(TournamentError::NotEnoughTeams { count: seeds.len() });
    }
    let size = seeds.len().next_power_of_two();
    let total_rounds = size.trailing_zeros();
    let now = Utc::now();

    let rounds: Vec<Round> = (1..=total_rounds)
        .map(|ordinal| Round::new(tournament_id, ordinal, now))
        .collect();

    let mut matches = Vec::with_capacity(size - 1);
    for (i, pair) in seeding_order(size).chunks_exact(2).enumerate() {
        let position = i as u32 + 1;
        // The better seed is always first in a pair and is always a real team.
        let home = seeds[pair[0] - 1];
        let m = match seeds.get(pair[1] - 1) {
            Some(&away) => GameMatch::new(&rounds[0], position, Some(home), Some(away)),
            None => GameMatch::bye(&rounds[0], position, home),
        };
        matches.push(m);
    }
    for round in rounds.iter().skip(1) {
        let count = (size >> round.ordinal) as u32;
        matches.extend((1..=count).map(|position| GameMatch::new(round, position, None, None)));
    }
    for m in &mut matches {
        options.stamp(m);
    }

    let byes: Vec<usize> = matches
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_bye)
        .map(|(i, _)| i)
        .collect();
    for idx in byes {
        advance(&mut matches, total_rounds, idx)?;
    }

    Ok(Schedule { rounds, matches })
}

/// Canonical bracket order of 1-based seeds for a bracket of `size` (a power of two).
///
/// Consecutive pairs are the round-1 pairings: for 8 this is 1-8, 4-5, 2-7, 3-6, so
/// seeds 1 and 2 can only meet in the final.
pub fn seeding_order(size: usize) -> Vec<usize> {
    let mut order = vec![1usize];
    while order.len() < size {
        let sum = order.len() * 2 + 1;
        order = order.iter().flat_map(|&s| [s, sum - s]).collect();
    }
    order
}

/// Random seed draw for tournaments without a ranking. Pass a seeded RNG for a reproducible draw.
pub fn draw_seeds<R: Rng + ?Sized>(team_ids: &[TeamId], rng: &mut R) -> Vec<TeamId> {
    let mut seeds = team_ids.to_vec();
    seeds.shuffle(rng);
    seeds
}
