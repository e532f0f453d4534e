//! Advancement: moves a completed cup match's winner into its downstream slot.
//!
//! Match k of round r feeds round r+1, position ⌈k/2⌉ (home for odd k, away for even k).
//! The final's winner becomes the champion.

use crate::logic::setup::require_format;
use crate::models::{
    ErrorKind, Format, GameMatch, MatchId, MatchStatus, Slot, TeamId, Tournament,
    TournamentError,
};

/// What a propagation pass did.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Advance {
    /// Winner written into an empty slot.
    Placed { match_id: MatchId, slot: Slot, team: TeamId },
    /// Slot already held this winner; nothing changed.
    AlreadyPlaced { match_id: MatchId, slot: Slot, team: TeamId },
    /// Source was the final.
    Champion(TeamId),
}

/// Propagate the winner of `matches[source]` inside one bracket.
///
/// Idempotent: a slot that already holds the same winner is left untouched.
pub(crate) fn advance(
    matches: &mut [GameMatch],
    total_rounds: u32,
    source: usize,
) -> Result<Advance, TournamentError> {
    let src = &matches[source];
    if src.status != MatchStatus::Completed {
        return Err(TournamentError::InvalidTransition {
            status: src.status,
            action: "advance the winner of",
        });
    }
    let winner = src.winner.ok_or(TournamentError::DrawNotAllowed)?;
    if src.round_ordinal >= total_rounds {
        return Ok(Advance::Champion(winner));
    }

    let round = src.round_ordinal + 1;
    let position = src.position.div_ceil(2);
    let slot = Slot::fed_by(src.position);
    let target = matches
        .iter_mut()
        .find(|m| m.round_ordinal == round && m.position == position)
        .ok_or(TournamentError::MissingDownstream { round, position })?;

    match target.team_in(slot) {
        Some(occupant) if occupant == winner => Ok(Advance::AlreadyPlaced {
            match_id: target.id,
            slot,
            team: winner,
        }),
        Some(occupant) => Err(TournamentError::SlotOccupied {
            match_id: target.id,
            occupant,
            incoming: winner,
        }),
        None => {
            *target.slot_mut(slot) = Some(winner);
            target.touch();
            log::debug!(
                "Placed team {} in round {} match {} ({:?})",
                winner,
                round,
                position,
                slot
            );
            Ok(Advance::Placed {
                match_id: target.id,
                slot,
                team: winner,
            })
        }
    }
}

/// Propagate a completed cup match's winner; safe to retry.
///
/// A slot occupied by a different team is an invariant violation and is logged, not corrected.
pub fn propagate_winner(
    tournament: &mut Tournament,
    match_id: MatchId,
) -> Result<Advance, TournamentError> {
    require_format(tournament, Format::Cup)?;
    let idx = tournament.match_index(match_id)?;
    let total_rounds = tournament.round_count();

    let outcome = match advance(&mut tournament.matches, total_rounds, idx) {
        Ok(outcome) => outcome,
        Err(e) => {
            if e.kind() == ErrorKind::Invariant {
                log::error!("Advancement from match {} failed: {}", match_id, e);
            }
            return Err(e);
        }
    };

    if let Advance::Champion(winner) = outcome {
        match tournament.champion {
            Some(recorded) if recorded != winner => {
                let e = TournamentError::ChampionConflict {
                    recorded,
                    incoming: winner,
                };
                log::error!("Advancement from match {} failed: {}", match_id, e);
                return Err(e);
            }
            Some(_) => {}
            None => {
                tournament.champion = Some(winner);
                log::info!("Tournament {} champion: team {}", tournament.id, winner);
            }
        }
    }
    Ok(outcome)
}
