//! Match lifecycle: scheduled -> live -> completed.
//!
//! Completing a cup match advances its winner in the same call; if that fails the
//! match is put back exactly as it was.

use crate::logic::advancement::propagate_winner;
use crate::models::{GameMatch, MatchId, MatchStatus, TeamId, Tournament, TournamentError};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Start a match: scheduled -> live. Both slots must be filled; byes never start.
pub fn start_match(
    tournament: &mut Tournament,
    match_id: MatchId,
) -> Result<&GameMatch, TournamentError> {
    let idx = tournament.match_index(match_id)?;
    let m = &mut tournament.matches[idx];
    if m.is_bye {
        return Err(TournamentError::ByeMatch(match_id));
    }
    if m.status != MatchStatus::Scheduled {
        return Err(TournamentError::InvalidTransition {
            status: m.status,
            action: "start",
        });
    }
    if !m.is_ready() {
        return Err(TournamentError::MatchNotReady(match_id));
    }
    m.status = MatchStatus::Live;
    m.home_score = Some(0);
    m.away_score = Some(0);
    m.touch();
    log::debug!("Match {} is live", match_id);
    Ok(&tournament.matches[idx])
}

/// Update the running score of a live match without completing it.
pub fn update_live_score(
    tournament: &mut Tournament,
    match_id: MatchId,
    home_score: u32,
    away_score: u32,
    expected_version: u64,
) -> Result<&GameMatch, TournamentError> {
    let idx = tournament.match_index(match_id)?;
    let m = &mut tournament.matches[idx];
    check_version(m, expected_version)?;
    if m.status != MatchStatus::Live {
        return Err(TournamentError::InvalidTransition {
            status: m.status,
            action: "update the live score of",
        });
    }
    m.home_score = Some(home_score);
    m.away_score = Some(away_score);
    m.touch();
    Ok(&tournament.matches[idx])
}

/// Record the final score and complete the match.
///
/// `expected_version` must match the stored version, otherwise the call fails with a
/// conflict and the caller re-fetches. Equal scores are a draw in league/fun play and
/// rejected in cup play. In cup play the winner is advanced before this returns.
pub fn record_score(
    tournament: &mut Tournament,
    match_id: MatchId,
    home_score: u32,
    away_score: u32,
    expected_version: u64,
) -> Result<&GameMatch, TournamentError> {
    let idx = tournament.match_index(match_id)?;
    let elimination = tournament.format.is_elimination();
    let allow_skip_live = tournament.settings.allow_skip_live;

    let m = &tournament.matches[idx];
    if m.is_bye {
        return Err(TournamentError::ByeMatch(match_id));
    }
    if let Err(e) = check_version(m, expected_version) {
        log::warn!("Rejected score for match {}: {}", match_id, e);
        return Err(e);
    }
    match m.status {
        MatchStatus::Live => {}
        MatchStatus::Scheduled if allow_skip_live => {
            if !m.is_ready() {
                return Err(TournamentError::MatchNotReady(match_id));
            }
        }
        status => {
            return Err(TournamentError::InvalidTransition {
                status,
                action: "record a score for",
            })
        }
    }
    let winner = decide_winner(m, home_score, away_score, elimination)?;

    let before = m.clone();
    let m = &mut tournament.matches[idx];
    m.status = MatchStatus::Completed;
    m.home_score = Some(home_score);
    m.away_score = Some(away_score);
    m.winner = winner;
    m.touch();
    log::debug!("Match {} completed {}-{}", match_id, home_score, away_score);

    if elimination {
        if let Err(e) = propagate_winner(tournament, match_id) {
            tournament.matches[idx] = before;
            return Err(e);
        }
    }
    Ok(&tournament.matches[idx])
}

/// Move a scheduled match to a new kickoff time.
pub fn reschedule_match(
    tournament: &mut Tournament,
    match_id: MatchId,
    when: DateTime<Utc>,
) -> Result<&GameMatch, TournamentError> {
    let idx = tournament.match_index(match_id)?;
    let m = &mut tournament.matches[idx];
    if m.status != MatchStatus::Scheduled {
        return Err(TournamentError::InvalidTransition {
            status: m.status,
            action: "reschedule",
        });
    }
    m.scheduled_at = Some(when);
    m.touch();
    Ok(&tournament.matches[idx])
}

/// Change the venue of a scheduled match.
pub fn set_match_venue(
    tournament: &mut Tournament,
    match_id: MatchId,
    venue: Option<String>,
) -> Result<&GameMatch, TournamentError> {
    let idx = tournament.match_index(match_id)?;
    let m = &mut tournament.matches[idx];
    if m.status != MatchStatus::Scheduled {
        return Err(TournamentError::InvalidTransition {
            status: m.status,
            action: "move",
        });
    }
    m.venue = venue.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    m.touch();
    Ok(&tournament.matches[idx])
}

fn check_version(m: &GameMatch, expected: u64) -> Result<(), TournamentError> {
    if m.version != expected {
        return Err(TournamentError::StaleVersion {
            expected,
            actual: m.version,
        });
    }
    Ok(())
}

fn decide_winner(
    m: &GameMatch,
    home_score: u32,
    away_score: u32,
    elimination: bool,
) -> Result<Option<TeamId>, TournamentError> {
    match home_score.cmp(&away_score) {
        Ordering::Greater => Ok(m.home),
        Ordering::Less => Ok(m.away),
        Ordering::Equal if elimination => Err(TournamentError::DrawNotAllowed),
        Ordering::Equal => Ok(None),
    }
}
