//! In-memory tournament store shared by concurrent callers.
//!
//! Each tournament sits behind its own mutex, so a score update and the advancement it
//! triggers are one unit to every other caller. The registry maps are only write-locked
//! to add, evict or re-index tournaments, never while waiting on a tournament lock.

use crate::logic::{self, BracketView, GenerationOptions, NewTournament, Schedule, StandingsRow};
use crate::models::{
    Format, GameMatch, MatchId, TeamId, Tournament, TournamentError, TournamentId,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    last_activity: Instant,
}

type SharedEntry = Arc<Mutex<TournamentEntry>>;

#[derive(Default)]
pub struct TournamentStore {
    tournaments: RwLock<HashMap<TournamentId, SharedEntry>>,
    /// Which tournament owns each match.
    match_owners: RwLock<HashMap<MatchId, TournamentId>>,
}

impl TournamentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_tournament(&self, input: NewTournament) -> Result<Tournament, TournamentError> {
        let tournament = logic::create_tournament(input)?;
        let snapshot = tournament.clone();
        let entry = TournamentEntry {
            tournament,
            last_activity: Instant::now(),
        };
        self.tournaments
            .write()
            .map_err(|_| TournamentError::StateUnavailable)?
            .insert(snapshot.id, Arc::new(Mutex::new(entry)));
        Ok(snapshot)
    }

    /// Snapshot of a tournament. Touching it refreshes last_activity.
    pub fn get(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        self.with_tournament(id, |t| Ok(t.clone()))
    }

    pub fn len(&self) -> usize {
        self.tournaments.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_format(&self, id: TournamentId, format: Format) -> Result<Tournament, TournamentError> {
        self.with_tournament(id, |t| {
            logic::set_format(t, format)?;
            Ok(t.clone())
        })
    }

    pub fn register_team(
        &self,
        id: TournamentId,
        name: &str,
        members: &[String],
    ) -> Result<TeamId, TournamentError> {
        self.with_tournament(id, |t| logic::register_team(t, name, members))
    }

    pub fn withdraw_team(&self, id: TournamentId, team_id: TeamId) -> Result<(), TournamentError> {
        self.with_tournament(id, |t| logic::withdraw_team(t, team_id))
    }

    pub fn generate_bracket(
        &self,
        id: TournamentId,
        seeds: &[TeamId],
        options: &GenerationOptions,
    ) -> Result<Schedule, TournamentError> {
        self.regenerate(id, |t| logic::generate_bracket(t, seeds, options))
    }

    pub fn generate_round_robin(
        &self,
        id: TournamentId,
        team_ids: &[TeamId],
        options: &GenerationOptions,
    ) -> Result<Schedule, TournamentError> {
        self.regenerate(id, |t| logic::generate_round_robin(t, team_ids, options))
    }

    /// Generate from the active roster according to the tournament's format.
    pub fn generate_schedule(
        &self,
        id: TournamentId,
        options: &GenerationOptions,
    ) -> Result<Schedule, TournamentError> {
        self.regenerate(id, |t| logic::generate_schedule(t, options))
    }

    pub fn add_friendly_match(
        &self,
        id: TournamentId,
        home: TeamId,
        away: TeamId,
        scheduled_at: Option<DateTime<Utc>>,
        venue: Option<String>,
    ) -> Result<MatchId, TournamentError> {
        let match_id = self.with_tournament(id, |t| {
            logic::add_friendly_match(t, home, away, scheduled_at, venue)
        })?;
        self.match_owners
            .write()
            .map_err(|_| TournamentError::StateUnavailable)?
            .insert(match_id, id);
        Ok(match_id)
    }

    pub fn start_match(&self, match_id: MatchId) -> Result<GameMatch, TournamentError> {
        self.with_match(match_id, |t| logic::start_match(t, match_id).cloned())
    }

    pub fn update_live_score(
        &self,
        match_id: MatchId,
        home_score: u32,
        away_score: u32,
        expected_version: u64,
    ) -> Result<GameMatch, TournamentError> {
        self.with_match(match_id, |t| {
            logic::update_live_score(t, match_id, home_score, away_score, expected_version).cloned()
        })
    }

    pub fn record_score(
        &self,
        match_id: MatchId,
        home_score: u32,
        away_score: u32,
        expected_version: u64,
    ) -> Result<GameMatch, TournamentError> {
        self.with_match(match_id, |t| {
            logic::record_score(t, match_id, home_score, away_score, expected_version).cloned()
        })
    }

    pub fn reschedule_match(
        &self,
        match_id: MatchId,
        when: DateTime<Utc>,
    ) -> Result<GameMatch, TournamentError> {
        self.with_match(match_id, |t| logic::reschedule_match(t, match_id, when).cloned())
    }

    pub fn set_match_venue(
        &self,
        match_id: MatchId,
        venue: Option<String>,
    ) -> Result<GameMatch, TournamentError> {
        self.with_match(match_id, |t| logic::set_match_venue(t, match_id, venue).cloned())
    }

    pub fn bracket_view(&self, id: TournamentId) -> Result<BracketView, TournamentError> {
        self.with_tournament(id, |t| Ok(logic::bracket_view(t)))
    }

    pub fn standings(&self, id: TournamentId) -> Result<Vec<StandingsRow>, TournamentError> {
        self.with_tournament(id, |t| logic::get_standings(t))
    }

    pub fn standings_csv(&self, id: TournamentId) -> Result<String, TournamentError> {
        let rows = self.standings(id)?;
        logic::standings_csv(&rows)
    }

    /// Remove tournaments not touched for `timeout`. Returns how many were removed.
    pub fn evict_inactive(&self, timeout: Duration) -> Result<usize, TournamentError> {
        let mut tournaments = self
            .tournaments
            .write()
            .map_err(|_| TournamentError::StateUnavailable)?;
        let mut evicted = Vec::new();
        tournaments.retain(|id, entry| {
            // An entry someone is holding right now is clearly active.
            let keep = match entry.try_lock() {
                Ok(e) => e.last_activity.elapsed() < timeout,
                Err(_) => true,
            };
            if !keep {
                evicted.push(*id);
            }
            keep
        });
        drop(tournaments);

        if !evicted.is_empty() {
            self.match_owners
                .write()
                .map_err(|_| TournamentError::StateUnavailable)?
                .retain(|_, owner| !evicted.contains(owner));
        }
        Ok(evicted.len())
    }

    /// Run `f` with the tournament locked. Only this tournament is locked.
    fn with_tournament<R>(
        &self,
        id: TournamentId,
        f: impl FnOnce(&mut Tournament) -> Result<R, TournamentError>,
    ) -> Result<R, TournamentError> {
        let entry = self
            .tournaments
            .read()
            .map_err(|_| TournamentError::StateUnavailable)?
            .get(&id)
            .cloned()
            .ok_or(TournamentError::TournamentNotFound(id))?;
        let mut guard = entry.lock().map_err(|_| TournamentError::StateUnavailable)?;
        guard.last_activity = Instant::now();
        f(&mut guard.tournament)
    }

    fn with_match<R>(
        &self,
        match_id: MatchId,
        f: impl FnOnce(&mut Tournament) -> Result<R, TournamentError>,
    ) -> Result<R, TournamentError> {
        let owner = self
            .match_owners
            .read()
            .map_err(|_| TournamentError::StateUnavailable)?
            .get(&match_id)
            .copied()
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        self.with_tournament(owner, f)
    }

    /// Run a generator and re-point the match index at the new schedule.
    fn regenerate(
        &self,
        id: TournamentId,
        f: impl FnOnce(&mut Tournament) -> Result<Schedule, TournamentError>,
    ) -> Result<Schedule, TournamentError> {
        self.with_tournament(id, |t| {
            let previous: Vec<MatchId> = t.matches.iter().map(|m| m.id).collect();
            let schedule = f(t)?;
            let mut owners = self
                .match_owners
                .write()
                .map_err(|_| TournamentError::StateUnavailable)?;
            for old in previous {
                owners.remove(&old);
            }
            owners.extend(schedule.matches.iter().map(|m| (m.id, id)));
            Ok(schedule)
        })
    }
}
