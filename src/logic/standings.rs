//! League table, derived from scratch from completed matches on every call.

use crate::logic::setup::require_format;
use crate::models::{
    Format, GameMatch, MatchStatus, ScoringRules, Team, TeamId, Tournament, TournamentError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One line of the league table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StandingsRow {
    /// 1-based position after sorting.
    pub rank: u32,
    pub team_id: TeamId,
    pub team_name: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u64,
    pub goals_against: u64,
    pub goal_difference: i64,
    pub points: u64,
}

impl StandingsRow {
    fn new(team_id: TeamId, team_name: String) -> Self {
        Self {
            rank: 0,
            team_id,
            team_name,
            played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
        }
    }

    fn add_result(&mut self, scored: u32, conceded: u32, rules: &ScoringRules) {
        self.played += 1;
        // Scores are any u32, so totals are kept wide and saturate rather than wrap.
        self.goals_for = self.goals_for.saturating_add(u64::from(scored));
        self.goals_against = self.goals_against.saturating_add(u64::from(conceded));
        self.goal_difference = self
            .goal_difference
            .saturating_add(i64::from(scored) - i64::from(conceded));
        let earned = if scored > conceded {
            self.wins += 1;
            rules.win
        } else if scored < conceded {
            self.losses += 1;
            rules.loss
        } else {
            self.draws += 1;
            rules.draw
        };
        self.points = self.points.saturating_add(u64::from(earned));
    }
}

/// Ranked table for a league tournament.
///
/// Only teams placed in the league's fixtures get a row; teams registered later or left
/// out of generation are not listed. Withdrawn teams keep their row and results.
pub fn get_standings(tournament: &Tournament) -> Result<Vec<StandingsRow>, TournamentError> {
    require_format(tournament, Format::Liga)?;
    let participants: Vec<Team> = tournament
        .teams
        .iter()
        .filter(|team| tournament.matches.iter().any(|m| m.involves(team.id)))
        .cloned()
        .collect();
    Ok(compute_standings(
        &participants,
        tournament.completed_matches(),
        &tournament.settings.scoring,
    ))
}

/// Build the table from `teams` (listed with zeros until they play) and the matches given.
///
/// Only completed, scored, non-bye matches count. The result does not depend on the order
/// of either input: ties fall through points, goal difference, goals for, name, then id.
pub fn compute_standings<'a>(
    teams: &[Team],
    matches: impl IntoIterator<Item = &'a GameMatch>,
    rules: &ScoringRules,
) -> Vec<StandingsRow> {
    let mut table: HashMap<TeamId, StandingsRow> = teams
        .iter()
        .map(|t| (t.id, StandingsRow::new(t.id, t.name.clone())))
        .collect();

    for m in matches {
        if m.status != MatchStatus::Completed || m.is_bye {
            continue;
        }
        let (Some(home), Some(away), Some(hs), Some(aws)) =
            (m.home, m.away, m.home_score, m.away_score)
        else {
            continue;
        };
        table
            .entry(home)
            .or_insert_with(|| StandingsRow::new(home, home.to_string()))
            .add_result(hs, aws, rules);
        table
            .entry(away)
            .or_insert_with(|| StandingsRow::new(away, away.to_string()))
            .add_result(aws, hs, rules);
    }

    let mut rows: Vec<StandingsRow> = table.into_values().collect();
    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.goal_difference.cmp(&a.goal_difference))
            .then(b.goals_for.cmp(&a.goals_for))
            .then_with(|| a.team_name.cmp(&b.team_name))
            .then(a.team_id.cmp(&b.team_id))
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i as u32 + 1;
    }
    rows
}

/// Render the table as CSV with a header row.
pub fn standings_csv(rows: &[StandingsRow]) -> Result<String, TournamentError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| TournamentError::Export(e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| TournamentError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| TournamentError::Export(e.to_string()))
}
