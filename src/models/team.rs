//! Team records.

use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team (used in matches and lookups).
pub type TeamId = Uuid;

/// Whether a team still takes part in future generation passes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamStatus {
    #[default]
    Active,
    /// Kept for history; skipped by generation.
    Withdrawn,
}

/// A registered team.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub tournament_id: TournamentId,
    pub name: String,
    /// Participant names, at least one.
    pub members: Vec<String>,
    pub status: TeamStatus,
}

impl Team {
    /// Create an active team. Callers validate name and roster first.
    pub fn new(tournament_id: TournamentId, name: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            name: name.into(),
            members,
            status: TeamStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TeamStatus::Active
    }

    /// Mark the team as withdrawn.
    pub fn withdraw(&mut self) {
        self.status = TeamStatus::Withdrawn;
    }
}
