use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::standing::StandingSnapshot;
use super::team::TeamId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Preliminary,
    Final,
}

/// A round-robin group within a tournament phase.
///
/// Member teams occupy numbered positions 1..=N in assignment order. The
/// standings snapshot is derived data: it is regenerated wholesale on every
/// recomputation and dropped entirely when membership changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Block {
    pub label: String,
    pub phase: Phase,
    pub teams: Vec<TeamId>,
    #[serde(default)]
    pub standings: Option<StandingSnapshot>,
}

impl Block {
    pub fn new(label: impl Into<String>, phase: Phase, teams: Vec<TeamId>) -> Self {
        Self { label: label.into(), phase, teams, standings: None }
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    pub fn contains(&self, team: &TeamId) -> bool {
        self.teams.contains(team)
    }

    /// Replaces the member list. Invalidates any cached standings.
    pub fn assign_teams(&mut self, teams: Vec<TeamId>) {
        self.teams = teams;
        self.standings = None;
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.label.is_empty() {
            return Err("block label must not be empty".to_string());
        }

        let mut seen = std::collections::HashSet::new();
        for team in &self.teams {
            if !seen.insert(team) {
                return Err(format!("block {}: duplicate team {}", self.label, team));
            }
        }

        Ok(())
    }
}
