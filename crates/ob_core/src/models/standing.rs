//! Standings snapshot types.
//!
//! A snapshot is derived data, regenerated wholesale on every recomputation
//! and atomically swapped into its block. Rows are never patched in place.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::block::Phase;
use super::team::TeamId;

/// One ranked row per team within a block.
///
/// `points` carries the ranking scalar for points-based sports; sports
/// ranked by win rate populate `win_rate_milli` (wins per thousand played)
/// instead and leave `points` at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StandingRow {
    pub team: TeamId,
    /// 1-based. Tied teams share a position; the sequence skips ahead by
    /// the tie-group size.
    pub position: u32,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
    pub points: i64,
    pub win_rate_milli: u32,
}

impl StandingRow {
    pub fn zeroed(team: TeamId) -> Self {
        Self {
            team,
            position: 0,
            played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
            win_rate_milli: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TieStatus {
    /// The criteria chain separated the group without intervention.
    AutoResolved,
    /// All criteria exhausted; waiting for an administrator.
    NeedsManualResolution,
    /// Separated by a stored administrator ordering.
    ManuallyResolved,
}

/// Teams indistinguishable on the primary ranking scalar, with the final
/// disposition the criteria chain reached for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TieGroup {
    pub position: u32,
    pub teams: Vec<TeamId>,
    pub status: TieStatus,
}

impl TieGroup {
    pub fn is_unresolved(&self) -> bool {
        self.status == TieStatus::NeedsManualResolution
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StandingSnapshot {
    pub block: String,
    pub phase: Phase,
    pub rows: Vec<StandingRow>,
    pub tie_groups: Vec<TieGroup>,
    pub generated_at: DateTime<Utc>,
}

impl StandingSnapshot {
    pub fn empty(block: impl Into<String>, phase: Phase) -> Self {
        Self {
            block: block.into(),
            phase,
            rows: Vec::new(),
            tie_groups: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    pub fn rows_at(&self, position: u32) -> impl Iterator<Item = &StandingRow> {
        self.rows.iter().filter(move |r| r.position == position)
    }

    /// The single team at `position`, or `None` while the position is
    /// vacant or occupied by an unresolved tie group.
    pub fn team_at(&self, position: u32) -> Option<TeamId> {
        let mut it = self.rows_at(position);
        let first = it.next()?;
        if it.next().is_some() {
            return None;
        }
        Some(first.team)
    }

    pub fn unresolved_group_at(&self, position: u32) -> Option<&TieGroup> {
        self.tie_groups.iter().find(|g| g.position == position && g.is_unresolved())
    }
}

/// Administrator-supplied total order over one tie group's members,
/// keyed by block and tied position. Authoritative configuration; survives
/// recomputation and is consulted as a scoped criterion by the tie-breaking
/// engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ManualOrdering {
    pub block: String,
    pub position: u32,
    pub order: Vec<TeamId>,
}

impl ManualOrdering {
    /// True when this ordering covers exactly the given team set.
    pub fn covers(&self, teams: &[TeamId]) -> bool {
        if self.order.len() != teams.len() {
            return false;
        }
        teams.iter().all(|t| self.order.contains(t))
    }
}
