//! Persistence collaborator.
//!
//! The engine reads a tournament's full state at the start of each trigger,
//! computes in memory, and writes the new state back as one unit. Stores
//! only need "load current, save new" semantics; the atomic swap is what
//! keeps a crash mid-propagation from leaving a partially-resolved bracket
//! behind. The engine never retries a failed store call - recomputation is
//! idempotent, so the caller decides.

use std::collections::HashMap;
use std::sync::RwLock;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    Block, ManualOrdering, Match, SlotOverride, Team, TeamId, Tournament, TournamentId,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Tournament not found: {0}")]
    TournamentNotFound(TournamentId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Full materialized state of one tournament.
///
/// This is the unit the engine loads, transforms and saves. Matches and
/// blocks carry the derived data (snapshots, resolved slots); overrides and
/// manual orderings are authoritative configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TournamentState {
    pub tournament: Tournament,
    pub teams: Vec<Team>,
    pub blocks: Vec<Block>,
    pub matches: Vec<Match>,
    #[serde(default)]
    pub overrides: Vec<SlotOverride>,
    #[serde(default)]
    pub orderings: Vec<ManualOrdering>,
}

impl TournamentState {
    pub fn block(&self, label: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.label == label)
    }

    pub fn block_mut(&mut self, label: &str) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.label == label)
    }

    pub fn match_by_code(&self, code: &str) -> Option<&Match> {
        self.matches.iter().find(|m| m.code == code)
    }

    pub fn match_mut(&mut self, code: &str) -> Option<&mut Match> {
        self.matches.iter_mut().find(|m| m.code == code)
    }

    pub fn team(&self, id: &TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == *id)
    }

    pub fn override_for(&self, code: &str) -> Option<&SlotOverride> {
        self.overrides.iter().find(|o| o.match_code == code)
    }

    pub fn matches_in_block<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a Match> + 'a {
        self.matches.iter().filter(move |m| m.block == label)
    }

    pub fn ordering_for(&self, block: &str, teams: &[TeamId]) -> Option<&ManualOrdering> {
        self.orderings.iter().find(|o| o.block == block && o.covers(teams))
    }
}

pub trait TournamentStore: Send + Sync {
    fn load(&self, id: &TournamentId) -> Result<TournamentState, StoreError>;
    fn save(&self, state: TournamentState) -> Result<(), StoreError>;
}

/// In-memory store backing tests and the CLI. The whole-state swap in
/// `save` is the atomicity contract: readers either see the previous state
/// or the complete new one.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<TournamentId, TournamentState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, state: TournamentState) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.insert(state.tournament.id, state);
    }

    pub fn get(&self, id: &TournamentId) -> Option<TournamentState> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.get(id).cloned()
    }

    pub fn tournament_ids(&self) -> Vec<TournamentId> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.keys().copied().collect()
    }
}

impl TournamentStore for MemoryStore {
    fn load(&self, id: &TournamentId) -> Result<TournamentState, StoreError> {
        self.get(id).ok_or(StoreError::TournamentNotFound(*id))
    }

    fn save(&self, state: TournamentState) -> Result<(), StoreError> {
        self.insert(state);
        Ok(())
    }
}
