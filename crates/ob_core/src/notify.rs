//! Notification collaborator.
//!
//! Fire-and-forget events for states that need an administrator's eye: a
//! tie group the criteria chain could not separate, and a bracket slot
//! whose upstream outcome exists but cannot be used (terminal draw). The
//! engine never consumes a response.

use std::sync::Mutex;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::{SlotId, Source, TeamId, TournamentId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TieEscalation {
    pub tournament: TournamentId,
    pub block: String,
    pub position: u32,
    pub teams: Vec<TeamId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UnresolvedAdvisory {
    pub tournament: TournamentId,
    pub match_code: String,
    pub slot: SlotId,
    pub source: Source,
    pub reason: String,
}

pub trait NotificationSink: Send + Sync {
    fn tie_escalated(&self, event: &TieEscalation);
    fn dependency_unresolved(&self, advisory: &UnresolvedAdvisory);
}

/// Routes events to the log facade. The default sink for embedders that
/// wire notifications up elsewhere.
#[derive(Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn tie_escalated(&self, event: &TieEscalation) {
        log::warn!(
            "tie needs manual resolution: tournament {} block {} position {} ({} teams)",
            event.tournament,
            event.block,
            event.position,
            event.teams.len()
        );
    }

    fn dependency_unresolved(&self, advisory: &UnresolvedAdvisory) {
        log::info!(
            "slot unresolved: tournament {} match {} {:?} waiting on {} ({})",
            advisory.tournament,
            advisory.match_code,
            advisory.slot,
            advisory.source.describe(),
            advisory.reason
        );
    }
}

/// Collects events in memory. Test support.
#[derive(Debug, Default)]
pub struct CollectSink {
    pub escalations: Mutex<Vec<TieEscalation>>,
    pub advisories: Mutex<Vec<UnresolvedAdvisory>>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn escalation_count(&self) -> usize {
        self.escalations.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn advisory_count(&self) -> usize {
        self.advisories.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn take_escalations(&self) -> Vec<TieEscalation> {
        std::mem::take(&mut *self.escalations.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

impl NotificationSink for CollectSink {
    fn tie_escalated(&self, event: &TieEscalation) {
        self.escalations.lock().unwrap_or_else(|e| e.into_inner()).push(event.clone());
    }

    fn dependency_unresolved(&self, advisory: &UnresolvedAdvisory) {
        self.advisories.lock().unwrap_or_else(|e| e.into_inner()).push(advisory.clone());
    }
}
