//! # ob_core - Tournament Progression & Standings Engine
//!
//! This library computes per-block rankings from confirmed match results
//! under sport-specific rules, detects and escalates unresolved ties, and
//! propagates resolved team identities through the bracket's symbolic slot
//! dependencies, including administrator overrides and re-propagation when
//! upstream results change.
//!
//! ## Features
//! - Sport rule sets and tie-break criteria chains as data, not code paths
//! - Wholesale standings regeneration with atomic snapshot swap
//! - Idempotent bracket propagation over an on-demand dependency index
//! - Per-tournament trigger serialization; tournaments never block each other
//! - JSON API for easy integration with request handlers

// Rule-chain and bracket configuration surfaces keep many variants around
#![allow(clippy::large_enum_variant)]
// Struct initialization pattern used intentionally
#![allow(clippy::field_reassign_with_default)]

pub mod api;
pub mod data;
pub mod engine;
pub mod error;
pub mod models;
pub mod notify;
pub mod save;
pub mod store;

// Re-export main API functions
pub use api::{
    bracket_json, clear_override_json, confirm_result_json, draw_lottery_json, resolve_tie_json,
    set_override_json, standings_json, API_SCHEMA_VERSION,
};
pub use error::{EngineError, Result};

// Re-export the engine facade and trigger types
pub use engine::{Engine, RecomputeReport, SlotWrite, Trigger};

// Re-export core model types
pub use models::{
    Block, ConfirmedResult, ManualOrdering, Match, MatchSlot, Outcome, Phase, RankCriterion,
    RankingMethod, RuleChain, SlotId, SlotOverride, Source, SportRuleSet, StandingRow,
    StandingSnapshot, Team, TeamId, TieGroup, TieStatus, Tournament, TournamentId,
};

// Re-export collaborator seams
pub use notify::{CollectSink, LogSink, NotificationSink, TieEscalation, UnresolvedAdvisory};
pub use store::{MemoryStore, StoreError, TournamentState, TournamentStore};

// Re-export export format
pub use save::{ExportError, TournamentExport};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;
