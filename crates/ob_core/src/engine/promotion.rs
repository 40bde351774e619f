//! Promotion resolver.
//!
//! Takes trigger events - standings changed, match confirmed, override
//! mutated - and pushes resolved team identities through the bracket's
//! slot dependencies. Each pass rebuilds the source index, evaluates every
//! affected slot exactly once, and repeats for slots downstream of matches
//! that changed, until nothing changes. Resolution is a pure function of
//! upstream state, which makes re-running a pass with no new information a
//! no-op.
//!
//! The resolver prefers "unresolved" over "guessed": an unresolved tie at
//! a block position or an upstream terminal draw leaves the slot pending.
//! A slot whose resolved team changes under a confirmed match clears that
//! confirmation - a result must never stay attached to an opponent pairing
//! that no longer holds - and the clearing cascades downstream.

use std::collections::{BTreeMap, BTreeSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::engine::graph::{effective_source, SourceIndex};
use crate::models::{Outcome, SlotId, Source, TeamId};
use crate::notify::UnresolvedAdvisory;
use crate::store::TournamentState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    BlockStandingsChanged { block: String },
    MatchConfirmed { code: String },
    OverrideChanged { code: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SlotWrite {
    pub match_code: String,
    pub slot: SlotId,
    pub team: Option<TeamId>,
}

#[derive(Debug, Clone, Default)]
pub struct PromotionOutcome {
    pub slot_writes: Vec<SlotWrite>,
    pub cleared_results: Vec<String>,
    pub advisories: Vec<UnresolvedAdvisory>,
}

/// Resolve one symbolic source against current state.
///
/// Returns the concrete team when the source is decided, plus an advisory
/// reason for the one waiting state an administrator must act on (upstream
/// terminal draw). Everything else - unplayed match, unresolved tie,
/// vacant position - is ordinary waiting.
fn resolve_source(state: &TournamentState, source: &Source) -> (Option<TeamId>, Option<String>) {
    match source {
        Source::BlockPosition { block, position } => {
            let snapshot = match state.block(block).and_then(|b| b.standings.as_ref()) {
                Some(snapshot) => snapshot,
                None => return (None, None),
            };
            (snapshot.team_at(*position), None)
        }
        Source::MatchOutcome { code, outcome } => {
            let m = match state.match_by_code(code) {
                Some(m) => m,
                None => return (None, None),
            };
            let result = match &m.result {
                Some(result) => result,
                None => return (None, None),
            };
            match result.winner {
                None => (None, Some(format!("terminal draw in {}", code))),
                Some(winner) => match outcome {
                    Outcome::Winner => (Some(winner), None),
                    Outcome::Loser => (m.loser(), None),
                },
            }
        }
    }
}

/// Run slot resolution for a set of triggers. Mutates `state` in place and
/// reports every write it made.
pub fn propagate(state: &mut TournamentState, triggers: &[Trigger]) -> PromotionOutcome {
    let tournament = state.tournament.id;
    let index = SourceIndex::build(state);

    let mut pending: BTreeSet<(String, SlotId)> = BTreeSet::new();
    for trigger in triggers {
        match trigger {
            Trigger::BlockStandingsChanged { block } => {
                pending.extend(index.block_dependents(block));
            }
            Trigger::MatchConfirmed { code } => {
                pending.extend(index.outcome_dependents(code));
            }
            Trigger::OverrideChanged { code } => {
                // The overridden match's own slots changed meaning.
                if let Some(m) = state.match_by_code(code) {
                    for slot in [SlotId::Slot1, SlotId::Slot2] {
                        if effective_source(state, m, slot).is_some() {
                            pending.insert((code.clone(), slot));
                        }
                    }
                }
            }
        }
    }

    let mut outcome = PromotionOutcome::default();
    let mut advisories: BTreeMap<(String, SlotId), UnresolvedAdvisory> = BTreeMap::new();

    // Bounded: a pass only re-enqueues downstream of matches that changed,
    // and the slot graph is a DAG, so this settles within match-count passes.
    let max_passes = state.matches.len() + 1;
    let mut passes = 0usize;
    while !pending.is_empty() && passes < max_passes {
        passes += 1;
        let mut changed_matches: BTreeSet<String> = BTreeSet::new();

        for (code, slot) in std::mem::take(&mut pending) {
            let (source, current) = {
                let m = match state.match_by_code(&code) {
                    Some(m) => m,
                    None => continue,
                };
                let source = match effective_source(state, m, slot) {
                    Some(source) => source.clone(),
                    None => continue,
                };
                (source, m.slot(slot).team)
            };

            let (team, advisory_reason) = resolve_source(state, &source);
            if let Some(reason) = advisory_reason {
                advisories.insert(
                    (code.clone(), slot),
                    UnresolvedAdvisory {
                        tournament,
                        match_code: code.clone(),
                        slot,
                        source: source.clone(),
                        reason,
                    },
                );
            }

            if current == team {
                continue;
            }

            let m = state.match_mut(&code).expect("present above");
            m.slot_mut(slot).team = team;
            log::debug!(
                "slot update: {} {:?} <- {:?} (source {})",
                code,
                slot,
                team,
                source.describe()
            );
            outcome.slot_writes.push(SlotWrite { match_code: code.clone(), slot, team });

            if m.result.is_some() {
                m.result = None;
                outcome.cleared_results.push(code.clone());
                log::debug!("cleared confirmed result of {}: opponent changed", code);
            }

            changed_matches.insert(code);
        }

        for code in changed_matches {
            pending.extend(index.outcome_dependents(&code));
        }
    }

    outcome.advisories = advisories.into_values().collect();
    outcome
}
