//! Bracket dependency index.
//!
//! The dependency graph over match slots is never persisted. Each
//! resolution pass rebuilds it by scanning every match's *effective*
//! source - the override's replacement when one exists, the template
//! source otherwise - so template edits and override mutations can never
//! leave a stale cached graph behind. BTreeMap keys give every walk a
//! deterministic order.

use std::collections::BTreeMap;

use crate::models::{Match, Outcome, SlotId, Source};
use crate::store::TournamentState;

/// Canonical key for "what a slot is waiting on".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SourceKey {
    BlockPosition { block: String, position: u32 },
    MatchWinner(String),
    MatchLoser(String),
}

impl SourceKey {
    pub fn of(source: &Source) -> SourceKey {
        match source {
            Source::BlockPosition { block, position } => {
                SourceKey::BlockPosition { block: block.clone(), position: *position }
            }
            Source::MatchOutcome { code, outcome } => match outcome {
                Outcome::Winner => SourceKey::MatchWinner(code.clone()),
                Outcome::Loser => SourceKey::MatchLoser(code.clone()),
            },
        }
    }
}

/// The override's replacement source when one names this slot, else the
/// template source. Consulted before default resolution for every slot.
pub fn effective_source<'a>(
    state: &'a TournamentState,
    m: &'a Match,
    slot: SlotId,
) -> Option<&'a Source> {
    if let Some(ov) = state.override_for(&m.code) {
        if let Some(replacement) = ov.source_for(slot) {
            return Some(replacement);
        }
    }
    m.slot(slot).source.as_ref()
}

/// Map from source key to the slots depending on it, built once per
/// resolution pass.
#[derive(Debug, Default)]
pub struct SourceIndex {
    deps: BTreeMap<SourceKey, Vec<(String, SlotId)>>,
}

impl SourceIndex {
    pub fn build(state: &TournamentState) -> Self {
        let mut deps: BTreeMap<SourceKey, Vec<(String, SlotId)>> = BTreeMap::new();
        for m in &state.matches {
            for slot in [SlotId::Slot1, SlotId::Slot2] {
                if let Some(source) = effective_source(state, m, slot) {
                    deps.entry(SourceKey::of(source)).or_default().push((m.code.clone(), slot));
                }
            }
        }
        Self { deps }
    }

    pub fn dependents(&self, key: &SourceKey) -> &[(String, SlotId)] {
        self.deps.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All slots waiting on any position of `block`.
    pub fn block_dependents(&self, block: &str) -> Vec<(String, SlotId)> {
        self.deps
            .iter()
            .filter(|(key, _)| matches!(key, SourceKey::BlockPosition { block: b, .. } if b == block))
            .flat_map(|(_, slots)| slots.iter().cloned())
            .collect()
    }

    /// Slots waiting on either outcome of `code`.
    pub fn outcome_dependents(&self, code: &str) -> Vec<(String, SlotId)> {
        let mut out = self.dependents(&SourceKey::MatchWinner(code.to_string())).to_vec();
        out.extend(self.dependents(&SourceKey::MatchLoser(code.to_string())).iter().cloned());
        out
    }
}

/// True when following effective match-outcome sources upstream from
/// `from` ever reaches `target`. Used to reject overrides that would
/// introduce a cycle.
pub fn reaches(state: &TournamentState, from: &str, target: &str) -> bool {
    let mut stack = vec![from.to_string()];
    let mut seen = std::collections::BTreeSet::new();

    while let Some(code) = stack.pop() {
        if code == target {
            return true;
        }
        if !seen.insert(code.clone()) {
            continue;
        }
        let m = match state.match_by_code(&code) {
            Some(m) => m,
            None => continue,
        };
        for slot in [SlotId::Slot1, SlotId::Slot2] {
            if let Some(Source::MatchOutcome { code: upstream, .. }) =
                effective_source(state, m, slot)
            {
                stack.push(upstream.clone());
            }
        }
    }
    false
}
