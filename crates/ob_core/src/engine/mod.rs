//! Tournament progression engine.
//!
//! The submodules are the pipeline stages; `Engine` is the synchronous
//! facade request handlers call. Every mutating operation runs as one
//! logical unit under the tournament's lock: load current state, recompute
//! the affected standings wholesale, propagate through the bracket, then
//! save the whole new state in one atomic swap.

pub mod coordinator;
pub mod graph;
pub mod lottery;
pub mod promotion;
pub mod score;
pub mod standings;
pub mod tiebreak;


#[cfg(test)]
mod prop_tests;

pub use promotion::{PromotionOutcome, SlotWrite, Trigger};
pub use score::{analyze, build_confirmed, display_score, ScoreBreakdown};
pub use tiebreak::RankOutcome;

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::data;
use crate::error::{EngineError, Result};
use crate::models::{
    ManualOrdering, Match, Phase, SlotId, SlotOverride, Source, SportRuleSet, StandingSnapshot,
    TeamId, TournamentId,
};
use crate::notify::{NotificationSink, TieEscalation, UnresolvedAdvisory};
use crate::store::{TournamentState, TournamentStore};

/// Everything one trigger changed, for the caller's benefit. The saved
/// state is the source of truth; this is reporting.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RecomputeReport {
    pub recomputed_blocks: Vec<String>,
    pub slot_writes: Vec<SlotWrite>,
    pub cleared_results: Vec<String>,
    pub tie_escalations: Vec<TieEscalation>,
    pub advisories: Vec<UnresolvedAdvisory>,
}

pub struct Engine<S: TournamentStore, N: NotificationSink> {
    store: S,
    sink: N,
}

impl<S: TournamentStore, N: NotificationSink> Engine<S, N> {
    pub fn new(store: S, sink: N) -> Self {
        Self { store, sink }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sink(&self) -> &N {
        &self.sink
    }

    fn sport_rules(state: &TournamentState) -> Result<&'static SportRuleSet> {
        data::get_sport_rules(&state.tournament.sport)
            .ok_or_else(|| EngineError::UnknownSport(state.tournament.sport.clone()))
    }

    /// Validate and store a new tournament, computing initial standings
    /// and resolving whatever the bracket template already can.
    pub fn register(&self, mut state: TournamentState) -> Result<RecomputeReport> {
        let rules = Self::sport_rules(&state)?;
        validate_state(&state, rules)?;

        let lock = coordinator::tournament_lock(&state.tournament.id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let blocks: Vec<String> = state.blocks.iter().map(|b| b.label.clone()).collect();
        let mut triggers: Vec<Trigger> =
            blocks.iter().map(|b| Trigger::BlockStandingsChanged { block: b.clone() }).collect();
        triggers.extend(
            state
                .matches
                .iter()
                .filter(|m| m.is_confirmed())
                .map(|m| Trigger::MatchConfirmed { code: m.code.clone() }),
        );

        self.run(&mut state, blocks, triggers)
    }

    /// Record a confirmed result for a resolved match, then recompute the
    /// block standings and re-propagate.
    pub fn confirm_result(
        &self,
        id: &TournamentId,
        code: &str,
        periods1: &str,
        periods2: &str,
    ) -> Result<RecomputeReport> {
        let lock = coordinator::tournament_lock(id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut state = self.store.load(id)?;
        let rules = Self::sport_rules(&state)?;

        let (team1, team2, block) = {
            let m = state
                .match_by_code(code)
                .ok_or_else(|| EngineError::UnknownMatch(code.to_string()))?;
            let (team1, team2) =
                m.teams().ok_or_else(|| EngineError::MatchNotResolved(code.to_string()))?;
            (team1, team2, m.block.clone())
        };

        let result = score::build_confirmed(periods1, periods2, team1, team2, rules);
        state.match_mut(code).expect("checked above").result = Some(result);

        self.run(
            &mut state,
            vec![block.clone()],
            vec![
                Trigger::BlockStandingsChanged { block },
                Trigger::MatchConfirmed { code: code.to_string() },
            ],
        )
    }

    /// Create or replace the override for a match. The mutation is itself
    /// a trigger: the match's slots are re-resolved against the new
    /// sources, and a confirmed result against the old opponents is
    /// invalidated downstream.
    pub fn set_override(&self, id: &TournamentId, ov: SlotOverride) -> Result<RecomputeReport> {
        let lock = coordinator::tournament_lock(id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut state = self.store.load(id)?;
        ov.validate().map_err(EngineError::InvalidOverride)?;
        let code = ov.match_code.clone();
        if state.match_by_code(&code).is_none() {
            return Err(EngineError::UnknownMatch(code));
        }

        for source in [&ov.slot1, &ov.slot2].into_iter().flatten() {
            validate_source(&state, source).map_err(EngineError::InvalidOverride)?;
            if let Source::MatchOutcome { code: upstream, .. } = source {
                if graph::reaches(&state, upstream, &code) {
                    return Err(EngineError::InvalidOverride(format!(
                        "source {} would create a cycle through {}",
                        source.describe(),
                        code
                    )));
                }
            }
        }

        state.overrides.retain(|o| o.match_code != code);
        state.overrides.push(ov);

        self.run(&mut state, Vec::new(), vec![Trigger::OverrideChanged { code }])
    }

    /// Delete a match's override, restoring the template sources. Also a
    /// trigger.
    pub fn clear_override(&self, id: &TournamentId, code: &str) -> Result<RecomputeReport> {
        let lock = coordinator::tournament_lock(id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut state = self.store.load(id)?;
        if state.override_for(code).is_none() {
            return Err(EngineError::InvalidOverride(format!("no override for {}", code)));
        }
        state.overrides.retain(|o| o.match_code != code);

        self.run(&mut state, Vec::new(), vec![Trigger::OverrideChanged { code: code.to_string() }])
    }

    /// Accept an administrator's total order for an unresolved tie group
    /// and recompute with it injected.
    pub fn resolve_tie(&self, id: &TournamentId, ordering: ManualOrdering) -> Result<RecomputeReport> {
        let lock = coordinator::tournament_lock(id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut state = self.store.load(id)?;
        let block = state
            .block(&ordering.block)
            .ok_or_else(|| EngineError::UnknownBlock(ordering.block.clone()))?;
        let snapshot = block.standings.as_ref().ok_or_else(|| {
            EngineError::InvalidOrdering(format!("block {} has no standings yet", ordering.block))
        })?;
        let group = snapshot.unresolved_group_at(ordering.position).ok_or_else(|| {
            EngineError::InvalidOrdering(format!(
                "no unresolved tie at position {} of block {}",
                ordering.position, ordering.block
            ))
        })?;
        if !ordering.covers(&group.teams) {
            return Err(EngineError::InvalidOrdering(
                "ordering must cover exactly the tied teams".to_string(),
            ));
        }

        let label = ordering.block.clone();
        let members = ordering.order.clone();
        state.orderings.retain(|o| !(o.block == label && o.covers(&members)));
        state.orderings.push(ordering);

        self.run(
            &mut state,
            vec![label.clone()],
            vec![Trigger::BlockStandingsChanged { block: label }],
        )
    }

    /// Replace a block's member list. Invalidates the cached standings and
    /// recomputes from scratch.
    pub fn assign_block_teams(
        &self,
        id: &TournamentId,
        label: &str,
        teams: Vec<TeamId>,
    ) -> Result<RecomputeReport> {
        let lock = coordinator::tournament_lock(id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut state = self.store.load(id)?;
        for team in &teams {
            if state.team(team).is_none() {
                return Err(EngineError::UnknownTeam(team.to_string()));
            }
        }
        let block = state
            .block_mut(label)
            .ok_or_else(|| EngineError::UnknownBlock(label.to_string()))?;
        block.assign_teams(teams);
        block.validate().map_err(EngineError::ValidationError)?;

        self.run(
            &mut state,
            vec![label.to_string()],
            vec![Trigger::BlockStandingsChanged { block: label.to_string() }],
        )
    }

    /// Current standings snapshot for a block, computing it first if the
    /// block has none yet.
    pub fn standings(&self, id: &TournamentId, label: &str) -> Result<StandingSnapshot> {
        let lock = coordinator::tournament_lock(id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut state = self.store.load(id)?;
        let block = state
            .block(label)
            .ok_or_else(|| EngineError::UnknownBlock(label.to_string()))?;

        if let Some(snapshot) = &block.standings {
            return Ok(snapshot.clone());
        }

        self.run(
            &mut state,
            vec![label.to_string()],
            vec![Trigger::BlockStandingsChanged { block: label.to_string() }],
        )?;
        state
            .block(label)
            .and_then(|b| b.standings.clone())
            .ok_or_else(|| EngineError::UnknownBlock(label.to_string()))
    }

    /// All final-phase matches with their current resolution state.
    pub fn bracket(&self, id: &TournamentId) -> Result<Vec<Match>> {
        let state = self.store.load(id)?;
        Ok(state
            .matches
            .iter()
            .filter(|m| {
                state.block(&m.block).map(|b| b.phase == Phase::Final).unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    /// Deterministic lottery proposal for an unresolved tie group. Read
    /// only; the administrator feeds the result back via `resolve_tie`.
    pub fn propose_lottery(
        &self,
        id: &TournamentId,
        label: &str,
        position: u32,
        seed: u64,
    ) -> Result<ManualOrdering> {
        let state = self.store.load(id)?;
        let block = state
            .block(label)
            .ok_or_else(|| EngineError::UnknownBlock(label.to_string()))?;
        let snapshot = block.standings.as_ref().ok_or_else(|| {
            EngineError::InvalidOrdering(format!("block {} has no standings yet", label))
        })?;
        let group = snapshot.unresolved_group_at(position).ok_or_else(|| {
            EngineError::InvalidOrdering(format!(
                "no unresolved tie at position {} of block {}",
                position, label
            ))
        })?;
        Ok(lottery::draw_ordering(label, position, &group.teams, seed))
    }

    /// The shared recompute pipeline: regenerate the named blocks'
    /// standings wholesale, propagate the triggers, notify, save.
    fn run(
        &self,
        state: &mut TournamentState,
        blocks: Vec<String>,
        triggers: Vec<Trigger>,
    ) -> Result<RecomputeReport> {
        let rules = Self::sport_rules(state)?;
        let mut report = RecomputeReport::default();

        for label in blocks {
            let block = state
                .block(&label)
                .ok_or_else(|| EngineError::UnknownBlock(label.clone()))?
                .clone();
            let chain = state.tournament.chain_for(block.phase).clone();
            chain.validate(rules).map_err(EngineError::InvalidRuleChain)?;

            let rows = standings::aggregate_block(&block, &state.matches, rules);
            let outcome = tiebreak::rank_block(
                state.tournament.id,
                &block,
                rows,
                &chain,
                rules,
                &state.matches,
                &state.orderings,
            );

            let snapshot = StandingSnapshot {
                block: label.clone(),
                phase: block.phase,
                rows: outcome.rows,
                tie_groups: outcome.tie_groups,
                generated_at: Utc::now(),
            };
            state.block_mut(&label).expect("looked up above").standings = Some(snapshot);

            report.recomputed_blocks.push(label);
            report.tie_escalations.extend(outcome.escalations);
        }

        let promo = promotion::propagate(state, &triggers);
        report.slot_writes = promo.slot_writes;
        report.cleared_results = promo.cleared_results;
        report.advisories = promo.advisories;

        for escalation in &report.tie_escalations {
            self.sink.tie_escalated(escalation);
        }
        for advisory in &report.advisories {
            self.sink.dependency_unresolved(advisory);
        }

        self.store.save(state.clone())?;
        Ok(report)
    }
}

fn validate_source(state: &TournamentState, source: &Source) -> std::result::Result<(), String> {
    match source {
        Source::BlockPosition { block, position } => {
            let b = state.block(block).ok_or_else(|| format!("unknown block {}", block))?;
            if *position == 0 {
                return Err("positions are 1-based".to_string());
            }
            if !b.teams.is_empty() && *position as usize > b.teams.len() {
                return Err(format!("position {} out of range for block {}", position, block));
            }
            Ok(())
        }
        Source::MatchOutcome { code, .. } => {
            state.match_by_code(code).ok_or_else(|| format!("unknown match {}", code))?;
            Ok(())
        }
    }
}

/// Registration-time validation: reject configuration that would otherwise
/// surface as silent propagation dead-ends.
fn validate_state(state: &TournamentState, rules: &SportRuleSet) -> Result<()> {
    rules.validate().map_err(EngineError::ValidationError)?;
    state
        .tournament
        .preliminary_chain
        .validate(rules)
        .map_err(EngineError::InvalidRuleChain)?;
    state.tournament.final_chain.validate(rules).map_err(EngineError::InvalidRuleChain)?;

    let mut labels = std::collections::HashSet::new();
    for block in &state.blocks {
        block.validate().map_err(EngineError::ValidationError)?;
        if !labels.insert(&block.label) {
            return Err(EngineError::ValidationError(format!(
                "duplicate block label {}",
                block.label
            )));
        }
        for team in &block.teams {
            if state.team(team).is_none() {
                return Err(EngineError::UnknownTeam(team.to_string()));
            }
        }
    }

    let mut codes = std::collections::HashSet::new();
    for m in &state.matches {
        if !codes.insert(&m.code) {
            return Err(EngineError::ValidationError(format!("duplicate match code {}", m.code)));
        }
        if state.block(&m.block).is_none() {
            return Err(EngineError::UnknownBlock(m.block.clone()));
        }
        for slot in [SlotId::Slot1, SlotId::Slot2] {
            if let Some(team) = &m.slot(slot).team {
                if state.team(team).is_none() {
                    return Err(EngineError::UnknownTeam(team.to_string()));
                }
            }
            if let Some(source) = &m.slot(slot).source {
                validate_source(state, source).map_err(EngineError::ValidationError)?;
            }
        }
    }

    for ov in &state.overrides {
        ov.validate().map_err(EngineError::InvalidOverride)?;
        if state.match_by_code(&ov.match_code).is_none() {
            return Err(EngineError::UnknownMatch(ov.match_code.clone()));
        }
        for source in [&ov.slot1, &ov.slot2].into_iter().flatten() {
            validate_source(state, source).map_err(EngineError::InvalidOverride)?;
        }
    }

    for ordering in &state.orderings {
        if state.block(&ordering.block).is_none() {
            return Err(EngineError::UnknownBlock(ordering.block.clone()));
        }
    }

    Ok(())
}
