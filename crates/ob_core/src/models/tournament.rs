use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::block::Phase;
use super::rules::RuleChain;
use super::team::TournamentId;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    /// Sport code resolved against the shipped rule catalog.
    pub sport: String,
    pub preliminary_chain: RuleChain,
    pub final_chain: RuleChain,
}

impl Tournament {
    pub fn new(
        name: impl Into<String>,
        sport: impl Into<String>,
        preliminary_chain: RuleChain,
        final_chain: RuleChain,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            sport: sport.into(),
            preliminary_chain,
            final_chain,
        }
    }

    pub fn chain_for(&self, phase: Phase) -> &RuleChain {
        match phase {
            Phase::Preliminary => &self.preliminary_chain,
            Phase::Final => &self.final_chain,
        }
    }
}
