//! Match, slot and source types.
//!
//! A match has two slots. Each slot either was seeded with a concrete team
//! (preliminary round-robin fixtures) or declares a symbolic source that the
//! promotion resolver fills in once the source can be determined. The
//! declared source is retained after resolution so that a later override or
//! standings change can re-derive the slot from scratch.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::team::TeamId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Winner,
    Loser,
}

/// Symbolic slot reference: a block position ("A,2") or the outcome of a
/// prior match ("winner of M16").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Source {
    BlockPosition { block: String, position: u32 },
    MatchOutcome { code: String, outcome: Outcome },
}

impl Source {
    pub fn describe(&self) -> String {
        match self {
            Source::BlockPosition { block, position } => format!("{},{}", block, position),
            Source::MatchOutcome { code, outcome } => match outcome {
                Outcome::Winner => format!("winner of {}", code),
                Outcome::Loser => format!("loser of {}", code),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SlotId {
    Slot1,
    Slot2,
}

impl SlotId {
    pub fn other(self) -> SlotId {
        match self {
            SlotId::Slot1 => SlotId::Slot2,
            SlotId::Slot2 => SlotId::Slot1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MatchSlot {
    /// Declared source; `None` for concrete-seeded slots.
    #[serde(default)]
    pub source: Option<Source>,
    /// Resolved team, once known.
    #[serde(default)]
    pub team: Option<TeamId>,
}

impl MatchSlot {
    pub fn concrete(team: TeamId) -> Self {
        Self { source: None, team: Some(team) }
    }

    pub fn pending(source: Source) -> Self {
        Self { source: Some(source), team: None }
    }
}

/// Confirmed result of a played match.
///
/// Regulation scores drive standings; the shootout pair, when present, only
/// decides the winner and the display string. `winner` is `None` exactly
/// when `draw` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConfirmedResult {
    /// Raw per-period score strings as recorded, one value per period played.
    pub periods1: String,
    pub periods2: String,
    pub regulation1: u32,
    pub regulation2: u32,
    #[serde(default)]
    pub shootout: Option<(u32, u32)>,
    pub draw: bool,
    #[serde(default)]
    pub winner: Option<TeamId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Match {
    pub code: String,
    pub block: String,
    pub slot1: MatchSlot,
    pub slot2: MatchSlot,
    #[serde(default)]
    pub result: Option<ConfirmedResult>,
}

impl Match {
    pub fn new(code: impl Into<String>, block: impl Into<String>, slot1: MatchSlot, slot2: MatchSlot) -> Self {
        Self { code: code.into(), block: block.into(), slot1, slot2, result: None }
    }

    pub fn slot(&self, id: SlotId) -> &MatchSlot {
        match id {
            SlotId::Slot1 => &self.slot1,
            SlotId::Slot2 => &self.slot2,
        }
    }

    pub fn slot_mut(&mut self, id: SlotId) -> &mut MatchSlot {
        match id {
            SlotId::Slot1 => &mut self.slot1,
            SlotId::Slot2 => &mut self.slot2,
        }
    }

    /// Both slots hold concrete teams. Independent of confirmation.
    pub fn is_resolved(&self) -> bool {
        self.slot1.team.is_some() && self.slot2.team.is_some()
    }

    pub fn is_confirmed(&self) -> bool {
        self.result.is_some()
    }

    pub fn teams(&self) -> Option<(TeamId, TeamId)> {
        match (self.slot1.team, self.slot2.team) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }

    pub fn involves(&self, team: &TeamId) -> bool {
        self.slot1.team.as_ref() == Some(team) || self.slot2.team.as_ref() == Some(team)
    }

    pub fn opponent_of(&self, team: &TeamId) -> Option<TeamId> {
        let (a, b) = self.teams()?;
        if a == *team {
            Some(b)
        } else if b == *team {
            Some(a)
        } else {
            None
        }
    }

    /// Loser of a confirmed, decided match.
    pub fn loser(&self) -> Option<TeamId> {
        let winner = self.result.as_ref()?.winner?;
        self.opponent_of(&winner)
    }
}
