use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::fixture::{SlotId, Source};

/// Administrator-specified replacement for a match's declared slot sources.
///
/// Authoritative configuration: it survives standings recomputation and is
/// consulted before the bracket template's own sources on every resolution
/// pass. Slots left at `None` keep the template source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SlotOverride {
    pub match_code: String,
    #[serde(default)]
    pub slot1: Option<Source>,
    #[serde(default)]
    pub slot2: Option<Source>,
    /// Free-text justification, required at the mutation boundary.
    pub reason: String,
}

impl SlotOverride {
    pub fn source_for(&self, slot: SlotId) -> Option<&Source> {
        match slot {
            SlotId::Slot1 => self.slot1.as_ref(),
            SlotId::Slot2 => self.slot2.as_ref(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.match_code.is_empty() {
            return Err("override must name a match".to_string());
        }
        if self.slot1.is_none() && self.slot2.is_none() {
            return Err(format!("override for {} replaces neither slot", self.match_code));
        }
        if self.reason.trim().is_empty() {
            return Err(format!("override for {} requires a justification", self.match_code));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixture::Outcome;

    #[test]
    fn empty_override_rejected() {
        let ov = SlotOverride {
            match_code: "M9".to_string(),
            slot1: None,
            slot2: None,
            reason: "schedule conflict".to_string(),
        };
        assert!(ov.validate().is_err());
    }

    #[test]
    fn justification_required() {
        let ov = SlotOverride {
            match_code: "M9".to_string(),
            slot1: Some(Source::BlockPosition { block: "C".to_string(), position: 2 }),
            slot2: None,
            reason: "  ".to_string(),
        };
        assert!(ov.validate().is_err());
    }

    #[test]
    fn slot_lookup() {
        let replacement = Source::MatchOutcome { code: "M3".to_string(), outcome: Outcome::Loser };
        let ov = SlotOverride {
            match_code: "M9".to_string(),
            slot1: None,
            slot2: Some(replacement.clone()),
            reason: "bracket repair".to_string(),
        };
        assert_eq!(ov.source_for(SlotId::Slot1), None);
        assert_eq!(ov.source_for(SlotId::Slot2), Some(&replacement));
    }
}
