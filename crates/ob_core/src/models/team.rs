use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TeamId = Uuid;
pub type TournamentId = Uuid;

/// Immutable team reference data. Owned externally; the engine never
/// mutates teams, it only resolves slots to their ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub abbreviation: String,
}

impl Team {
    pub fn new(name: impl Into<String>, abbreviation: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), name: name.into(), abbreviation: abbreviation.into() }
    }
}
