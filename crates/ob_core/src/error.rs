use crate::store::StoreError;
use std::fmt;

#[derive(Debug)]
pub enum EngineError {
    UnknownTournament(String),
    UnknownSport(String),
    UnknownBlock(String),
    UnknownMatch(String),
    UnknownTeam(String),
    MatchNotResolved(String),
    InvalidRuleChain(String),
    InvalidOverride(String),
    InvalidOrdering(String),
    ValidationError(String),
    SerializationError(String),
    DeserializationError(String),
    Store(StoreError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EngineError::UnknownTournament(id) => {
                write!(f, "Unknown tournament: {}", id)
            }
            EngineError::UnknownSport(code) => {
                write!(f, "Unknown sport code: {}", code)
            }
            EngineError::UnknownBlock(label) => {
                write!(f, "Unknown block: {}", label)
            }
            EngineError::UnknownMatch(code) => {
                write!(f, "Unknown match: {}", code)
            }
            EngineError::UnknownTeam(id) => {
                write!(f, "Unknown team: {}", id)
            }
            EngineError::MatchNotResolved(code) => {
                write!(f, "Match {} has unresolved slots and cannot take a result", code)
            }
            EngineError::InvalidRuleChain(msg) => {
                write!(f, "Invalid rule chain: {}", msg)
            }
            EngineError::InvalidOverride(msg) => {
                write!(f, "Invalid override: {}", msg)
            }
            EngineError::InvalidOrdering(msg) => {
                write!(f, "Invalid manual ordering: {}", msg)
            }
            EngineError::ValidationError(msg) => {
                write!(f, "Validation error: {}", msg)
            }
            EngineError::SerializationError(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            EngineError::DeserializationError(msg) => {
                write!(f, "Deserialization error: {}", msg)
            }
            EngineError::Store(err) => {
                write!(f, "Store error: {}", err)
            }
        }
    }
}

impl std::error::Error for EngineError {}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        EngineError::Store(err)
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() {
            EngineError::DeserializationError(err.to_string())
        } else {
            EngineError::SerializationError(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
