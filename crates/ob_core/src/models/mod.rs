pub mod block;
pub mod fixture;
pub mod overrides;
pub mod rules;
pub mod standing;
pub mod team;
pub mod tournament;

pub use block::{Block, Phase};
pub use fixture::{ConfirmedResult, Match, MatchSlot, Outcome, SlotId, Source};
pub use overrides::SlotOverride;
pub use rules::{
    PeriodClass, PointValues, RankCriterion, RankingMethod, RuleChain, ScoringPeriod, SportRuleSet,
};
pub use standing::{ManualOrdering, StandingRow, StandingSnapshot, TieGroup, TieStatus};
pub use team::{Team, TeamId, TournamentId};
pub use tournament::Tournament;
