//! Sport rule sets and promotion rule chains.
//!
//! Both are configuration interpreted by the engine: a `SportRuleSet`
//! declares how scores are structured and which ranking scalar the sport
//! uses; a `RuleChain` is the ordered list of tie-break criteria a
//! tournament phase ranks by. New sports and criteria are additive data,
//! not new code paths.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PeriodClass {
    Regular,
    Extra,
    Penalty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScoringPeriod {
    pub name: String,
    pub class: PeriodClass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RankingMethod {
    Points,
    WinRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PointValues {
    pub win: i64,
    pub draw: i64,
    pub loss: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SportRuleSet {
    pub code: String,
    pub name: String,
    pub ranking: RankingMethod,
    /// Absent when the sport does not rank by match points.
    #[serde(default)]
    pub points: Option<PointValues>,
    #[serde(default)]
    pub shootout_counts_toward_regulation: bool,
    /// Ordered scoring periods. A single entry means single-value scoring.
    pub periods: Vec<ScoringPeriod>,
}

impl SportRuleSet {
    pub fn has_period_structure(&self) -> bool {
        self.periods.len() > 1
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.code.is_empty() {
            return Err("sport code must not be empty".to_string());
        }
        if self.periods.is_empty() {
            return Err(format!("sport {}: at least one scoring period required", self.code));
        }
        if self.ranking == RankingMethod::Points && self.points.is_none() {
            return Err(format!("sport {}: points-based ranking requires point values", self.code));
        }

        let penalty_count =
            self.periods.iter().filter(|p| p.class == PeriodClass::Penalty).count();
        if penalty_count > 1 {
            return Err(format!("sport {}: at most one penalty period allowed", self.code));
        }
        if penalty_count == 1 && self.periods.last().map(|p| p.class) != Some(PeriodClass::Penalty)
        {
            return Err(format!("sport {}: penalty period must come last", self.code));
        }

        Ok(())
    }
}

/// One tie-break criterion. The chain is interpreted left to right; ties at
/// one criterion fall through to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RankCriterion {
    Points,
    WinRate,
    GoalDifference,
    GoalsFor,
    GoalsAgainst,
    Wins,
    HeadToHead,
    /// Terminal: escalate to an administrator draw.
    Lottery,
    /// Terminal: escalate to an administrator decision.
    Manual,
}

impl RankCriterion {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RankCriterion::Lottery | RankCriterion::Manual)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RuleChain {
    pub criteria: Vec<RankCriterion>,
}

impl RuleChain {
    pub fn new(criteria: Vec<RankCriterion>) -> Self {
        Self { criteria }
    }

    /// Stock chain for a sport's ranking method.
    pub fn default_for(rules: &SportRuleSet) -> Self {
        let criteria = match rules.ranking {
            RankingMethod::Points => vec![
                RankCriterion::Points,
                RankCriterion::GoalDifference,
                RankCriterion::GoalsFor,
                RankCriterion::HeadToHead,
                RankCriterion::Manual,
            ],
            RankingMethod::WinRate => vec![
                RankCriterion::WinRate,
                RankCriterion::Wins,
                RankCriterion::HeadToHead,
                RankCriterion::Manual,
            ],
        };
        Self { criteria }
    }

    /// The statistical prefix of the chain, excluding a terminal
    /// `lottery`/`manual` criterion.
    pub fn statistical(&self) -> &[RankCriterion] {
        match self.criteria.last() {
            Some(c) if c.is_terminal() => &self.criteria[..self.criteria.len() - 1],
            _ => &self.criteria[..],
        }
    }

    pub fn validate(&self, rules: &SportRuleSet) -> Result<(), String> {
        if self.criteria.is_empty() {
            return Err("rule chain must not be empty".to_string());
        }

        for (idx, criterion) in self.criteria.iter().enumerate() {
            if criterion.is_terminal() && idx != self.criteria.len() - 1 {
                return Err(format!("{:?} is only allowed as the last criterion", criterion));
            }
            match criterion {
                RankCriterion::Points if rules.ranking != RankingMethod::Points => {
                    return Err(format!(
                        "criterion Points is not supported by sport {} (ranking method {:?})",
                        rules.code, rules.ranking
                    ));
                }
                RankCriterion::WinRate if rules.ranking != RankingMethod::WinRate => {
                    return Err(format!(
                        "criterion WinRate is not supported by sport {} (ranking method {:?})",
                        rules.code, rules.ranking
                    ));
                }
                _ => {}
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points_sport() -> SportRuleSet {
        SportRuleSet {
            code: "football".to_string(),
            name: "Football".to_string(),
            ranking: RankingMethod::Points,
            points: Some(PointValues { win: 3, draw: 1, loss: 0 }),
            shootout_counts_toward_regulation: false,
            periods: vec![
                ScoringPeriod { name: "first_half".to_string(), class: PeriodClass::Regular },
                ScoringPeriod { name: "second_half".to_string(), class: PeriodClass::Regular },
                ScoringPeriod { name: "shootout".to_string(), class: PeriodClass::Penalty },
            ],
        }
    }

    fn win_rate_sport() -> SportRuleSet {
        SportRuleSet {
            code: "relay".to_string(),
            name: "Relay".to_string(),
            ranking: RankingMethod::WinRate,
            points: None,
            shootout_counts_toward_regulation: false,
            periods: vec![ScoringPeriod { name: "race".to_string(), class: PeriodClass::Regular }],
        }
    }

    #[test]
    fn points_criterion_rejected_for_win_rate_sport() {
        let chain = RuleChain::new(vec![RankCriterion::Points, RankCriterion::Manual]);
        assert!(chain.validate(&win_rate_sport()).is_err());
        assert!(chain.validate(&points_sport()).is_ok());
    }

    #[test]
    fn terminal_criterion_must_be_last() {
        let chain = RuleChain::new(vec![RankCriterion::Manual, RankCriterion::GoalsFor]);
        assert!(chain.validate(&points_sport()).is_err());
    }

    #[test]
    fn statistical_prefix_strips_terminal() {
        let chain = RuleChain::default_for(&points_sport());
        assert_eq!(chain.statistical().len(), chain.criteria.len() - 1);

        let no_terminal = RuleChain::new(vec![RankCriterion::Points, RankCriterion::GoalsFor]);
        assert_eq!(no_terminal.statistical().len(), 2);
    }

    #[test]
    fn penalty_period_must_be_last() {
        let mut sport = points_sport();
        sport.periods.swap(1, 2);
        assert!(sport.validate().is_err());
    }

    #[test]
    fn points_values_required_for_points_ranking() {
        let mut sport = points_sport();
        sport.points = None;
        assert!(sport.validate().is_err());
    }
}
