//! Score analysis.
//!
//! Raw results arrive as one score value per period played, comma
//! separated, in the order the sport's rule set declares its periods.
//! Regular and extra periods sum into the regulation score used by the
//! standings; a penalty period only decides the winner and the display
//! string. Malformed legacy data degrades to zero and is logged - score
//! analysis never fails a recomputation.

use crate::models::{ConfirmedResult, PeriodClass, SportRuleSet, TeamId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreBreakdown {
    pub regulation: u32,
    pub shootout: Option<u32>,
}

fn parse_tokens(raw: &str) -> Option<Vec<u32>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.split(',').map(|t| t.trim().parse::<u32>().ok()).collect()
}

/// Split a raw per-period score string into regulation and shootout parts.
pub fn analyze(raw: &str, rules: &SportRuleSet) -> ScoreBreakdown {
    if !rules.has_period_structure() {
        // Single-value scoring: the raw value is the regulation score.
        return match raw.trim().parse::<u32>() {
            Ok(value) => ScoreBreakdown { regulation: value, shootout: None },
            Err(_) => {
                log::warn!("malformed single-value score {:?} for sport {}, degrading to 0", raw, rules.code);
                ScoreBreakdown::default()
            }
        };
    }

    let values = match parse_tokens(raw) {
        Some(values) => values,
        None => {
            log::warn!("malformed period scores {:?} for sport {}, degrading to 0", raw, rules.code);
            return ScoreBreakdown::default();
        }
    };

    if values.len() > rules.periods.len() {
        log::warn!(
            "{} period values for {} declared periods (sport {}), degrading to 0",
            values.len(),
            rules.periods.len(),
            rules.code
        );
        return ScoreBreakdown::default();
    }

    let mut breakdown = ScoreBreakdown::default();
    for (period, value) in rules.periods.iter().zip(values) {
        match period.class {
            PeriodClass::Regular | PeriodClass::Extra => breakdown.regulation += value,
            PeriodClass::Penalty => {
                breakdown.shootout = Some(value);
                if rules.shootout_counts_toward_regulation {
                    breakdown.regulation += value;
                }
            }
        }
    }
    breakdown
}

/// Display string for one side: `"{regulation}"`, or
/// `"{regulation}(PK {own}-{opp})"` when a shootout occurred.
pub fn display_score(own: &ScoreBreakdown, opp: &ScoreBreakdown) -> String {
    match (own.shootout, opp.shootout) {
        (None, None) => format!("{}", own.regulation),
        (own_pk, opp_pk) => format!(
            "{}(PK {}-{})",
            own.regulation,
            own_pk.unwrap_or(0),
            opp_pk.unwrap_or(0)
        ),
    }
}

/// Display strings for both sides of a confirmed result.
pub fn display_pair(result: &ConfirmedResult) -> (String, String) {
    let side1 = ScoreBreakdown {
        regulation: result.regulation1,
        shootout: result.shootout.map(|s| s.0),
    };
    let side2 = ScoreBreakdown {
        regulation: result.regulation2,
        shootout: result.shootout.map(|s| s.1),
    };
    (display_score(&side1, &side2), display_score(&side2, &side1))
}

/// Analyze both sides and derive the confirmed result: regulation scores,
/// shootout pair, winner or terminal draw.
pub fn build_confirmed(
    periods1: &str,
    periods2: &str,
    team1: TeamId,
    team2: TeamId,
    rules: &SportRuleSet,
) -> ConfirmedResult {
    let side1 = analyze(periods1, rules);
    let side2 = analyze(periods2, rules);

    let shootout = match (side1.shootout, side2.shootout) {
        (None, None) => None,
        (a, b) => Some((a.unwrap_or(0), b.unwrap_or(0))),
    };

    let winner = if side1.regulation > side2.regulation {
        Some(team1)
    } else if side2.regulation > side1.regulation {
        Some(team2)
    } else {
        match shootout {
            Some((a, b)) if a > b => Some(team1),
            Some((a, b)) if b > a => Some(team2),
            // Level after regulation with no deciding shootout: terminal draw.
            _ => None,
        }
    };

    ConfirmedResult {
        periods1: periods1.to_string(),
        periods2: periods2.to_string(),
        regulation1: side1.regulation,
        regulation2: side2.regulation,
        shootout,
        draw: winner.is_none(),
        winner,
    }
}
