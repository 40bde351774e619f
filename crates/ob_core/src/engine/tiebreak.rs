//! Tie-breaking engine.
//!
//! Interprets a tournament phase's rule chain over the unranked aggregates
//! of one block. The chain is data: each criterion maps to a strict
//! total-order key, evaluated left to right as partition refinement - a
//! group of statistically indistinguishable teams is split by the next
//! criterion, or survives to the end and becomes a tie group.
//!
//! Head-to-head keys are scoped to the tied set at the point the criterion
//! applies. Stored manual orderings act as a scoped criterion for groups
//! the statistics could not separate; they never outrank statistics.

use crate::models::{
    Block, ManualOrdering, Match, RankCriterion, RankingMethod, RuleChain, SportRuleSet,
    StandingRow, TeamId, TieGroup, TieStatus, TournamentId,
};
use crate::notify::TieEscalation;

#[derive(Debug, Clone)]
pub struct RankOutcome {
    pub rows: Vec<StandingRow>,
    pub tie_groups: Vec<TieGroup>,
    pub escalations: Vec<TieEscalation>,
}

fn criterion_key(
    criterion: RankCriterion,
    row: &StandingRow,
    tied: &[TeamId],
    matches: &[Match],
    rules: &SportRuleSet,
) -> i64 {
    match criterion {
        RankCriterion::Points => row.points,
        RankCriterion::WinRate => i64::from(row.win_rate_milli),
        RankCriterion::GoalDifference => row.goal_difference,
        RankCriterion::GoalsFor => i64::from(row.goals_for),
        // lower is better
        RankCriterion::GoalsAgainst => -i64::from(row.goals_against),
        RankCriterion::Wins => i64::from(row.wins),
        RankCriterion::HeadToHead => head_to_head_key(&row.team, tied, matches, rules),
        // terminal criteria carry no statistical key
        RankCriterion::Lottery | RankCriterion::Manual => 0,
    }
}

/// Ranking scalar over only the confirmed matches among the tied set.
fn head_to_head_key(team: &TeamId, tied: &[TeamId], matches: &[Match], rules: &SportRuleSet) -> i64 {
    let mut played = 0i64;
    let mut wins = 0i64;
    let mut draws = 0i64;
    let mut losses = 0i64;

    for m in matches {
        let result = match &m.result {
            Some(result) if m.involves(team) => result,
            _ => continue,
        };
        let opponent = match m.opponent_of(team) {
            Some(op) if tied.contains(&op) => op,
            _ => continue,
        };

        played += 1;
        if result.draw {
            draws += 1;
        } else if result.winner.as_ref() == Some(team) {
            wins += 1;
        } else if result.winner == Some(opponent) {
            losses += 1;
        }
    }

    match rules.ranking {
        RankingMethod::Points => match rules.points {
            Some(values) => wins * values.win + draws * values.draw + losses * values.loss,
            None => wins,
        },
        RankingMethod::WinRate => {
            if played > 0 {
                wins * 1000 / played
            } else {
                0
            }
        }
    }
}

/// Split one group by a criterion. Stable: equal keys keep their incoming
/// order, so the whole ranking is deterministic for fixed input.
fn refine(
    group: Vec<StandingRow>,
    criterion: RankCriterion,
    matches: &[Match],
    rules: &SportRuleSet,
) -> Vec<Vec<StandingRow>> {
    if group.len() <= 1 {
        return vec![group];
    }

    let tied: Vec<TeamId> = group.iter().map(|r| r.team).collect();
    let mut keyed: Vec<(i64, StandingRow)> = group
        .into_iter()
        .map(|row| (criterion_key(criterion, &row, &tied, matches, rules), row))
        .collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0));

    let mut out: Vec<Vec<StandingRow>> = Vec::new();
    let mut current_key: Option<i64> = None;
    for (key, row) in keyed {
        if current_key != Some(key) {
            out.push(Vec::new());
            current_key = Some(key);
        }
        out.last_mut().expect("group pushed above").push(row);
    }
    out
}

fn team_ids(group: &[StandingRow]) -> Vec<TeamId> {
    group.iter().map(|r| r.team).collect()
}

/// Rank one block's aggregates: sort by the full criteria chain, group the
/// statistically indistinguishable, assign shared skip-ahead positions, and
/// flag what needs an administrator.
pub fn rank_block(
    tournament: TournamentId,
    block: &Block,
    rows: Vec<StandingRow>,
    chain: &RuleChain,
    rules: &SportRuleSet,
    matches: &[Match],
    orderings: &[ManualOrdering],
) -> RankOutcome {
    let statistical = chain.statistical();

    // Head-to-head only considers meetings inside this block.
    let block_matches: Vec<Match> =
        matches.iter().filter(|m| m.block == block.label).cloned().collect();

    let mut groups: Vec<Vec<StandingRow>> = vec![rows];
    let mut primary_ties: Vec<Vec<TeamId>> = Vec::new();
    for (idx, criterion) in statistical.iter().enumerate() {
        groups = groups
            .into_iter()
            .flat_map(|g| refine(g, *criterion, &block_matches, rules))
            .collect();
        if idx == 0 {
            primary_ties =
                groups.iter().filter(|g| g.len() > 1).map(|g| team_ids(g)).collect();
        }
    }
    if statistical.is_empty() {
        primary_ties = groups.iter().filter(|g| g.len() > 1).map(|g| team_ids(g)).collect();
    }

    // Terminal stage: position assignment plus disposition of surviving
    // groups. Positions skip ahead by group size.
    let mut out_rows: Vec<StandingRow> = Vec::new();
    let mut tie_groups: Vec<TieGroup> = Vec::new();
    let mut escalations: Vec<TieEscalation> = Vec::new();
    let mut position: u32 = 1;

    for mut group in groups {
        let size = group.len() as u32;
        if size == 0 {
            continue;
        }
        if size == 1 {
            let mut row = group.pop().expect("size checked");
            row.position = position;
            out_rows.push(row);
            position += 1;
            continue;
        }

        let teams = team_ids(&group);
        match orderings.iter().find(|o| o.block == block.label && o.covers(&teams)) {
            Some(ordering) => {
                group.sort_by_key(|row| {
                    ordering.order.iter().position(|t| *t == row.team).unwrap_or(usize::MAX)
                });
                for (offset, mut row) in group.into_iter().enumerate() {
                    row.position = position + offset as u32;
                    out_rows.push(row);
                }
                tie_groups.push(TieGroup {
                    position,
                    teams: ordering.order.clone(),
                    status: TieStatus::ManuallyResolved,
                });
            }
            None => {
                for mut row in group {
                    row.position = position;
                    out_rows.push(row);
                }
                tie_groups.push(TieGroup {
                    position,
                    teams: teams.clone(),
                    status: TieStatus::NeedsManualResolution,
                });
                escalations.push(TieEscalation {
                    tournament,
                    block: block.label.clone(),
                    position,
                    teams,
                });
            }
        }
        position += size;
    }

    // Primary-scalar ties the rest of the chain fully separated are still
    // reported, as auto-resolved.
    for candidate in primary_ties {
        let survived = tie_groups.iter().any(|g| g.teams.iter().any(|t| candidate.contains(t)));
        if survived {
            continue;
        }
        let mut members: Vec<(u32, TeamId)> = candidate
            .iter()
            .filter_map(|t| {
                out_rows.iter().find(|r| r.team == *t).map(|r| (r.position, *t))
            })
            .collect();
        members.sort();
        if let Some(&(position, _)) = members.first() {
            tie_groups.push(TieGroup {
                position,
                teams: members.into_iter().map(|(_, t)| t).collect(),
                status: TieStatus::AutoResolved,
            });
        }
    }
    tie_groups.sort_by_key(|g| g.position);

    RankOutcome { rows: out_rows, tie_groups, escalations }
}
