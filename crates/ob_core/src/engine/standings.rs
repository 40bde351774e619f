//! Standings aggregation.
//!
//! Builds the unranked per-team aggregates for one block from its
//! confirmed matches. Every assigned team gets a row, played or not. The
//! output feeds the tie-breaking engine; position assignment happens there.

use crate::models::{Block, Match, RankingMethod, SportRuleSet, StandingRow};

/// Aggregate all confirmed matches of `block` into one row per member team.
///
/// Only matches that are both resolved (concrete opponents) and confirmed
/// contribute. Rows come back in block-assignment order with position 0.
pub fn aggregate_block(block: &Block, matches: &[Match], rules: &SportRuleSet) -> Vec<StandingRow> {
    block
        .teams
        .iter()
        .map(|team| {
            let mut row = StandingRow::zeroed(*team);

            for m in matches.iter().filter(|m| m.block == block.label) {
                let result = match &m.result {
                    Some(result) if m.involves(team) => result,
                    _ => continue,
                };
                let opponent = match m.opponent_of(team) {
                    Some(op) => op,
                    None => continue,
                };

                let (own_goals, opp_goals) = if m.slot1.team.as_ref() == Some(team) {
                    (result.regulation1, result.regulation2)
                } else {
                    (result.regulation2, result.regulation1)
                };

                row.played += 1;
                row.goals_for += own_goals;
                row.goals_against += opp_goals;

                if result.draw {
                    row.draws += 1;
                } else if result.winner.as_ref() == Some(team) {
                    row.wins += 1;
                } else if result.winner == Some(opponent) {
                    row.losses += 1;
                }
            }

            row.goal_difference = i64::from(row.goals_for) - i64::from(row.goals_against);

            match rules.ranking {
                RankingMethod::Points => {
                    if let Some(values) = rules.points {
                        row.points = i64::from(row.wins) * values.win
                            + i64::from(row.draws) * values.draw
                            + i64::from(row.losses) * values.loss;
                    }
                }
                RankingMethod::WinRate => {
                    if row.played > 0 {
                        row.win_rate_milli = row.wins * 1000 / row.played;
                    }
                }
            }

            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::get_sport_rules;
    use crate::engine::score::build_confirmed;
    use crate::models::{Block, MatchSlot, Phase, TeamId};
    use uuid::Uuid;

    fn confirmed(code: &str, block: &str, t1: TeamId, t2: TeamId, p1: &str, p2: &str) -> Match {
        let rules = get_sport_rules("football").unwrap();
        let mut m = Match::new(code, block, MatchSlot::concrete(t1), MatchSlot::concrete(t2));
        m.result = Some(build_confirmed(p1, p2, t1, t2, rules));
        m
    }

    #[test]
    fn aggregates_confirmed_matches_only() {
        let rules = get_sport_rules("football").unwrap();
        let teams: Vec<TeamId> = (0..3).map(|_| Uuid::new_v4()).collect();
        let block = Block::new("A", Phase::Preliminary, teams.clone());

        let matches = vec![
            confirmed("M1", "A", teams[0], teams[1], "2,1", "0,0"),
            confirmed("M2", "A", teams[1], teams[2], "1,0", "0,1"),
            // unconfirmed fixture contributes nothing
            Match::new("M3", "A", MatchSlot::concrete(teams[0]), MatchSlot::concrete(teams[2])),
        ];

        let rows = aggregate_block(&block, &matches, rules);
        assert_eq!(rows.len(), 3);

        let row0 = &rows[0];
        assert_eq!((row0.played, row0.wins, row0.points), (1, 1, 3));
        assert_eq!((row0.goals_for, row0.goals_against, row0.goal_difference), (3, 0, 3));

        // drawn match M2 gives both sides a point
        let row1 = &rows[1];
        assert_eq!((row1.played, row1.draws, row1.points), (2, 1, 1));
        let row2 = &rows[2];
        assert_eq!((row2.played, row2.draws, row2.points), (1, 1, 1));
    }

    #[test]
    fn idle_teams_report_all_zero_rows() {
        let rules = get_sport_rules("football").unwrap();
        let teams: Vec<TeamId> = (0..4).map(|_| Uuid::new_v4()).collect();
        let block = Block::new("B", Phase::Preliminary, teams.clone());

        let rows = aggregate_block(&block, &[], rules);
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.played == 0 && r.points == 0));
    }

    #[test]
    fn win_rate_sport_populates_alternative_scalar() {
        let rules = get_sport_rules("relay").unwrap();
        let teams: Vec<TeamId> = (0..2).map(|_| Uuid::new_v4()).collect();
        let block = Block::new("R", Phase::Preliminary, teams.clone());

        let mut m1 = Match::new("R1", "R", MatchSlot::concrete(teams[0]), MatchSlot::concrete(teams[1]));
        m1.result = Some(build_confirmed("3", "1", teams[0], teams[1], rules));
        let mut m2 = Match::new("R2", "R", MatchSlot::concrete(teams[0]), MatchSlot::concrete(teams[1]));
        m2.result = Some(build_confirmed("2", "1", teams[0], teams[1], rules));

        let rows = aggregate_block(&block, &[m1, m2], rules);
        assert_eq!(rows[0].win_rate_milli, 1000);
        assert_eq!(rows[0].points, 0);
        assert_eq!(rows[1].win_rate_milli, 0);
    }

    #[test]
    fn shootout_goals_do_not_count_toward_aggregates() {
        let rules = get_sport_rules("football").unwrap();
        let teams: Vec<TeamId> = (0..2).map(|_| Uuid::new_v4()).collect();
        let block = Block::new("C", Phase::Preliminary, teams.clone());

        let matches =
            vec![confirmed("M1", "C", teams[0], teams[1], "1,0,0,0,5", "0,1,0,0,4")];

        let rows = aggregate_block(&block, &matches, rules);
        assert_eq!(rows[0].goals_for, 1);
        assert_eq!(rows[0].wins, 1); // shootout decided the winner
        assert_eq!(rows[1].goals_for, 1);
        assert_eq!(rows[1].losses, 1);
    }
}
