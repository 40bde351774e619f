use criterion::{black_box, criterion_group, criterion_main, Criterion};
use uuid::Uuid;

use ob_core::data::get_sport_rules;
use ob_core::engine::promotion::{propagate, Trigger};
use ob_core::engine::standings::aggregate_block;
use ob_core::engine::tiebreak::rank_block;
use ob_core::engine::score::build_confirmed;
use ob_core::models::{
    Block, Match, MatchSlot, Phase, RankCriterion, RuleChain, Source, StandingSnapshot, Team,
    TeamId, Tournament,
};
use ob_core::store::TournamentState;

fn chain() -> RuleChain {
    RuleChain::new(vec![
        RankCriterion::Points,
        RankCriterion::GoalDifference,
        RankCriterion::GoalsFor,
        RankCriterion::HeadToHead,
        RankCriterion::Manual,
    ])
}

/// Fully-confirmed 8-team round-robin block.
fn eight_team_block() -> (Block, Vec<Match>) {
    let rules = get_sport_rules("football").unwrap();
    let ids: Vec<TeamId> = (0..8).map(|_| Uuid::new_v4()).collect();
    let block = Block::new("A", Phase::Preliminary, ids.clone());

    let mut matches = Vec::new();
    let mut n = 0u32;
    for i in 0..8 {
        for j in (i + 1)..8 {
            n += 1;
            let mut m = Match::new(
                format!("A{}", n),
                "A",
                MatchSlot::concrete(ids[i]),
                MatchSlot::concrete(ids[j]),
            );
            let g1 = (i as u32 * 3 + j as u32) % 4;
            let g2 = (j as u32 * 5 + i as u32) % 4;
            m.result = Some(build_confirmed(
                &format!("{},0", g1),
                &format!("{},0", g2),
                ids[i],
                ids[j],
                rules,
            ));
            matches.push(m);
        }
    }
    (block, matches)
}

fn bench_rank(c: &mut Criterion) {
    let rules = get_sport_rules("football").unwrap();
    let (block, matches) = eight_team_block();
    let chain = chain();

    c.bench_function("rank_8_team_block", |b| {
        b.iter(|| {
            let rows = aggregate_block(&block, &matches, rules);
            black_box(rank_block(Uuid::nil(), &block, rows, &chain, rules, &matches, &[]))
        })
    });
}

fn bench_propagate(c: &mut Criterion) {
    let rules = get_sport_rules("football").unwrap();
    let (mut block, matches) = eight_team_block();

    let rows = aggregate_block(&block, &matches, rules);
    let outcome = rank_block(Uuid::nil(), &block, rows, &chain(), rules, &matches, &[]);
    let mut snapshot = StandingSnapshot::empty("A", Phase::Preliminary);
    snapshot.rows = outcome.rows;
    snapshot.tie_groups = outcome.tie_groups;
    block.standings = Some(snapshot);

    let teams: Vec<Team> = block.teams.iter().map(|id| Team { id: *id, name: id.to_string(), abbreviation: "T".to_string() }).collect();
    let mut all_matches = matches;
    for (n, position) in (1..=4).enumerate() {
        all_matches.push(Match::new(
            format!("F{}", n + 1),
            "F",
            MatchSlot::pending(Source::BlockPosition { block: "A".to_string(), position }),
            MatchSlot::pending(Source::BlockPosition {
                block: "A".to_string(),
                position: position + 4,
            }),
        ));
    }

    let state = TournamentState {
        tournament: Tournament::new("Bench Cup", "football", chain(), chain()),
        teams,
        blocks: vec![block, Block::new("F", Phase::Final, Vec::new())],
        matches: all_matches,
        overrides: Vec::new(),
        orderings: Vec::new(),
    };

    let triggers = [Trigger::BlockStandingsChanged { block: "A".to_string() }];
    c.bench_function("propagate_quarterfinal_bracket", |b| {
        b.iter(|| {
            let mut working = state.clone();
            black_box(propagate(&mut working, &triggers))
        })
    });
}

criterion_group!(benches, bench_rank, bench_propagate);
criterion_main!(benches);
