//! Deterministic lottery draws.
//!
//! A tie group whose chain ends in `lottery` still needs an explicit
//! administrative act; the engine only proposes. The draw is seeded so the
//! same seed always yields the same ordering - auditable and replayable.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::models::{ManualOrdering, TeamId};

/// Produce a proposed ordering for a tied group. The member list is
/// canonicalized before shuffling so the result depends only on the seed
/// and the set, not on caller-side ordering.
pub fn draw_ordering(block: &str, position: u32, teams: &[TeamId], seed: u64) -> ManualOrdering {
    let mut order: Vec<TeamId> = teams.to_vec();
    order.sort();

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    ManualOrdering { block: block.to_string(), position, order }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn same_seed_same_order() {
        let teams: Vec<TeamId> = (0..5).map(|_| Uuid::new_v4()).collect();

        let a = draw_ordering("B", 2, &teams, 42);
        let b = draw_ordering("B", 2, &teams, 42);
        assert_eq!(a, b);

        // caller-side ordering of the set must not matter
        let mut reversed = teams.clone();
        reversed.reverse();
        let c = draw_ordering("B", 2, &reversed, 42);
        assert_eq!(a.order, c.order);
    }

    #[test]
    fn different_seed_usually_differs() {
        let teams: Vec<TeamId> = (0..6).map(|_| Uuid::new_v4()).collect();
        let a = draw_ordering("B", 1, &teams, 1);
        let b = draw_ordering("B", 1, &teams, 2);
        // 6! orderings; identical draws for two seeds would be a bug in
        // practice even though it is not strictly impossible
        assert_ne!(a.order, b.order);
    }

    #[test]
    fn draw_covers_exactly_the_given_set() {
        let teams: Vec<TeamId> = (0..4).map(|_| Uuid::new_v4()).collect();
        let drawn = draw_ordering("C", 3, &teams, 99);
        assert!(drawn.covers(&teams));
        assert_eq!(drawn.position, 3);
    }
}
