//! Per-tournament trigger serialization.
//!
//! Propagation reads and writes shared bracket state and is not
//! commutative under interleaving, so triggers for the same tournament
//! must run one at a time. Different tournaments are fully independent and
//! run in parallel. The registry hands out one lock per tournament id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

use crate::models::TournamentId;

static TOURNAMENT_LOCKS: Lazy<Mutex<HashMap<TournamentId, Arc<Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// The serialization lock for one tournament. Hold the returned guard for
/// the whole load-compute-save unit.
pub fn tournament_lock(id: &TournamentId) -> Arc<Mutex<()>> {
    let mut registry = TOURNAMENT_LOCKS.lock().unwrap_or_else(|e| e.into_inner());
    registry.entry(*id).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
}
