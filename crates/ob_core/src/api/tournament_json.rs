//! JSON boundary for the engine.
//!
//! String-in/string-out entry points with `schema_version`-tagged request
//! structs, validated before they touch the store. Every mutating call
//! runs the full trigger pipeline under the tournament lock and reports
//! what changed; read calls return the current view. Errors come back as
//! `{"ok": false, "error": "..."}` - these functions never panic on bad
//! input.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::engine::score::display_pair;
use crate::engine::{Engine, RecomputeReport};
use crate::models::{ManualOrdering, SlotOverride, Source, StandingSnapshot};
use crate::notify::NotificationSink;
use crate::store::TournamentStore;

pub const API_SCHEMA_VERSION: u8 = 1;

const FALLBACK_ERROR: &str = r#"{"ok":false,"error":"response serialization failed"}"#;

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct ConfirmResultRequest {
    pub schema_version: u8,
    pub tournament: Uuid,
    #[validate(length(min = 1, max = 16))]
    pub match_code: String,
    /// Per-period scores, comma separated, in rule-set period order.
    #[validate(length(max = 64))]
    pub slot1_periods: String,
    #[validate(length(max = 64))]
    pub slot2_periods: String,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct OverrideRequest {
    pub schema_version: u8,
    pub tournament: Uuid,
    #[validate(length(min = 1, max = 16))]
    pub match_code: String,
    #[serde(default)]
    pub slot1_source: Option<Source>,
    #[serde(default)]
    pub slot2_source: Option<Source>,
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct ClearOverrideRequest {
    pub schema_version: u8,
    pub tournament: Uuid,
    #[validate(length(min = 1, max = 16))]
    pub match_code: String,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct ResolveTieRequest {
    pub schema_version: u8,
    pub tournament: Uuid,
    #[validate(length(min = 1, max = 8))]
    pub block: String,
    pub position: u32,
    /// Best first. Must cover exactly the tied group.
    #[validate(length(min = 2))]
    pub order: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct StandingsRequest {
    pub schema_version: u8,
    pub tournament: Uuid,
    #[validate(length(min = 1, max = 8))]
    pub block: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct BracketRequest {
    pub schema_version: u8,
    pub tournament: Uuid,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct LotteryRequest {
    pub schema_version: u8,
    pub tournament: Uuid,
    #[validate(length(min = 1, max = 8))]
    pub block: String,
    pub position: u32,
    pub seed: u64,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct TriggerResponse {
    pub ok: bool,
    pub report: RecomputeReport,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct StandingsResponse {
    pub ok: bool,
    pub standings: StandingSnapshot,
}

/// One bracket match with its current resolution/confirmation view.
#[derive(Debug, Serialize, JsonSchema)]
pub struct BracketEntry {
    pub code: String,
    pub block: String,
    pub slot1_team: Option<Uuid>,
    pub slot2_team: Option<Uuid>,
    pub slot1_source: Option<String>,
    pub slot2_source: Option<String>,
    pub resolved: bool,
    pub confirmed: bool,
    /// Display scores ("2", "2(PK 4-3)") once confirmed.
    pub score: Option<(String, String)>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct BracketResponse {
    pub ok: bool,
    pub matches: Vec<BracketEntry>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct LotteryResponse {
    pub ok: bool,
    pub ordering: ManualOrdering,
}

// ============================================================================
// Entry points
// ============================================================================

fn error_json(message: impl std::fmt::Display) -> String {
    let response = ErrorResponse { ok: false, error: message.to_string() };
    serde_json::to_string(&response).unwrap_or_else(|_| FALLBACK_ERROR.to_string())
}

fn to_json<T: Serialize>(response: &T) -> String {
    serde_json::to_string(response).unwrap_or_else(|_| FALLBACK_ERROR.to_string())
}

fn check_version(version: u8) -> Result<(), String> {
    if version == API_SCHEMA_VERSION {
        Ok(())
    } else {
        Err(format!("unsupported schema_version {} (expected {})", version, API_SCHEMA_VERSION))
    }
}

pub fn confirm_result_json<S: TournamentStore, N: NotificationSink>(
    engine: &Engine<S, N>,
    request: &str,
) -> String {
    let req: ConfirmResultRequest = match serde_json::from_str(request) {
        Ok(req) => req,
        Err(e) => return error_json(format!("invalid request: {}", e)),
    };
    if let Err(e) = check_version(req.schema_version) {
        return error_json(e);
    }
    if let Err(e) = req.validate() {
        return error_json(format!("validation failed: {}", e));
    }

    match engine.confirm_result(
        &req.tournament,
        &req.match_code,
        &req.slot1_periods,
        &req.slot2_periods,
    ) {
        Ok(report) => to_json(&TriggerResponse { ok: true, report }),
        Err(e) => error_json(e),
    }
}

pub fn set_override_json<S: TournamentStore, N: NotificationSink>(
    engine: &Engine<S, N>,
    request: &str,
) -> String {
    let req: OverrideRequest = match serde_json::from_str(request) {
        Ok(req) => req,
        Err(e) => return error_json(format!("invalid request: {}", e)),
    };
    if let Err(e) = check_version(req.schema_version) {
        return error_json(e);
    }
    if let Err(e) = req.validate() {
        return error_json(format!("validation failed: {}", e));
    }

    let ov = SlotOverride {
        match_code: req.match_code,
        slot1: req.slot1_source,
        slot2: req.slot2_source,
        reason: req.reason,
    };
    match engine.set_override(&req.tournament, ov) {
        Ok(report) => to_json(&TriggerResponse { ok: true, report }),
        Err(e) => error_json(e),
    }
}

pub fn clear_override_json<S: TournamentStore, N: NotificationSink>(
    engine: &Engine<S, N>,
    request: &str,
) -> String {
    let req: ClearOverrideRequest = match serde_json::from_str(request) {
        Ok(req) => req,
        Err(e) => return error_json(format!("invalid request: {}", e)),
    };
    if let Err(e) = check_version(req.schema_version) {
        return error_json(e);
    }
    if let Err(e) = req.validate() {
        return error_json(format!("validation failed: {}", e));
    }

    match engine.clear_override(&req.tournament, &req.match_code) {
        Ok(report) => to_json(&TriggerResponse { ok: true, report }),
        Err(e) => error_json(e),
    }
}

pub fn resolve_tie_json<S: TournamentStore, N: NotificationSink>(
    engine: &Engine<S, N>,
    request: &str,
) -> String {
    let req: ResolveTieRequest = match serde_json::from_str(request) {
        Ok(req) => req,
        Err(e) => return error_json(format!("invalid request: {}", e)),
    };
    if let Err(e) = check_version(req.schema_version) {
        return error_json(e);
    }
    if let Err(e) = req.validate() {
        return error_json(format!("validation failed: {}", e));
    }

    let ordering =
        ManualOrdering { block: req.block, position: req.position, order: req.order };
    match engine.resolve_tie(&req.tournament, ordering) {
        Ok(report) => to_json(&TriggerResponse { ok: true, report }),
        Err(e) => error_json(e),
    }
}

pub fn standings_json<S: TournamentStore, N: NotificationSink>(
    engine: &Engine<S, N>,
    request: &str,
) -> String {
    let req: StandingsRequest = match serde_json::from_str(request) {
        Ok(req) => req,
        Err(e) => return error_json(format!("invalid request: {}", e)),
    };
    if let Err(e) = check_version(req.schema_version) {
        return error_json(e);
    }
    if let Err(e) = req.validate() {
        return error_json(format!("validation failed: {}", e));
    }

    match engine.standings(&req.tournament, &req.block) {
        Ok(standings) => to_json(&StandingsResponse { ok: true, standings }),
        Err(e) => error_json(e),
    }
}

pub fn bracket_json<S: TournamentStore, N: NotificationSink>(
    engine: &Engine<S, N>,
    request: &str,
) -> String {
    let req: BracketRequest = match serde_json::from_str(request) {
        Ok(req) => req,
        Err(e) => return error_json(format!("invalid request: {}", e)),
    };
    if let Err(e) = check_version(req.schema_version) {
        return error_json(e);
    }

    match engine.bracket(&req.tournament) {
        Ok(matches) => {
            let entries = matches
                .iter()
                .map(|m| BracketEntry {
                    code: m.code.clone(),
                    block: m.block.clone(),
                    slot1_team: m.slot1.team,
                    slot2_team: m.slot2.team,
                    slot1_source: m.slot1.source.as_ref().map(Source::describe),
                    slot2_source: m.slot2.source.as_ref().map(Source::describe),
                    resolved: m.is_resolved(),
                    confirmed: m.is_confirmed(),
                    score: m.result.as_ref().map(display_pair),
                })
                .collect();
            to_json(&BracketResponse { ok: true, matches: entries })
        }
        Err(e) => error_json(e),
    }
}

pub fn draw_lottery_json<S: TournamentStore, N: NotificationSink>(
    engine: &Engine<S, N>,
    request: &str,
) -> String {
    let req: LotteryRequest = match serde_json::from_str(request) {
        Ok(req) => req,
        Err(e) => return error_json(format!("invalid request: {}", e)),
    };
    if let Err(e) = check_version(req.schema_version) {
        return error_json(e);
    }
    if let Err(e) = req.validate() {
        return error_json(format!("validation failed: {}", e));
    }

    match engine.propose_lottery(&req.tournament, &req.block, req.position, req.seed) {
        Ok(ordering) => to_json(&LotteryResponse { ok: true, ordering }),
        Err(e) => error_json(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Block, Match, MatchSlot, Phase, RankCriterion, RuleChain, Team, Tournament,
    };
    use crate::notify::CollectSink;
    use crate::store::{MemoryStore, TournamentState};
    use serde_json::{json, Value};

    fn engine_with_pair() -> (Engine<MemoryStore, CollectSink>, Uuid, Vec<Uuid>) {
        let chain = RuleChain::new(vec![
            RankCriterion::Points,
            RankCriterion::GoalDifference,
            RankCriterion::Manual,
        ]);
        let teams = vec![Team::new("Osprey", "OS"), Team::new("Plover", "PL")];
        let ids: Vec<Uuid> = teams.iter().map(|t| t.id).collect();
        let state = TournamentState {
            tournament: Tournament::new("Json Cup", "football", chain.clone(), chain),
            teams,
            blocks: vec![
                Block::new("A", Phase::Preliminary, ids.clone()),
                Block::new("F", Phase::Final, Vec::new()),
            ],
            matches: vec![Match::new(
                "A1",
                "A",
                MatchSlot::concrete(ids[0]),
                MatchSlot::concrete(ids[1]),
            )],
            overrides: Vec::new(),
            orderings: Vec::new(),
        };
        let id = state.tournament.id;
        let engine = Engine::new(MemoryStore::new(), CollectSink::new());
        engine.register(state).unwrap();
        (engine, id, ids)
    }

    #[test]
    fn confirm_and_read_standings_via_json() {
        let (engine, id, ids) = engine_with_pair();

        let request = json!({
            "schema_version": 1,
            "tournament": id,
            "match_code": "A1",
            "slot1_periods": "2,0",
            "slot2_periods": "0,1",
        });
        let response: Value =
            serde_json::from_str(&confirm_result_json(&engine, &request.to_string())).unwrap();
        assert_eq!(response["ok"], true);

        let request = json!({ "schema_version": 1, "tournament": id, "block": "A" });
        let response: Value =
            serde_json::from_str(&standings_json(&engine, &request.to_string())).unwrap();
        assert_eq!(response["ok"], true);
        let rows = response["standings"]["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["team"], json!(ids[0]));
        assert_eq!(rows[0]["position"], 1);
    }

    #[test]
    fn schema_version_is_gated() {
        let (engine, id, _) = engine_with_pair();
        let request = json!({
            "schema_version": 9,
            "tournament": id,
            "match_code": "A1",
            "slot1_periods": "1,0",
            "slot2_periods": "0,0",
        });
        let response: Value =
            serde_json::from_str(&confirm_result_json(&engine, &request.to_string())).unwrap();
        assert_eq!(response["ok"], false);
        assert!(response["error"].as_str().unwrap().contains("schema_version"));
    }

    #[test]
    fn request_validation_runs_before_the_store() {
        let (engine, id, _) = engine_with_pair();
        let request = json!({
            "schema_version": 1,
            "tournament": id,
            "match_code": "",
            "slot1_periods": "1,0",
            "slot2_periods": "0,0",
        });
        let response: Value =
            serde_json::from_str(&confirm_result_json(&engine, &request.to_string())).unwrap();
        assert_eq!(response["ok"], false);
        assert!(response["error"].as_str().unwrap().contains("validation"));
    }

    #[test]
    fn malformed_json_is_an_error_response_not_a_panic() {
        let (engine, _, _) = engine_with_pair();
        let response: Value =
            serde_json::from_str(&bracket_json(&engine, "{not json")).unwrap();
        assert_eq!(response["ok"], false);
    }

    #[test]
    fn bracket_view_describes_sources() {
        let (engine, id, _) = engine_with_pair();
        let request = json!({ "schema_version": 1, "tournament": id });
        let response: Value =
            serde_json::from_str(&bracket_json(&engine, &request.to_string())).unwrap();
        assert_eq!(response["ok"], true);
        // pair fixture has no final-phase matches
        assert_eq!(response["matches"].as_array().unwrap().len(), 0);
    }
}
