pub mod tournament_json;

pub use tournament_json::{
    bracket_json, clear_override_json, confirm_result_json, draw_lottery_json, resolve_tie_json,
    set_override_json, standings_json, BracketEntry, BracketRequest, BracketResponse,
    ClearOverrideRequest, ConfirmResultRequest, ErrorResponse, LotteryRequest, LotteryResponse,
    OverrideRequest, ResolveTieRequest, StandingsRequest, StandingsResponse, TriggerResponse,
    API_SCHEMA_VERSION,
};
