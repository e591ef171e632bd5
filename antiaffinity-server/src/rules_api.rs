//! Anti-rule REST API endpoints
//!
//! Provides endpoints for:
//! - Adding an anti-rule from hex-encoded keys
//! - Listing all anti-rules
//! - Reading a rule's per-store leader scores
//! - Reading the store a region's leader was moved to

use crate::state::AppState;
use antiaffinity_core::{AntiAffinityError, AntiRule, RegionId, RuleId, StoreId};
use antiaffinity_scheduler::{metrics, StoreScores};
use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

/// Request body for setting an anti-rule.
///
/// Missing keys decode as empty; an empty end key leaves the range unbounded.
#[derive(Debug, Deserialize)]
pub struct SetAntiRuleRequest {
    pub id: RuleId,
    #[serde(default, alias = "startKeyHex")]
    pub start_key_hex: String,
    #[serde(default, alias = "endKeyHex")]
    pub end_key_hex: String,
}

/// Score table response
#[derive(Debug, Serialize, Deserialize)]
pub struct ScoresResponse {
    pub rule_id: RuleId,
    pub scores: StoreScores,
}

/// Leader location response
#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderLocationResponse {
    pub region_id: RegionId,
    pub store_id: StoreId,
}

/// Create anti-rule routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/anti-rules", get(list_anti_rules).put(set_anti_rule))
        .route("/anti-rules/:rule_id/scores", get(get_rule_scores))
        .route(
            "/regions/:region_id/leader-location",
            get(get_leader_location),
        )
}

fn rejection_code(err: &AntiAffinityError) -> &'static str {
    match err {
        AntiAffinityError::DecodeFailure { .. } => "INVALID_HEX",
        AntiAffinityError::InvalidRule(_) => "INVALID_RULE",
        AntiAffinityError::ScoreNotFound { .. } => "SCORE_NOT_FOUND",
    }
}

/// Add an anti-rule
async fn set_anti_rule(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SetAntiRuleRequest>, JsonRejection>,
) -> ApiResult<&'static str> {
    let Json(req) = body.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected anti-rule request body");
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(rejection.body_text(), "INVALID_REQUEST")),
        )
    })?;

    let rule = AntiRule::from_hex(req.id, &req.start_key_hex, &req.end_key_hex).map_err(|e| {
        warn!(rule_id = req.id, error = %e, "Rejected anti-rule");
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(e.to_string(), rejection_code(&e))),
        )
    })?;

    let manager = state.manager();
    manager.add_rule(rule).map_err(|e| {
        error!(rule_id = req.id, error = %e, "Failed to store anti-rule");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new(e.to_string(), "RULE_STORE_ERROR")),
        )
    })?;
    metrics::set_rule_count(manager.rule_count());

    info!(rule_id = req.id, "Set anti-rule");
    Ok(Json("Set anti-rule successfully."))
}

/// List all anti-rules in insertion order
async fn list_anti_rules(State(state): State<Arc<AppState>>) -> Json<Vec<AntiRule>> {
    Json(state.manager().rules())
}

/// Per-store leader counts for a rule
async fn get_rule_scores(
    State(state): State<Arc<AppState>>,
    Path(rule_id): Path<RuleId>,
) -> Json<ScoresResponse> {
    Json(ScoresResponse {
        rule_id,
        scores: state.manager().scores_for_rule(rule_id),
    })
}

/// Store a region's leader was last moved to
async fn get_leader_location(
    State(state): State<Arc<AppState>>,
    Path(region_id): Path<RegionId>,
) -> ApiResult<LeaderLocationResponse> {
    let store_id = state.manager().get_leader_location(region_id).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ApiError::new(
                format!("No leader location recorded for region {}", region_id),
                "NOT_FOUND",
            )),
        )
    })?;

    Ok(Json(LeaderLocationResponse {
        region_id,
        store_id,
    }))
}
