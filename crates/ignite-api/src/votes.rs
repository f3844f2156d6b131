use axum::{Json, extract::State};
use tracing::info;

use ignite_types::api::{VoteRequest, VoteTally};
use ignite_types::models::VoteType;

use crate::convert::vote_tally;
use crate::error::{ApiError, ApiJson, ApiPath, ApiResult};
use crate::middleware::CurrentUser;
use crate::state::{AppState, with_db};

/// POST /ideas/{id}/vote: `{"type": "up" | "down"}`. A second vote by the
/// same user replaces the first.
pub async fn cast_vote(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(idea_id): ApiPath<i64>,
    ApiJson(req): ApiJson<VoteRequest>,
) -> ApiResult<Json<VoteTally>> {
    let vote_type: VoteType = req
        .vote_type
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid vote type".into()))?;

    let user_id = user.id;
    let counts = with_db(&state, move |db| db.cast_vote(idea_id, user_id, vote_type))
        .await?
        .ok_or_else(|| ApiError::not_found("Idea"))?;

    info!(idea_id, user_id, vote = %vote_type, score = counts.score, "Vote cast");
    Ok(Json(vote_tally(counts)))
}
