use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use ignite_types::api::{CommentOut, CreateCommentRequest};

use crate::convert::comment_out;
use crate::error::{ApiError, ApiJson, ApiPath, ApiResult};
use crate::middleware::CurrentUser;
use crate::state::{AppState, with_db};

/// GET /ideas/{id}/comments: oldest first. An unknown idea simply has no
/// comments.
pub async fn list_comments(
    State(state): State<AppState>,
    ApiPath(idea_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<CommentOut>>> {
    let rows = with_db(&state, move |db| db.list_comments(idea_id)).await?;
    Ok(Json(rows.into_iter().map(comment_out).collect()))
}

pub async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(idea_id): ApiPath<i64>,
    ApiJson(req): ApiJson<CreateCommentRequest>,
) -> ApiResult<impl IntoResponse> {
    let content = req.content.trim().to_string();
    if content.is_empty() {
        return Err(ApiError::BadRequest("content cannot be empty".into()));
    }

    let user_id = user.id;
    let row = with_db(&state, move |db| -> ApiResult<_> {
        // The store runs insert + read-back in one transaction and rolls back
        // on any error.
        db.create_comment(idea_id, user_id, &content)
            .map_err(|e| ApiError::Internal(e.context("failed to save comment")))
    })
    .await?
    .ok_or_else(|| ApiError::not_found("Idea"))?;

    info!(comment_id = row.id, idea_id, user_id, "Comment created");
    Ok((StatusCode::CREATED, Json(comment_out(row))))
}
