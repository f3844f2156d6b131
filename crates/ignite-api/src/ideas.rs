use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use tracing::info;

use ignite_db::models::IdeaFilter;
use ignite_types::api::{CreateIdeaRequest, DetailResponse, IdeaOut, StatusRequest};
use ignite_types::models::{ROLE_ADMIN, ROLE_EVALUATOR};

use crate::convert::idea_out;
use crate::error::{ApiError, ApiJson, ApiPath, ApiQuery, ApiResult};
use crate::middleware::{CurrentUser, require_roles};
use crate::state::{AppState, with_db};

#[derive(Debug, Deserialize)]
pub struct IdeaQuery {
    pub owner_id: Option<i64>,
    pub category_id: Option<i64>,
    pub status: Option<String>,
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

impl From<IdeaQuery> for IdeaFilter {
    fn from(q: IdeaQuery) -> Self {
        Self {
            owner_id: q.owner_id,
            category_id: q.category_id,
            // An empty status filter means "any status".
            status: q.status.filter(|s| !s.is_empty()),
            skip: q.skip,
            limit: q.limit,
        }
    }
}

/// POST /ideas: the category id is not checked against existing categories.
pub async fn create_idea(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<CreateIdeaRequest>,
) -> ApiResult<impl IntoResponse> {
    let title = req.title.trim().to_string();
    let description = req.description.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::BadRequest("title cannot be empty".into()));
    }
    if description.is_empty() {
        return Err(ApiError::BadRequest("description cannot be empty".into()));
    }

    let owner_id = user.id;
    let category_id = req.category_id;
    let row = with_db(&state, move |db| {
        db.create_idea(&title, &description, category_id, owner_id)
    })
    .await?;

    info!(idea_id = row.id, owner_id, category_id, "Idea created");
    Ok((StatusCode::CREATED, Json(idea_out(row))))
}

pub async fn list_ideas(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<IdeaQuery>,
) -> ApiResult<Json<Vec<IdeaOut>>> {
    let filter = IdeaFilter::from(query);
    let rows = with_db(&state, move |db| db.list_ideas(&filter)).await?;
    Ok(Json(rows.into_iter().map(idea_out).collect()))
}

pub async fn get_idea(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<IdeaOut>> {
    with_db(&state, move |db| db.get_idea(id))
        .await?
        .map(|row| Json(idea_out(row)))
        .ok_or_else(|| ApiError::not_found("Idea"))
}

/// POST /ideas/{id}/status: moves an idea to any non-blank status. No
/// transition rules are enforced.
pub async fn set_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<StatusRequest>,
) -> ApiResult<Json<IdeaOut>> {
    require_roles(&user, &[ROLE_ADMIN, ROLE_EVALUATOR])?;

    let status = req.status.trim().to_string();
    if status.is_empty() {
        return Err(ApiError::BadRequest("status cannot be empty".into()));
    }

    let log_status = status.clone();
    let row = with_db(&state, move |db| db.set_idea_status(id, &status))
        .await?
        .ok_or_else(|| ApiError::not_found("Idea"))?;

    info!(idea_id = id, user_id = user.id, status = %log_status, "Idea status changed");
    Ok(Json(idea_out(row)))
}

/// DELETE /ideas/{id}: owner or admin. Votes and comments go with it.
pub async fn delete_idea(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<DetailResponse>> {
    let idea = with_db(&state, move |db| db.get_idea(id))
        .await?
        .ok_or_else(|| ApiError::not_found("Idea"))?;

    if idea.owner_id != Some(user.id) {
        require_roles(&user, &[ROLE_ADMIN])?;
    }

    if !with_db(&state, move |db| db.delete_idea(id)).await? {
        return Err(ApiError::not_found("Idea"));
    }

    info!(idea_id = id, user_id = user.id, "Idea deleted");
    Ok(Json(DetailResponse::deleted()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_status_filter_is_ignored() {
        let query: IdeaQuery = serde_json::from_str(r#"{"status": ""}"#).unwrap();
        let filter = IdeaFilter::from(query);
        assert!(filter.status.is_none());
        assert_eq!(filter.limit, 50);
        assert_eq!(filter.skip, 0);
    }
}
