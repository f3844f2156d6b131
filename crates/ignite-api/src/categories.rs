use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use ignite_db::is_unique_violation;
use ignite_types::api::{CategoryIn, CategoryOut, DetailResponse};
use ignite_types::patch::CategoryPatch;

use crate::convert::category_out;
use crate::error::{ApiError, ApiJson, ApiPath, ApiResult};
use crate::middleware::RequireAdmin;
use crate::state::{AppState, with_db};

/// GET /categories: public, ordered by name.
pub async fn public_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<CategoryOut>>> {
    list(&state).await
}

pub async fn list_categories(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> ApiResult<Json<Vec<CategoryOut>>> {
    list(&state).await
}

async fn list(state: &AppState) -> ApiResult<Json<Vec<CategoryOut>>> {
    let rows = with_db(state, |db| db.list_categories()).await?;
    Ok(Json(rows.into_iter().map(category_out).collect()))
}

pub async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(req): ApiJson<CategoryIn>,
) -> ApiResult<impl IntoResponse> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::BadRequest("name cannot be empty".into()));
    }

    let row = with_db(&state, move |db| {
        db.create_category(&name).map_err(name_conflict)
    })
    .await?;

    info!(category_id = row.id, admin_id = admin.id, "Category created");
    Ok((StatusCode::CREATED, Json(category_out(row))))
}

pub async fn get_category(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<CategoryOut>> {
    with_db(&state, move |db| db.get_category(id))
        .await?
        .map(|row| Json(category_out(row)))
        .ok_or_else(|| ApiError::not_found("Category"))
}

/// PATCH: only `name` is updatable; absent leaves it unchanged.
pub async fn update_category(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<CategoryPatch>,
) -> ApiResult<Json<CategoryOut>> {
    let new_name = patch.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let row = with_db(&state, move |db| -> ApiResult<_> {
        match new_name {
            Some(name) => db.rename_category(id, &name).map_err(name_conflict),
            None => Ok(db.get_category(id)?),
        }
    })
    .await?;

    row.map(|row| Json(category_out(row)))
        .ok_or_else(|| ApiError::not_found("Category"))
}

/// Hard delete. Ideas in the category keep their `category_id` and lose the
/// name.
pub async fn delete_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<DetailResponse>> {
    if !with_db(&state, move |db| db.delete_category(id)).await? {
        return Err(ApiError::not_found("Category"));
    }
    info!(category_id = id, admin_id = admin.id, "Category deleted");
    Ok(Json(DetailResponse::deleted()))
}

fn name_conflict(err: anyhow::Error) -> ApiError {
    if is_unique_violation(&err) {
        ApiError::Conflict("Category name already exists".into())
    } else {
        err.into()
    }
}
