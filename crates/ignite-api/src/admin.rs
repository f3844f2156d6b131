//! Admin user management. Every handler requires the `admin` role.

use axum::{Json, extract::State};
use tracing::info;

use ignite_db::is_unique_violation;
use ignite_types::api::{DetailResponse, UserOut};
use ignite_types::patch::UserPatch;

use crate::convert::user_out;
use crate::error::{ApiError, ApiJson, ApiPath, ApiResult};
use crate::middleware::RequireAdmin;
use crate::state::{AppState, with_db};

/// Newest accounts first.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> ApiResult<Json<Vec<UserOut>>> {
    let rows = with_db(&state, |db| db.list_users()).await?;
    Ok(Json(rows.into_iter().map(user_out).collect()))
}

pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<UserOut>> {
    with_db(&state, move |db| db.get_user_by_id(id))
        .await?
        .map(|row| Json(user_out(row)))
        .ok_or_else(|| ApiError::not_found("User"))
}

/// PATCH: `name`, `email` and `roles` are optional; `roles` replaces the
/// whole list.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<UserPatch>,
) -> ApiResult<Json<UserOut>> {
    let changes = patch.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let row = with_db(&state, move |db| -> ApiResult<_> {
        if changes.is_empty() {
            return Ok(db.get_user_by_id(id)?);
        }
        db.update_user(id, &changes).map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::Conflict("Email already registered".into())
            } else {
                e.into()
            }
        })
    })
    .await?
    .ok_or_else(|| ApiError::not_found("User"))?;

    info!(user_id = id, admin_id = admin.id, roles = ?row.roles, "User updated");
    Ok(Json(user_out(row)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<DetailResponse>> {
    if !with_db(&state, move |db| db.delete_user(id)).await? {
        return Err(ApiError::not_found("User"));
    }
    info!(user_id = id, admin_id = admin.id, "User deleted");
    Ok(Json(DetailResponse::deleted()))
}
