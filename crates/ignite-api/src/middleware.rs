use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use ignite_db::models::UserRow;
use ignite_types::models::ROLE_ADMIN;

use crate::auth::decode_token;
use crate::error::ApiError;
use crate::state::{AppState, with_db};

/// The user behind the request's bearer token.
pub struct CurrentUser(pub UserRow);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Unauthorized("Not authenticated".into()))?;

        resolve_current_user(state, bearer.token()).await.map(CurrentUser)
    }
}

/// A [`CurrentUser`] holding the `admin` role.
pub struct RequireAdmin(pub UserRow);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        require_roles(&user, &[ROLE_ADMIN])?;
        Ok(RequireAdmin(user))
    }
}

/// Validate a token and load the user it names.
pub async fn resolve_current_user(state: &AppState, token: &str) -> Result<UserRow, ApiError> {
    let claims = decode_token(&state.auth, token)
        .ok_or_else(|| ApiError::Unauthorized("Invalid token".into()))?;

    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| ApiError::Unauthorized("Invalid user id in token".into()))?;

    with_db(state, move |db| db.get_user_by_id(user_id))
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))
}

/// Fail with Forbidden unless `user` holds at least one of `allowed`.
pub fn require_roles(user: &UserRow, allowed: &[&str]) -> Result<(), ApiError> {
    if user.has_any_role(allowed) {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Insufficient role".into()))
    }
}
