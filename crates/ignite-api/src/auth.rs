use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, response::IntoResponse};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::info;

use ignite_db::{Database, is_unique_violation};
use ignite_types::api::{Claims, LoginRequest, RegisterRequest, TokenResponse, UserOut};
use ignite_types::models::{ROLE_ADMIN, ROLE_USER};
use ignite_types::patch::looks_like_email;

use crate::config::AuthConfig;
use crate::convert::user_out;
use crate::error::{ApiError, ApiJson, ApiResult};
use crate::middleware::CurrentUser;
use crate::state::{AppState, with_db};

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<Json<UserOut>> {
    let name = req.name.trim().to_string();
    let email = req.email.trim().to_string();

    // Validate input
    if name.is_empty() {
        return Err(ApiError::BadRequest("name cannot be empty".into()));
    }
    if !looks_like_email(&email) {
        return Err(ApiError::BadRequest("email is not a valid address".into()));
    }

    let user = with_db(&state, move |db| -> ApiResult<_> {
        if db.get_user_by_email(&email)?.is_some() {
            return Err(email_taken());
        }

        let password_hash = hash_password(&req.password)?;
        db.create_user(&name, &email, &password_hash, &[ROLE_USER.to_string()])
            .map_err(|e| if is_unique_violation(&e) { email_taken() } else { e.into() })
    })
    .await?;

    info!(user_id = user.id, "User registered");
    Ok(Json(user_out(user)))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = req.email.trim().to_string();

    let user = with_db(&state, move |db| -> ApiResult<_> {
        let user = db.get_user_by_email(&email)?.ok_or_else(invalid_credentials)?;
        if !verify_password(&req.password, &user.password_hash)? {
            return Err(invalid_credentials());
        }
        Ok(user)
    })
    .await?;

    let token = create_token(&state.auth, user.id)?;
    Ok(Json(TokenResponse::bearer(token)))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserOut> {
    Json(user_out(user))
}

/// Registration reports a taken email as a plain 400.
fn email_taken() -> ApiError {
    ApiError::BadRequest("Email already registered".into())
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid credentials".into())
}

// -- Passwords --

/// Argon2id PHC string with a random salt.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
pub fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("corrupt password hash: {}", e))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("password verification failed: {}", e)),
    }
}

// -- Tokens --

/// HS256 token whose subject is the user id, expiring after the configured
/// lifetime.
pub fn create_token(config: &AuthConfig, user_id: i64) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::minutes(config.token_expire_minutes))
            .timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?;

    Ok(token)
}

/// `None` for a bad signature, an expired token, or a malformed payload.
pub fn decode_token(config: &AuthConfig, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}

// -- Seeding --

/// Create an admin account unless the email is already registered.
/// Returns whether a user was created.
pub fn ensure_admin(db: &Database, name: &str, email: &str, password: &str) -> anyhow::Result<bool> {
    if db.get_user_by_email(email)?.is_some() {
        return Ok(false);
    }
    let password_hash = hash_password(password)?;
    let user = db.create_user(name, email, &password_hash, &[ROLE_ADMIN.to_string()])?;
    info!(user_id = user.id, email, "Admin user created");
    Ok(true)
}
