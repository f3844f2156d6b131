use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- JWT Claims --

/// Access-token payload. `sub` carries the user id as a decimal string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserOut {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
}

// -- Categories --

#[derive(Debug, Deserialize)]
pub struct CategoryIn {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryOut {
    pub id: i64,
    pub name: String,
}

// -- Ideas --

#[derive(Debug, Deserialize)]
pub struct CreateIdeaRequest {
    pub title: String,
    pub description: String,
    pub category_id: i64,
    /// Accepted for compatibility with existing clients; not persisted.
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdeaOut {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub owner_id: Option<i64>,
    pub owner_name: Option<String>,
    pub status: String,
    pub score: f64,
    /// Up-vote count.
    pub votes: i64,
    pub comments_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

// -- Comments --

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentOut {
    pub id: i64,
    pub idea_id: i64,
    pub user_id: Option<i64>,
    pub user_name: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// -- Votes --

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    #[serde(rename = "type")]
    pub vote_type: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VoteTally {
    /// Up-vote count.
    pub votes: i64,
    pub downs: i64,
    pub score: f64,
}

// -- Misc --

#[derive(Debug, Serialize, Deserialize)]
pub struct DetailResponse {
    pub detail: String,
}

impl DetailResponse {
    pub fn deleted() -> Self {
        Self {
            detail: "deleted".to_string(),
        }
    }
}
