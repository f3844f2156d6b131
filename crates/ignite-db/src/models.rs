//! Database row types. These map directly to SQLite rows (joined columns
//! included). Distinct from ignite-types API models to keep the DB layer
//! independent.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub fn has_any_role(&self, allowed: &[&str]) -> bool {
        self.roles.iter().any(|r| allowed.contains(&r.as_str()))
    }
}

pub struct CategoryRow {
    pub id: i64,
    pub name: String,
}

/// An idea with its derived counts and display names.
pub struct IdeaRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category_id: i64,
    pub category_name: Option<String>,
    pub owner_id: Option<i64>,
    pub owner_name: Option<String>,
    pub status: String,
    pub score: f64,
    pub up_votes: i64,
    pub comments_count: i64,
    pub created_at: DateTime<Utc>,
}

pub struct CommentRow {
    pub id: i64,
    pub idea_id: i64,
    pub user_id: Option<i64>,
    pub user_name: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Vote totals for one idea after a vote was written.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoteCounts {
    pub up: i64,
    pub down: i64,
    pub score: f64,
}

/// Filters and pagination for idea listing. `None` filters match everything.
#[derive(Debug, Clone)]
pub struct IdeaFilter {
    pub owner_id: Option<i64>,
    pub category_id: Option<i64>,
    pub status: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

impl Default for IdeaFilter {
    fn default() -> Self {
        Self {
            owner_id: None,
            category_id: None,
            status: None,
            skip: 0,
            limit: 50,
        }
    }
}

/// Parse a timestamp written by SQLite's `strftime('%Y-%m-%d %H:%M:%f')`
/// (or `datetime('now')`) as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}

pub(crate) fn parse_roles(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("Corrupt roles column '{}': {}", raw, e);
        Vec::new()
    })
}
