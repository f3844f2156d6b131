use anyhow::Result;
use rusqlite::{Connection, Row};
use tracing::debug;

use ignite_types::patch::UserChanges;

use super::{NOW, OptionalExt};
use crate::Database;
use crate::models::{UserRow, parse_roles, parse_timestamp};

const USER_COLUMNS: &str = "id, name, email, password_hash, roles, created_at, updated_at";

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        roles: &[String],
    ) -> Result<UserRow> {
        let roles_json = serde_json::to_string(roles)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (name, email, password_hash, roles) VALUES (?1, ?2, ?3, ?4)",
                (name, email, password_hash, &roles_json),
            )?;
            let id = conn.last_insert_rowid();
            query_user_by_id(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("User {} vanished after insert", id))
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                [email],
                map_user,
            )
            .optional()
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    /// All users, newest first.
    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt
                .query_map([], map_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Apply a validated change set. Returns `None` if the user does not exist.
    pub fn update_user(&self, id: i64, changes: &UserChanges) -> Result<Option<UserRow>> {
        let roles_json = changes.roles.as_ref().map(serde_json::to_string).transpose()?;

        self.with_conn(|conn| {
            let updated = conn.execute(
                &format!(
                    "UPDATE users SET
                        name = COALESCE(?2, name),
                        email = COALESCE(?3, email),
                        roles = COALESCE(?4, roles),
                        updated_at = {NOW}
                     WHERE id = ?1"
                ),
                rusqlite::params![id, changes.name, changes.email, roles_json],
            )?;
            if updated == 0 {
                return Ok(None);
            }
            query_user_by_id(conn, id)
        })
    }

    /// Hard-delete a user. Their comments are kept with a null author, their
    /// ideas lose their owner, and their votes are removed; the scores of the
    /// ideas they voted on are recomputed in the same transaction.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let voted_ideas: Vec<i64> = {
                let mut stmt = tx.prepare("SELECT idea_id FROM votes WHERE user_id = ?1")?;
                let ids = stmt
                    .query_map([id], |row| row.get(0))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                ids
            };

            if tx.execute("DELETE FROM users WHERE id = ?1", [id])? == 0 {
                return Ok(false);
            }

            for idea_id in &voted_ideas {
                super::votes::recompute_score(&tx, *idea_id)?;
            }

            tx.commit()?;
            debug!(user_id = id, rescored = voted_ideas.len(), "User deleted");
            Ok(true)
        })
    }
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        [id],
        map_user,
    )
    .optional()
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        roles: parse_roles(&row.get::<_, String>(4)?),
        created_at: parse_timestamp(&row.get::<_, String>(5)?),
        updated_at: parse_timestamp(&row.get::<_, String>(6)?),
    })
}
