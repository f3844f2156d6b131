use anyhow::Result;
use rusqlite::{Connection, Row};

use super::OptionalExt;
use super::ideas::idea_exists;
use crate::Database;
use crate::models::{CommentRow, parse_timestamp};

const COMMENT_SELECT: &str = "
    SELECT cm.id, cm.idea_id, cm.user_id, u.name, cm.content, cm.created_at
    FROM comments cm
    LEFT JOIN users u ON u.id = cm.user_id";

impl Database {
    // -- Comments --

    /// Comments on an idea, oldest first, with the author's name (null once
    /// the author has been deleted).
    pub fn list_comments(&self, idea_id: i64) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{COMMENT_SELECT} WHERE cm.idea_id = ?1 ORDER BY cm.created_at ASC, cm.id ASC"
            ))?;
            let rows = stmt
                .query_map([idea_id], map_comment)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Insert a comment and read it back inside a single transaction. Any
    /// failure rolls the whole operation back. Returns `None` when the idea
    /// does not exist.
    pub fn create_comment(
        &self,
        idea_id: i64,
        user_id: i64,
        content: &str,
    ) -> Result<Option<CommentRow>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if !idea_exists(&tx, idea_id)? {
                return Ok(None);
            }

            tx.execute(
                "INSERT INTO comments (idea_id, user_id, content) VALUES (?1, ?2, ?3)",
                rusqlite::params![idea_id, user_id, content],
            )?;
            let id = tx.last_insert_rowid();
            let row = query_comment(&tx, id)?
                .ok_or_else(|| anyhow::anyhow!("Comment {} vanished after insert", id))?;

            tx.commit()?;
            Ok(Some(row))
        })
    }
}

fn query_comment(conn: &Connection, id: i64) -> Result<Option<CommentRow>> {
    conn.query_row(&format!("{COMMENT_SELECT} WHERE cm.id = ?1"), [id], map_comment)
        .optional()
}

fn map_comment(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        idea_id: row.get(1)?,
        user_id: row.get(2)?,
        user_name: row.get(3)?,
        content: row.get(4)?,
        created_at: parse_timestamp(&row.get::<_, String>(5)?),
    })
}

#[cfg(test)]
mod tests {
    use crate::queries::test_support::{db, user};

    #[test]
    fn comments_are_oldest_first_with_author_names() {
        let db = db();
        let ada = user(&db, "Ada");
        let bob = user(&db, "Bob");
        let idea = db.create_idea("t", "d", 1, ada.id).unwrap();

        let first = db.create_comment(idea.id, bob.id, "first").unwrap().unwrap();
        let second = db.create_comment(idea.id, ada.id, "second").unwrap().unwrap();
        assert_eq!(first.user_name.as_deref(), Some("Bob"));

        let listed = db.list_comments(idea.id).unwrap();
        assert_eq!(listed.iter().map(|c| c.id).collect::<Vec<_>>(), vec![first.id, second.id]);
        assert_eq!(listed[1].user_name.as_deref(), Some("Ada"));

        assert_eq!(db.get_idea(idea.id).unwrap().unwrap().comments_count, 2);
    }

    #[test]
    fn comment_on_missing_idea_is_none_and_writes_nothing() {
        let db = db();
        let ada = user(&db, "Ada");
        assert!(db.create_comment(5, ada.id, "hello").unwrap().is_none());
        assert!(db.list_comments(5).unwrap().is_empty());
    }

    #[test]
    fn failed_insert_rolls_back() {
        let db = db();
        let ada = user(&db, "Ada");
        let idea = db.create_idea("t", "d", 1, ada.id).unwrap();

        // Unknown author violates the users foreign key.
        assert!(db.create_comment(idea.id, 9999, "ghost").is_err());
        assert!(db.list_comments(idea.id).unwrap().is_empty());
    }

    #[test]
    fn deleted_author_leaves_comment_with_null_name() {
        let db = db();
        let ada = user(&db, "Ada");
        let bob = user(&db, "Bob");
        let idea = db.create_idea("t", "d", 1, ada.id).unwrap();
        db.create_comment(idea.id, bob.id, "hi").unwrap();

        db.delete_user(bob.id).unwrap();

        let listed = db.list_comments(idea.id).unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].user_id.is_none());
        assert!(listed[0].user_name.is_none());
    }

    #[test]
    fn deleting_an_idea_removes_its_comments() {
        let db = db();
        let ada = user(&db, "Ada");
        let idea = db.create_idea("t", "d", 1, ada.id).unwrap();
        db.create_comment(idea.id, ada.id, "hi").unwrap();

        assert!(db.delete_idea(idea.id).unwrap());

        assert!(db.list_comments(idea.id).unwrap().is_empty());
        let orphans: i64 = db
            .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM comments", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(orphans, 0);
    }
}
