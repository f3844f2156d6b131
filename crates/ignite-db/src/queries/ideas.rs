use anyhow::Result;
use rusqlite::{Connection, Row};

use ignite_types::models::DEFAULT_IDEA_STATUS;

use super::{NOW, OptionalExt};
use crate::Database;
use crate::models::{IdeaFilter, IdeaRow, parse_timestamp};

/// One pass over `ideas`: owner and category names come from joins, vote and
/// comment counts from correlated aggregates. No per-row follow-up queries.
const IDEA_SELECT: &str = "
    SELECT i.id, i.title, i.description, i.category_id, c.name,
           i.owner_id, u.name, i.status, i.score,
           (SELECT COUNT(*) FROM votes v WHERE v.idea_id = i.id AND v.type = 'up'),
           (SELECT COUNT(*) FROM comments cm WHERE cm.idea_id = i.id),
           i.created_at
    FROM ideas i
    LEFT JOIN categories c ON c.id = i.category_id
    LEFT JOIN users u ON u.id = i.owner_id";

impl Database {
    // -- Ideas --

    /// Insert an idea in the default status. The category id is stored as
    /// given, without checking that the category exists.
    pub fn create_idea(
        &self,
        title: &str,
        description: &str,
        category_id: i64,
        owner_id: i64,
    ) -> Result<IdeaRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO ideas (title, description, category_id, owner_id, status)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![title, description, category_id, owner_id, DEFAULT_IDEA_STATUS],
            )?;
            let id = conn.last_insert_rowid();
            query_idea(conn, id)?.ok_or_else(|| anyhow::anyhow!("Idea {} vanished after insert", id))
        })
    }

    /// Newest first, filtered and paginated.
    pub fn list_ideas(&self, filter: &IdeaFilter) -> Result<Vec<IdeaRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{IDEA_SELECT}
                 WHERE (?1 IS NULL OR i.owner_id = ?1)
                   AND (?2 IS NULL OR i.category_id = ?2)
                   AND (?3 IS NULL OR i.status = ?3)
                 ORDER BY i.created_at DESC, i.id DESC
                 LIMIT ?4 OFFSET ?5"
            ))?;

            let rows = stmt
                .query_map(
                    rusqlite::params![
                        filter.owner_id,
                        filter.category_id,
                        filter.status,
                        filter.limit.max(0),
                        filter.skip.max(0),
                    ],
                    map_idea,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn get_idea(&self, id: i64) -> Result<Option<IdeaRow>> {
        self.with_conn(|conn| query_idea(conn, id))
    }

    pub fn set_idea_status(&self, id: i64, status: &str) -> Result<Option<IdeaRow>> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                &format!("UPDATE ideas SET status = ?2, updated_at = {NOW} WHERE id = ?1"),
                rusqlite::params![id, status],
            )?;
            if updated == 0 {
                return Ok(None);
            }
            query_idea(conn, id)
        })
    }

    /// Hard delete; votes, comments and evaluations cascade.
    pub fn delete_idea(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM ideas WHERE id = ?1", [id])? > 0))
    }
}

pub(super) fn idea_exists(conn: &Connection, id: i64) -> Result<bool> {
    Ok(conn
        .query_row("SELECT 1 FROM ideas WHERE id = ?1", [id], |_| Ok(()))
        .optional()?
        .is_some())
}

fn query_idea(conn: &Connection, id: i64) -> Result<Option<IdeaRow>> {
    conn.query_row(&format!("{IDEA_SELECT} WHERE i.id = ?1"), [id], map_idea)
        .optional()
}

fn map_idea(row: &Row<'_>) -> rusqlite::Result<IdeaRow> {
    Ok(IdeaRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category_id: row.get(3)?,
        category_name: row.get(4)?,
        owner_id: row.get(5)?,
        owner_name: row.get(6)?,
        status: row.get(7)?,
        score: row.get(8)?,
        up_votes: row.get(9)?,
        comments_count: row.get(10)?,
        created_at: parse_timestamp(&row.get::<_, String>(11)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{db, user};

    #[test]
    fn new_idea_is_submitted_with_zero_counts() {
        let db = db();
        let ada = user(&db, "Ada");
        let cat = db.create_category("Ops").unwrap();

        let idea = db.create_idea("Title", "Body", cat.id, ada.id).unwrap();
        assert_eq!(idea.status, "Submitted");
        assert_eq!(idea.score, 0.0);
        assert_eq!(idea.up_votes, 0);
        assert_eq!(idea.comments_count, 0);
        assert_eq!(idea.owner_name.as_deref(), Some("Ada"));
        assert_eq!(idea.category_name.as_deref(), Some("Ops"));
    }

    #[test]
    fn dangling_category_is_accepted() {
        let db = db();
        let ada = user(&db, "Ada");
        let idea = db.create_idea("T", "D", 4242, ada.id).unwrap();
        assert_eq!(idea.category_id, 4242);
        assert!(idea.category_name.is_none());
    }

    #[test]
    fn deleting_a_category_orphans_its_ideas() {
        let db = db();
        let ada = user(&db, "Ada");
        let cat = db.create_category("Ops").unwrap();
        let idea = db.create_idea("T", "D", cat.id, ada.id).unwrap();

        assert!(db.delete_category(cat.id).unwrap());

        let orphan = db.get_idea(idea.id).unwrap().unwrap();
        assert_eq!(orphan.category_id, cat.id);
        assert!(orphan.category_name.is_none());
    }

    #[test]
    fn list_filters_and_paginates_newest_first() {
        let db = db();
        let ada = user(&db, "Ada");
        let bob = user(&db, "Bob");
        let a1 = db.create_idea("a1", "d", 1, ada.id).unwrap();
        let b1 = db.create_idea("b1", "d", 2, bob.id).unwrap();
        let a2 = db.create_idea("a2", "d", 2, ada.id).unwrap();
        db.set_idea_status(a2.id, "Approved").unwrap();

        let all: Vec<i64> = db
            .list_ideas(&IdeaFilter::default())
            .unwrap()
            .iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(all, vec![a2.id, b1.id, a1.id]);

        let by_owner = db
            .list_ideas(&IdeaFilter { owner_id: Some(ada.id), ..Default::default() })
            .unwrap();
        assert_eq!(by_owner.iter().map(|i| i.id).collect::<Vec<_>>(), vec![a2.id, a1.id]);

        let by_category = db
            .list_ideas(&IdeaFilter { category_id: Some(2), ..Default::default() })
            .unwrap();
        assert_eq!(by_category.len(), 2);

        let approved = db
            .list_ideas(&IdeaFilter { status: Some("Approved".into()), ..Default::default() })
            .unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id, a2.id);

        let page = db
            .list_ideas(&IdeaFilter { skip: 1, limit: 1, ..Default::default() })
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, b1.id);
    }

    #[test]
    fn zero_limit_and_large_skip_are_empty() {
        let db = db();
        let ada = user(&db, "Ada");
        db.create_idea("a", "d", 1, ada.id).unwrap();

        let none = db.list_ideas(&IdeaFilter { limit: 0, ..Default::default() }).unwrap();
        assert!(none.is_empty());

        let past_end = db.list_ideas(&IdeaFilter { skip: 10, ..Default::default() }).unwrap();
        assert!(past_end.is_empty());
    }

    #[test]
    fn deleting_the_owner_keeps_the_idea() {
        let db = db();
        let ada = user(&db, "Ada");
        let idea = db.create_idea("a", "d", 1, ada.id).unwrap();

        db.delete_user(ada.id).unwrap();

        let kept = db.get_idea(idea.id).unwrap().unwrap();
        assert!(kept.owner_id.is_none());
        assert!(kept.owner_name.is_none());
    }

    #[test]
    fn status_update_reports_missing_idea() {
        let db = db();
        assert!(db.set_idea_status(1, "Approved").unwrap().is_none());
    }
}
