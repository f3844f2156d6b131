use anyhow::Result;
use rusqlite::{Connection, Row};

use super::OptionalExt;
use crate::Database;
use crate::models::CategoryRow;

impl Database {
    // -- Categories --

    pub fn create_category(&self, name: &str) -> Result<CategoryRow> {
        self.with_conn(|conn| {
            conn.execute("INSERT INTO categories (name) VALUES (?1)", [name])?;
            Ok(CategoryRow {
                id: conn.last_insert_rowid(),
                name: name.to_string(),
            })
        })
    }

    /// All categories ordered by name.
    pub fn list_categories(&self) -> Result<Vec<CategoryRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY name ASC")?;
            let rows = stmt
                .query_map([], map_category)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_category(&self, id: i64) -> Result<Option<CategoryRow>> {
        self.with_conn(|conn| query_category(conn, id))
    }

    pub fn rename_category(&self, id: i64, name: &str) -> Result<Option<CategoryRow>> {
        self.with_conn(|conn| {
            if conn.execute("UPDATE categories SET name = ?2 WHERE id = ?1", (id, name))? == 0 {
                return Ok(None);
            }
            query_category(conn, id)
        })
    }

    /// Ideas referencing the category are left in place (orphaned).
    pub fn delete_category(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM categories WHERE id = ?1", [id])? > 0))
    }
}

fn query_category(conn: &Connection, id: i64) -> Result<Option<CategoryRow>> {
    conn.query_row("SELECT id, name FROM categories WHERE id = ?1", [id], map_category)
        .optional()
}

fn map_category(row: &Row<'_>) -> rusqlite::Result<CategoryRow> {
    Ok(CategoryRow {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::is_unique_violation;
    use crate::queries::test_support::db;

    #[test]
    fn categories_list_by_name() {
        let db = db();
        db.create_category("Sustainability").unwrap();
        db.create_category("Automation").unwrap();
        db.create_category("Culture").unwrap();

        let names: Vec<String> = db.list_categories().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Automation", "Culture", "Sustainability"]);
    }

    #[test]
    fn duplicate_name_is_a_unique_violation() {
        let db = db();
        db.create_category("Ops").unwrap();
        let err = db.create_category("Ops").err().unwrap();
        assert!(is_unique_violation(&err));
    }

    #[test]
    fn rename_and_delete_report_missing_ids() {
        let db = db();
        let cat = db.create_category("Ops").unwrap();

        let renamed = db.rename_category(cat.id, "Operations").unwrap().unwrap();
        assert_eq!(renamed.name, "Operations");
        assert!(db.rename_category(cat.id + 100, "x").unwrap().is_none());

        assert!(db.delete_category(cat.id).unwrap());
        assert!(!db.delete_category(cat.id).unwrap());
        assert!(db.get_category(cat.id).unwrap().is_none());
    }
}
