use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT NOT NULL,
                email           TEXT NOT NULL UNIQUE,
                password_hash   TEXT NOT NULL,
                roles           TEXT NOT NULL DEFAULT '[]',
                created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
                updated_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
            );

            CREATE TABLE categories (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                name    TEXT NOT NULL UNIQUE
            );

            -- No foreign key on category_id: ideas may reference a missing
            -- category and outlive a deleted one.
            CREATE TABLE ideas (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                description     TEXT NOT NULL,
                category_id     INTEGER NOT NULL,
                owner_id        INTEGER REFERENCES users(id) ON DELETE SET NULL,
                status          TEXT NOT NULL DEFAULT 'Submitted',
                score           REAL NOT NULL DEFAULT 0.0,
                created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
                updated_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
            );

            CREATE INDEX idx_ideas_created ON ideas(created_at);
            CREATE INDEX idx_ideas_owner ON ideas(owner_id);
            CREATE INDEX idx_ideas_category ON ideas(category_id);

            CREATE TABLE votes (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                idea_id     INTEGER NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
                user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                type        TEXT NOT NULL CHECK (type IN ('up', 'down')),
                created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
                UNIQUE(idea_id, user_id)
            );

            CREATE INDEX idx_votes_user ON votes(user_id);

            CREATE TABLE comments (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                idea_id     INTEGER NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
                user_id     INTEGER REFERENCES users(id) ON DELETE SET NULL,
                content     TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
            );

            CREATE INDEX idx_comments_idea ON comments(idea_id, created_at);

            CREATE TABLE evaluations (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                idea_id     INTEGER NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
                user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                criteria    TEXT NOT NULL,
                total_score REAL NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
            );

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
