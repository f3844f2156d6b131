use anyhow::Result;
use rusqlite::Connection;
use tracing::debug;

use ignite_types::models::VoteType;

use super::NOW;
use super::ideas::idea_exists;
use crate::Database;
use crate::models::VoteCounts;

impl Database {
    // -- Votes --

    /// Record `user_id`'s vote on `idea_id`, replacing any earlier vote by the
    /// same user, and persist the recomputed score. Returns `None` when the
    /// idea does not exist.
    ///
    /// The upsert and the rescore run in one transaction against the
    /// `UNIQUE(idea_id, user_id)` constraint, so concurrent votes by the same
    /// user can never produce a second row.
    pub fn cast_vote(
        &self,
        idea_id: i64,
        user_id: i64,
        vote_type: VoteType,
    ) -> Result<Option<VoteCounts>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if !idea_exists(&tx, idea_id)? {
                return Ok(None);
            }

            tx.execute(
                "INSERT INTO votes (idea_id, user_id, type) VALUES (?1, ?2, ?3)
                 ON CONFLICT(idea_id, user_id) DO UPDATE SET type = excluded.type",
                rusqlite::params![idea_id, user_id, vote_type.as_str()],
            )?;

            let counts = recompute_score(&tx, idea_id)?;
            tx.commit()?;

            debug!(idea_id, user_id, vote = %vote_type, score = counts.score, "Vote recorded");
            Ok(Some(counts))
        })
    }
}

/// Recount up/down votes for an idea and store `up - down` as its score.
pub(super) fn recompute_score(conn: &Connection, idea_id: i64) -> Result<VoteCounts> {
    let (up, down): (i64, i64) = conn.query_row(
        "SELECT COALESCE(SUM(type = 'up'), 0), COALESCE(SUM(type = 'down'), 0)
         FROM votes WHERE idea_id = ?1",
        [idea_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let score = (up - down) as f64;
    conn.execute(
        &format!("UPDATE ideas SET score = ?2, updated_at = {NOW} WHERE id = ?1"),
        rusqlite::params![idea_id, score],
    )?;

    Ok(VoteCounts { up, down, score })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{db, user};

    fn vote_rows(db: &Database, idea_id: i64, user_id: i64) -> i64 {
        db.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM votes WHERE idea_id = ?1 AND user_id = ?2",
                [idea_id, user_id],
                |r| r.get(0),
            )?)
        })
        .unwrap()
    }

    #[test]
    fn single_up_vote_scores_one() {
        let db = db();
        let ada = user(&db, "Ada");
        let idea = db.create_idea("t", "d", 1, ada.id).unwrap();

        let counts = db.cast_vote(idea.id, ada.id, VoteType::Up).unwrap().unwrap();
        assert_eq!(counts, VoteCounts { up: 1, down: 0, score: 1.0 });

        let stored = db.get_idea(idea.id).unwrap().unwrap();
        assert_eq!(stored.score, 1.0);
        assert_eq!(stored.up_votes, 1);
    }

    #[test]
    fn revote_replaces_instead_of_adding() {
        let db = db();
        let ada = user(&db, "Ada");
        let idea = db.create_idea("t", "d", 1, ada.id).unwrap();

        db.cast_vote(idea.id, ada.id, VoteType::Up).unwrap();
        let counts = db.cast_vote(idea.id, ada.id, VoteType::Down).unwrap().unwrap();

        assert_eq!(counts, VoteCounts { up: 0, down: 1, score: -1.0 });
        assert_eq!(vote_rows(&db, idea.id, ada.id), 1);
        assert_eq!(db.get_idea(idea.id).unwrap().unwrap().score, -1.0);
    }

    #[test]
    fn score_is_ups_minus_downs_across_users() {
        for (ups, downs) in [(0usize, 0usize), (3, 0), (0, 2), (4, 7), (5, 5)] {
            let db = db();
            let owner = user(&db, "Owner");
            let idea = db.create_idea("t", "d", 1, owner.id).unwrap();

            let mut last = None;
            for n in 0..ups {
                let u = user(&db, &format!("Up{n}"));
                last = db.cast_vote(idea.id, u.id, VoteType::Up).unwrap();
            }
            for n in 0..downs {
                let u = user(&db, &format!("Down{n}"));
                last = db.cast_vote(idea.id, u.id, VoteType::Down).unwrap();
            }

            let expected = ups as f64 - downs as f64;
            if let Some(counts) = last {
                assert_eq!(counts.up, ups as i64);
                assert_eq!(counts.down, downs as i64);
                assert_eq!(counts.score, expected);
            }
            assert_eq!(db.get_idea(idea.id).unwrap().unwrap().score, expected);
        }
    }

    #[test]
    fn vote_on_missing_idea_is_none() {
        let db = db();
        let ada = user(&db, "Ada");
        assert!(db.cast_vote(77, ada.id, VoteType::Up).unwrap().is_none());
    }

    #[test]
    fn deleting_a_voter_rescores_the_idea() {
        let db = db();
        let owner = user(&db, "Owner");
        let fan = user(&db, "Fan");
        let idea = db.create_idea("t", "d", 1, owner.id).unwrap();

        db.cast_vote(idea.id, fan.id, VoteType::Up).unwrap();
        db.cast_vote(idea.id, owner.id, VoteType::Up).unwrap();
        assert_eq!(db.get_idea(idea.id).unwrap().unwrap().score, 2.0);

        db.delete_user(fan.id).unwrap();

        let idea = db.get_idea(idea.id).unwrap().unwrap();
        assert_eq!(idea.score, 1.0);
        assert_eq!(idea.up_votes, 1);
    }
}
