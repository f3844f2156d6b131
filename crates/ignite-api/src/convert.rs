//! Row-to-wire conversions (enrichment already happened in the store query).

use ignite_db::models::{CategoryRow, CommentRow, IdeaRow, UserRow, VoteCounts};
use ignite_types::api::{CategoryOut, CommentOut, IdeaOut, UserOut, VoteTally};

pub fn user_out(row: UserRow) -> UserOut {
    UserOut {
        id: row.id,
        name: row.name,
        email: row.email,
        roles: row.roles,
    }
}

pub fn category_out(row: CategoryRow) -> CategoryOut {
    CategoryOut {
        id: row.id,
        name: row.name,
    }
}

pub fn idea_out(row: IdeaRow) -> IdeaOut {
    IdeaOut {
        id: row.id,
        title: row.title,
        description: row.description,
        category_id: Some(row.category_id),
        category_name: row.category_name,
        owner_id: row.owner_id,
        owner_name: row.owner_name,
        status: row.status,
        score: row.score,
        votes: row.up_votes,
        comments_count: row.comments_count,
        created_at: row.created_at,
    }
}

pub fn comment_out(row: CommentRow) -> CommentOut {
    CommentOut {
        id: row.id,
        idea_id: row.idea_id,
        user_id: row.user_id,
        user_name: row.user_name,
        content: row.content,
        created_at: row.created_at,
    }
}

pub fn vote_tally(counts: VoteCounts) -> VoteTally {
    VoteTally {
        votes: counts.up,
        downs: counts.down,
        score: counts.score,
    }
}
