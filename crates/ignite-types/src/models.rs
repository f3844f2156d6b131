use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// -- Roles --

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";
pub const ROLE_EVALUATOR: &str = "evaluator";

/// Status every idea starts in. Later values are free-form strings.
pub const DEFAULT_IDEA_STATUS: &str = "Submitted";

// -- Votes --

/// Direction of a vote. The wire vocabulary is exactly `"up"` / `"down"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Up,
    Down,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidVoteType(pub String);

impl fmt::Display for InvalidVoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid vote type '{}'", self.0)
    }
}

impl std::error::Error for InvalidVoteType {}

impl FromStr for VoteType {
    type Err = InvalidVoteType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(InvalidVoteType(other.to_string())),
        }
    }
}
