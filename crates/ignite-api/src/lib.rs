pub mod admin;
pub mod auth;
pub mod categories;
pub mod comments;
pub mod config;
pub mod convert;
pub mod error;
pub mod ideas;
pub mod middleware;
pub mod router;
pub mod state;
pub mod votes;

pub use router::build_router;
pub use state::{AppState, AppStateInner};
