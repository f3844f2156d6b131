use std::sync::Arc;

use tracing::error;

use ignite_db::Database;

use crate::config::AuthConfig;
use crate::error::{ApiError, ApiResult};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub auth: AuthConfig,
}

impl AppStateInner {
    pub fn new(db: Database, auth: AuthConfig) -> AppState {
        Arc::new(Self { db, auth })
    }
}

/// Run blocking database work off the async runtime. The closure may fail
/// with a plain store error (reported as internal) or a ready [`ApiError`].
pub(crate) async fn with_db<F, T, E>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&Database) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("blocking task failed: {}", e))
        })?
        .map_err(Into::into)
}
