use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// JWT secrets that must never be used outside a throwaway checkout.
const PLACEHOLDER_SECRETS: &[&str] = &["SECRET_KEY", "change-me", "dev-secret-change-me"];

const DEFAULT_TOKEN_EXPIRE_MINUTES: i64 = 1440;

/// Token signing parameters, fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_expire_minutes: i64,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_expire_minutes: DEFAULT_TOKEN_EXPIRE_MINUTES,
        }
    }
}

/// Process configuration, read once at startup.
///
/// | Env Var                       | Default     |
/// |-------------------------------|-------------|
/// | `IGNITE_JWT_SECRET`           | required    |
/// | `IGNITE_TOKEN_EXPIRE_MINUTES` | `1440`      |
/// | `IGNITE_DB_PATH`              | `ignite.db` |
/// | `IGNITE_HOST`                 | `0.0.0.0`   |
/// | `IGNITE_PORT`                 | `8000`      |
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Database location alone, for tools that never sign tokens.
    pub fn db_path_from_env() -> PathBuf {
        db_path(std::env::var("IGNITE_DB_PATH").ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = get("IGNITE_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("IGNITE_JWT_SECRET is unset or still a placeholder");
        }

        let token_expire_minutes = match get("IGNITE_TOKEN_EXPIRE_MINUTES") {
            Some(v) => v
                .parse()
                .context("IGNITE_TOKEN_EXPIRE_MINUTES must be an integer")?,
            None => DEFAULT_TOKEN_EXPIRE_MINUTES,
        };
        if token_expire_minutes <= 0 {
            bail!("IGNITE_TOKEN_EXPIRE_MINUTES must be positive");
        }

        let port = get("IGNITE_PORT")
            .unwrap_or_else(|| "8000".into())
            .parse()
            .context("IGNITE_PORT must be a valid port")?;

        Ok(Self {
            host: get("IGNITE_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: db_path(get("IGNITE_DB_PATH")),
            auth: AuthConfig {
                jwt_secret,
                token_expire_minutes,
            },
        })
    }
}

fn db_path(value: Option<String>) -> PathBuf {
    value.unwrap_or_else(|| "ignite.db".into()).into()
}
