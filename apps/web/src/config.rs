//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use scribe_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    /// Directory uploads are written to and `/media` is served from.
    pub media_root: PathBuf,
    /// How long a rendered feed page stays in the cache.
    pub index_cache_ttl: Duration,
    /// JSON fixture of groups to insert at startup.
    pub seed_groups: Option<PathBuf>,
    pub session_cookie_secure: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| {
            let mut config = DatabaseConfig::new(url);
            if let Some(max) = parsed("DB_MAX_CONNECTIONS") {
                config.max_connections = max;
            }
            if let Some(min) = parsed("DB_MIN_CONNECTIONS") {
                config.min_connections = min;
            }
            config.auto_migrate = flag("DB_AUTO_MIGRATE").unwrap_or(config.auto_migrate);
            config
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT").unwrap_or(8080),
            database,
            media_root: env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("media")),
            index_cache_ttl: Duration::from_secs(parsed("INDEX_CACHE_SECONDS").unwrap_or(20)),
            seed_groups: env::var("SEED_GROUPS").ok().map(PathBuf::from),
            session_cookie_secure: flag("SESSION_COOKIE_SECURE").unwrap_or(false),
        }
    }
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

fn flag(key: &str) -> Option<bool> {
    env::var(key)
        .ok()
        .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no" | ""))
}
