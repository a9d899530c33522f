//! Application state - shared across all handlers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use scribe_core::ports::{
    Cache, CommentRepository, GroupRepository, MediaStorage, PasswordService, PostRepository,
    TokenService, UserRepository,
};
use scribe_infra::fixtures::seed_groups_from_file;
use scribe_infra::{
    Argon2PasswordService, InMemoryCache, InMemoryStore, JwtTokenService, LocalMediaStorage,
};

use crate::config::AppConfig;

#[cfg(feature = "postgres")]
use scribe_infra::database::{
    self, PostgresCommentRepository, PostgresGroupRepository, PostgresPostRepository,
    PostgresUserRepository,
};

/// Where posts, users and comments are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Postgres,
    InMemory,
}

impl StorageMode {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageMode::Postgres => "postgres",
            StorageMode::InMemory => "in-memory",
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<dyn Cache>,
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub media: Arc<dyn MediaStorage>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub index_cache_ttl: Duration,
    pub session_cookie_secure: bool,
    pub storage: StorageMode,
}

impl AppState {
    /// State backed entirely by in-process stores.
    pub fn in_memory(
        media_root: impl Into<PathBuf>,
        tokens: Arc<dyn TokenService>,
        index_cache_ttl: Duration,
    ) -> Self {
        let store = Arc::new(InMemoryStore::new());

        Self {
            cache: Arc::new(InMemoryCache::new()),
            users: store.clone(),
            groups: store.clone(),
            posts: store.clone(),
            comments: store,
            media: Arc::new(LocalMediaStorage::new(media_root)),
            tokens,
            passwords: Arc::new(Argon2PasswordService::new()),
            index_cache_ttl,
            session_cookie_secure: false,
            storage: StorageMode::InMemory,
        }
    }

    /// Build the application state with appropriate implementations.
    pub async fn build(config: &AppConfig) -> anyhow::Result<Self> {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::from_env());
        let mut state = Self::in_memory(&config.media_root, tokens, config.index_cache_ttl);
        state.session_cookie_secure = config.session_cookie_secure;

        #[cfg(feature = "postgres")]
        if let Some(db_config) = &config.database {
            use migration::MigratorTrait;

            let conn = database::connect(db_config).await?;
            if db_config.auto_migrate {
                migration::Migrator::up(&conn, None).await?;
                tracing::info!("Database migrations applied");
            }

            state.users = Arc::new(PostgresUserRepository::new(conn.clone()));
            state.groups = Arc::new(PostgresGroupRepository::new(conn.clone()));
            state.posts = Arc::new(PostgresPostRepository::new(conn.clone()));
            state.comments = Arc::new(PostgresCommentRepository::new(conn));
            state.storage = StorageMode::Postgres;
        }

        if state.storage == StorageMode::InMemory {
            tracing::warn!("No database configured. Data lives in memory and is lost on restart.");
        }

        if let Some(path) = &config.seed_groups {
            let created = seed_groups_from_file(state.groups.as_ref(), path).await?;
            tracing::info!(created, path = %path.display(), "Group fixtures loaded");
        }

        tracing::info!(storage = state.storage.as_str(), "Application state initialized");
        Ok(state)
    }
}
