//! # Scribe Infrastructure
//!
//! Concrete implementations of the ports defined in `scribe-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - PostgreSQL repositories via SeaORM
//! - `auth` - JWT session tokens + Argon2 password hashing

pub mod cache;
pub mod database;
pub mod fixtures;
pub mod memory;
pub mod storage;

#[cfg(feature = "auth")]
pub mod auth;

pub use cache::InMemoryCache;
pub use memory::InMemoryStore;
pub use storage::LocalMediaStorage;

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
