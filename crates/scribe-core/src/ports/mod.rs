//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod cache;
mod repository;
mod storage;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use cache::{Cache, CacheError};
pub use repository::{
    BaseRepository, CommentRepository, GroupRepository, PostRepository, UserRepository,
};
pub use storage::{MediaStorage, StorageError};
