use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, CommentView, Group, Page, PageRequest, Post, PostView, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity; `RepoError::NotFound` if it is gone.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

#[async_trait]
pub trait GroupRepository: BaseRepository<Group, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    /// All groups ordered by title, for the post form.
    async fn list(&self) -> Result<Vec<Group>, RepoError>;
}

/// Post repository. Every listing is newest first.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn page_all(&self, request: &PageRequest) -> Result<Page<PostView>, RepoError>;

    async fn page_by_group(
        &self,
        group_id: Uuid,
        request: &PageRequest,
    ) -> Result<Page<PostView>, RepoError>;

    async fn page_by_author(
        &self,
        author_id: Uuid,
        request: &PageRequest,
    ) -> Result<Page<PostView>, RepoError>;

    /// Look a post up by author username and id; `None` if either does not match.
    async fn find_by_author_and_id(
        &self,
        username: &str,
        post_id: Uuid,
    ) -> Result<Option<PostView>, RepoError>;

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments on a post, oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError>;
}
