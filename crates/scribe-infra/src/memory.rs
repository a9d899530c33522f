//! In-memory store implementing every repository port.
//!
//! Used when `DATABASE_URL` is unset and by the web app's tests. Data is lost
//! on restart. Uniqueness (usernames, group slugs) and delete cascades follow
//! the Postgres schema.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use scribe_core::domain::{
    Comment, CommentView, Group, Page, PageRequest, Post, PostView, User,
};
use scribe_core::error::RepoError;
use scribe_core::ports::{
    BaseRepository, CommentRepository, GroupRepository, PostRepository, UserRepository,
};

/// Rows in insertion order.
#[derive(Default)]
pub struct Tables {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
}

impl Tables {
    fn username(&self, user_id: Uuid) -> String {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }

    fn post_view(&self, post: &Post) -> PostView {
        PostView {
            post: post.clone(),
            author: self.username(post.author_id),
            group: post
                .group_id
                .and_then(|id| self.groups.iter().find(|g| g.id == id).cloned()),
        }
    }

    /// Matching posts, newest first; ties go to the later insert.
    fn posts_newest_first(&self, keep: impl Fn(&Post) -> bool) -> Vec<PostView> {
        let mut posts: Vec<&Post> = self.posts.iter().rev().filter(|p| keep(p)).collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts.into_iter().map(|p| self.post_view(p)).collect()
    }
}

/// A row type the store keeps a table of.
pub trait Stored: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
    fn rows(tables: &Tables) -> &Vec<Self>;
    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self>;

    /// A unique or foreign-key violation this row would cause, if any.
    fn conflict(&self, _tables: &Tables) -> Option<String> {
        None
    }

    /// Remove rows that reference the deleted row.
    fn cascade(_tables: &mut Tables, _id: Uuid) {}
}

impl Stored for User {
    fn id(&self) -> Uuid {
        self.id
    }
    fn rows(tables: &Tables) -> &Vec<Self> {
        &tables.users
    }
    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.users
    }
    fn conflict(&self, tables: &Tables) -> Option<String> {
        tables
            .users
            .iter()
            .any(|u| u.username == self.username && u.id != self.id)
            .then(|| format!("username {:?} is taken", self.username))
    }
    fn cascade(tables: &mut Tables, id: Uuid) {
        tables.comments.retain(|c| c.author_id != id);
        let gone: Vec<Uuid> = tables
            .posts
            .iter()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in gone {
            Post::cascade(tables, post_id);
        }
        tables.posts.retain(|p| p.author_id != id);
    }
}

impl Stored for Group {
    fn id(&self) -> Uuid {
        self.id
    }
    fn rows(tables: &Tables) -> &Vec<Self> {
        &tables.groups
    }
    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.groups
    }
    fn conflict(&self, tables: &Tables) -> Option<String> {
        tables
            .groups
            .iter()
            .any(|g| g.slug == self.slug && g.id != self.id)
            .then(|| format!("group slug {:?} is taken", self.slug))
    }
    fn cascade(tables: &mut Tables, id: Uuid) {
        let gone: Vec<Uuid> = tables
            .posts
            .iter()
            .filter(|p| p.group_id == Some(id))
            .map(|p| p.id)
            .collect();
        for post_id in gone {
            Post::cascade(tables, post_id);
        }
        tables.posts.retain(|p| p.group_id != Some(id));
    }
}

impl Stored for Post {
    fn id(&self) -> Uuid {
        self.id
    }
    fn rows(tables: &Tables) -> &Vec<Self> {
        &tables.posts
    }
    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.posts
    }
    fn conflict(&self, tables: &Tables) -> Option<String> {
        if !tables.users.iter().any(|u| u.id == self.author_id) {
            return Some(format!("author {} does not exist", self.author_id));
        }
        match self.group_id {
            Some(group_id) if !tables.groups.iter().any(|g| g.id == group_id) => {
                Some(format!("group {group_id} does not exist"))
            }
            _ => None,
        }
    }
    fn cascade(tables: &mut Tables, id: Uuid) {
        tables.comments.retain(|c| c.post_id != id);
    }
}

impl Stored for Comment {
    fn id(&self) -> Uuid {
        self.id
    }
    fn rows(tables: &Tables) -> &Vec<Self> {
        &tables.comments
    }
    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.comments
    }
    fn conflict(&self, tables: &Tables) -> Option<String> {
        if !tables.posts.iter().any(|p| p.id == self.post_id) {
            return Some(format!("post {} does not exist", self.post_id));
        }
        (!tables.users.iter().any(|u| u.id == self.author_id))
            .then(|| format!("author {} does not exist", self.author_id))
    }
}

pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Stored> BaseRepository<T, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let tables = self.tables.read().await;
        Ok(T::rows(&tables).iter().find(|row| row.id() == id).cloned())
    }

    async fn insert(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        if T::rows(&tables).iter().any(|row| row.id() == entity.id()) {
            return Err(RepoError::Constraint(format!("duplicate id {}", entity.id())));
        }
        if let Some(conflict) = entity.conflict(&tables) {
            return Err(RepoError::Constraint(conflict));
        }
        T::rows_mut(&mut tables).push(entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        if let Some(conflict) = entity.conflict(&tables) {
            return Err(RepoError::Constraint(conflict));
        }
        let row = T::rows_mut(&mut tables)
            .iter_mut()
            .find(|row| row.id() == entity.id())
            .ok_or(RepoError::NotFound)?;
        *row = entity.clone();
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let rows = T::rows_mut(&mut tables);
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        if rows.len() == before {
            return Err(RepoError::NotFound);
        }
        T::cascade(&mut tables, id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl GroupRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        let mut groups = self.tables.read().await.groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn page_all(&self, request: &PageRequest) -> Result<Page<PostView>, RepoError> {
        let tables = self.tables.read().await;
        Ok(request.slice(tables.posts_newest_first(|_| true)))
    }

    async fn page_by_group(
        &self,
        group_id: Uuid,
        request: &PageRequest,
    ) -> Result<Page<PostView>, RepoError> {
        let tables = self.tables.read().await;
        Ok(request.slice(tables.posts_newest_first(|p| p.group_id == Some(group_id))))
    }

    async fn page_by_author(
        &self,
        author_id: Uuid,
        request: &PageRequest,
    ) -> Result<Page<PostView>, RepoError> {
        let tables = self.tables.read().await;
        Ok(request.slice(tables.posts_newest_first(|p| p.author_id == author_id)))
    }

    async fn find_by_author_and_id(
        &self,
        username: &str,
        post_id: Uuid,
    ) -> Result<Option<PostView>, RepoError> {
        let tables = self.tables.read().await;
        let Some(author) = tables.users.iter().find(|u| u.username == username) else {
            return Ok(None);
        };
        Ok(tables
            .posts
            .iter()
            .find(|p| p.id == post_id && p.author_id == author.id)
            .map(|p| tables.post_view(p)))
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().filter(|p| p.author_id == author_id).count() as u64)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<&Comment> =
            tables.comments.iter().filter(|c| c.post_id == post_id).collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(comments
            .into_iter()
            .map(|c| CommentView {
                comment: c.clone(),
                author: tables.username(c.author_id),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (InMemoryStore, User, Group) {
        let store = InMemoryStore::new();
        let user = User::new("pavel".into(), "pavel@example.com".into(), "hash".into());
        let group = Group::new("Cats", "cats", None).unwrap();
        store.insert(user.clone()).await.unwrap();
        store.insert(group.clone()).await.unwrap();
        (store, user, group)
    }

    #[tokio::test]
    async fn test_usernames_and_slugs_are_unique() {
        let (store, _, _) = seeded().await;

        let twin = User::new("pavel".into(), "other@example.com".into(), "hash".into());
        assert!(matches!(
            store.insert(twin).await,
            Err(RepoError::Constraint(_))
        ));

        let twin = Group::new("More cats", "cats", None).unwrap();
        assert!(matches!(
            store.insert(twin).await,
            Err(RepoError::Constraint(_))
        ));
    }

    #[tokio::test]
    async fn test_pages_are_newest_first() {
        let (store, user, group) = seeded().await;
        for i in 0..11 {
            let group_id = (i % 2 == 0).then_some(group.id);
            store
                .insert(Post::new(user.id, format!("post {i}"), group_id))
                .await
                .unwrap();
        }

        let first = store.page_all(&PageRequest::first(10)).await.unwrap();
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.items[0].post.text, "post 10");
        assert_eq!(first.items[0].author, "pavel");

        let last = store
            .page_all(&PageRequest::new(Some("2".into()), 10))
            .await
            .unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].post.text, "post 0");

        let grouped = store
            .page_by_group(group.id, &PageRequest::first(8))
            .await
            .unwrap();
        assert_eq!(grouped.total_items, 6);
        assert!(grouped.items.iter().all(|v| v.group.as_ref() == Some(&group)));

        assert_eq!(store.count_by_author(user.id).await.unwrap(), 11);
    }

    #[tokio::test]
    async fn test_find_by_author_and_id_checks_author() {
        let (store, user, _) = seeded().await;
        let other = User::new("olga".into(), "olga@example.com".into(), "hash".into());
        store.insert(other).await.unwrap();

        let post = store
            .insert(Post::new(user.id, "mine".into(), None))
            .await
            .unwrap();

        assert!(store
            .find_by_author_and_id("pavel", post.id)
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_by_author_and_id("olga", post.id)
            .await
            .unwrap()
            .is_none());
        assert!(store
            .find_by_author_and_id("nobody", post.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_rows_must_reference_existing_rows() {
        let (store, user, _) = seeded().await;

        let orphan = Post::new(Uuid::new_v4(), "nobody wrote this".into(), None);
        assert!(matches!(
            store.insert(orphan).await,
            Err(RepoError::Constraint(_))
        ));

        let ungrouped = Post::new(user.id, "lost group".into(), Some(Uuid::new_v4()));
        assert!(matches!(
            store.insert(ungrouped).await,
            Err(RepoError::Constraint(_))
        ));

        let comment = Comment::new(Uuid::new_v4(), user.id, "on nothing".into());
        assert!(matches!(
            store.insert(comment).await,
            Err(RepoError::Constraint(_))
        ));
    }

    #[tokio::test]
    async fn test_update_missing_row() {
        let (store, user, _) = seeded().await;
        let ghost = Post::new(user.id, "ghost".into(), None);
        assert!(matches!(store.update(ghost).await, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_comments_oldest_first_and_cascade() {
        let (store, user, _) = seeded().await;
        let post = store
            .insert(Post::new(user.id, "post".into(), None))
            .await
            .unwrap();
        store
            .insert(Comment::new(post.id, user.id, "first".into()))
            .await
            .unwrap();
        store
            .insert(Comment::new(post.id, user.id, "second".into()))
            .await
            .unwrap();

        let comments = store.list_for_post(post.id).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].comment.text, "first");
        assert_eq!(comments[0].author, "pavel");

        BaseRepository::<Post, Uuid>::delete(&store, post.id)
            .await
            .unwrap();
        assert!(store.list_for_post(post.id).await.unwrap().is_empty());
    }
}
