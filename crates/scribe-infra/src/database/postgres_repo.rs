//! PostgreSQL repository implementations.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sea_orm::{ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use scribe_core::domain::{CommentView, Group, Page, PageRequest, PostView, User};
use scribe_core::error::RepoError;
use scribe_core::ports::{CommentRepository, GroupRepository, PostRepository, UserRepository};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::group::{self, Entity as GroupEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error};

pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;
pub type PostgresGroupRepository = PostgresBaseRepository<GroupEntity>;
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

fn distinct(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

/// Usernames for a set of user ids, in one query.
async fn usernames(db: &sea_orm::DbConn, ids: Vec<Uuid>) -> Result<HashMap<Uuid, String>, RepoError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = UserEntity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(query_error)?;
    Ok(users.into_iter().map(|u| (u.id, u.username)).collect())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let result = GroupEntity::find()
            .filter(group::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        let result = GroupEntity::find()
            .order_by_asc(group::Column::Title)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

impl PostgresPostRepository {
    async fn page_where(
        &self,
        condition: Condition,
        request: &PageRequest,
    ) -> Result<Page<PostView>, RepoError> {
        let paginator = PostEntity::find()
            .filter(condition)
            .order_by_desc(post::Column::CreatedAt)
            .paginate(&self.db, request.page_size());

        let total = paginator.num_items().await.map_err(query_error)?;
        let number = request.resolve(total);
        let models = paginator
            .fetch_page(number - 1)
            .await
            .map_err(query_error)?;

        let items = self.hydrate(models).await?;
        Ok(Page::new(items, number, request.page_size(), total))
    }

    /// Attach author usernames and groups to a batch of posts.
    async fn hydrate(&self, models: Vec<post::Model>) -> Result<Vec<PostView>, RepoError> {
        let authors = usernames(&self.db, distinct(models.iter().map(|m| m.author_id))).await?;

        let group_ids = distinct(models.iter().filter_map(|m| m.group_id));
        let groups: HashMap<Uuid, Group> = if group_ids.is_empty() {
            HashMap::new()
        } else {
            GroupEntity::find()
                .filter(group::Column::Id.is_in(group_ids))
                .all(&self.db)
                .await
                .map_err(query_error)?
                .into_iter()
                .map(|g| (g.id, g.into()))
                .collect()
        };

        Ok(models
            .into_iter()
            .map(|model| {
                let author = authors.get(&model.author_id).cloned().unwrap_or_default();
                let group = model.group_id.and_then(|id| groups.get(&id).cloned());
                PostView {
                    post: model.into(),
                    author,
                    group,
                }
            })
            .collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn page_all(&self, request: &PageRequest) -> Result<Page<PostView>, RepoError> {
        self.page_where(Condition::all(), request).await
    }

    async fn page_by_group(
        &self,
        group_id: Uuid,
        request: &PageRequest,
    ) -> Result<Page<PostView>, RepoError> {
        self.page_where(Condition::all().add(post::Column::GroupId.eq(group_id)), request)
            .await
    }

    async fn page_by_author(
        &self,
        author_id: Uuid,
        request: &PageRequest,
    ) -> Result<Page<PostView>, RepoError> {
        self.page_where(Condition::all().add(post::Column::AuthorId.eq(author_id)), request)
            .await
    }

    async fn find_by_author_and_id(
        &self,
        username: &str,
        post_id: Uuid,
    ) -> Result<Option<PostView>, RepoError> {
        let Some(author) = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(query_error)?
        else {
            return Ok(None);
        };

        let Some(model) = PostEntity::find()
            .filter(post::Column::Id.eq(post_id))
            .filter(post::Column::AuthorId.eq(author.id))
            .one(&self.db)
            .await
            .map_err(query_error)?
        else {
            return Ok(None);
        };

        let group = match model.group_id {
            Some(id) => GroupEntity::find_by_id(id)
                .one(&self.db)
                .await
                .map_err(query_error)?
                .map(Into::into),
            None => None,
        };

        Ok(Some(PostView {
            post: model.into(),
            author: author.username,
            group,
        }))
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .count(&self.db)
            .await
            .map_err(query_error)
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError> {
        let models = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        let authors = usernames(&self.db, distinct(models.iter().map(|m| m.author_id))).await?;

        Ok(models
            .into_iter()
            .map(|model| CommentView {
                author: authors.get(&model.author_id).cloned().unwrap_or_default(),
                comment: model.into(),
            })
            .collect())
    }
}
