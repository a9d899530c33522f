use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
use uuid::Uuid;

use scribe_core::domain::{Comment, PageRequest, Post};
use scribe_core::error::RepoError;
use scribe_core::ports::{
    BaseRepository, CommentRepository, GroupRepository, PostRepository, UserRepository,
};

use super::entity::{comment, group, post, user};
use super::postgres_repo::{
    PostgresCommentRepository, PostgresGroupRepository, PostgresPostRepository,
    PostgresUserRepository,
};

fn user_model(username: &str) -> user::Model {
    user::Model {
        id: Uuid::new_v4(),
        username: username.to_owned(),
        email: format!("{username}@example.com"),
        first_name: String::new(),
        last_name: String::new(),
        password_hash: "hash".to_owned(),
        created_at: Utc::now().into(),
    }
}

fn post_model(author_id: Uuid, text: &str, group_id: Option<Uuid>) -> post::Model {
    post::Model {
        id: Uuid::new_v4(),
        text: text.to_owned(),
        author_id,
        group_id,
        image: None,
        created_at: Utc::now().into(),
    }
}

fn group_model(slug: &str) -> group::Model {
    group::Model {
        id: Uuid::new_v4(),
        title: slug.to_uppercase(),
        slug: slug.to_owned(),
        description: None,
    }
}

fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
}

#[tokio::test]
async fn test_find_post_by_id() {
    let author = user_model("pavel");
    let model = post_model(author.id, "Test text", None);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model.clone()]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let found: Option<Post> = repo.find_by_id(model.id).await.unwrap();

    let found = found.unwrap();
    assert_eq!(found.id, model.id);
    assert_eq!(found.text, "Test text");
    assert_eq!(found.author_id, author.id);
}

#[tokio::test]
async fn test_insert_comment_returns_saved_row() {
    let comment = Comment::new(Uuid::new_v4(), Uuid::new_v4(), "Nice".into());
    let saved = comment::Model {
        id: comment.id,
        post_id: comment.post_id,
        author_id: comment.author_id,
        text: comment.text.clone(),
        created_at: comment.created_at.into(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![saved]])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);
    let result = repo.insert(comment.clone()).await.unwrap();
    assert_eq!(result.id, comment.id);
    assert_eq!(result.text, "Nice");
}

#[tokio::test]
async fn test_delete_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = BaseRepository::<Post, Uuid>::delete(&repo, Uuid::new_v4()).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_find_user_by_username() {
    let model = user_model("pavel");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model.clone()], vec![]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let found = repo.find_by_username("pavel").await.unwrap().unwrap();
    assert_eq!(found.id, model.id);
    assert!(repo.find_by_username("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_group_by_slug() {
    let model = group_model("cats");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model.clone()]])
        .into_connection();

    let repo = PostgresGroupRepository::new(db);
    let found = repo.find_by_slug("cats").await.unwrap().unwrap();
    assert_eq!(found.id, model.id);
    assert_eq!(found.title, "CATS");
}

#[tokio::test]
async fn test_page_all_attaches_authors_and_groups() {
    let author = user_model("pavel");
    let cats = group_model("cats");
    let grouped = post_model(author.id, "grouped", Some(cats.id));
    let plain = post_model(author.id, "plain", None);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(2)]])
        .append_query_results([vec![grouped.clone(), plain.clone()]])
        .append_query_results([vec![author.clone()]])
        .append_query_results([vec![cats.clone()]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let page = repo.page_all(&PageRequest::first(10)).await.unwrap();

    assert_eq!(page.total_items, 2);
    assert_eq!(page.number, 1);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].author, "pavel");
    assert_eq!(page.items[0].group.as_ref().map(|g| g.slug.as_str()), Some("cats"));
    assert!(page.items[1].group.is_none());
}

#[tokio::test]
async fn test_find_by_author_and_id_with_wrong_author() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let found = repo
        .find_by_author_and_id("nobody", Uuid::new_v4())
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_list_comments_for_post() {
    let author = user_model("reader");
    let post_id = Uuid::new_v4();
    let first = comment::Model {
        id: Uuid::new_v4(),
        post_id,
        author_id: author.id,
        text: "first".into(),
        created_at: Utc::now().into(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![first]])
        .append_query_results([vec![author]])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);
    let comments = repo.list_for_post(post_id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].author, "reader");
    assert_eq!(comments[0].comment.text, "first");
}
