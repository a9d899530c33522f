//! Read-only pages: feeds, profiles and the single post view.

use actix_web::{HttpRequest, HttpResponse, web};
use askama::Template;
use serde::Deserialize;
use uuid::Uuid;

use scribe_core::domain::{PageRequest, PostView};
use scribe_core::ports::BaseRepository;
use scribe_shared::FormErrors;

use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::templates::{
    self, AuthorSummary, CommentCard, GroupTemplate, IndexTemplate, PostCard, PostTemplate,
    ProfileTemplate,
};

pub const INDEX_PAGE_SIZE: u64 = 10;
pub const GROUP_PAGE_SIZE: u64 = 8;
pub const PROFILE_PAGE_SIZE: u64 = 12;

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<String>,
}

/// The `?page=` value; a query string that fails to parse counts as absent.
fn requested_page(req: &HttpRequest) -> Option<String> {
    web::Query::<PageQuery>::from_query(req.query_string())
        .ok()
        .and_then(|q| q.into_inner().page)
}

/// Feed cache key. Signed-in viewers are keyed by user id; a page value that
/// is not an integer shares page 1's entry.
pub fn index_cache_key(viewer: Option<Uuid>, page: Option<&str>) -> String {
    let page = page
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(1);
    match viewer {
        Some(user_id) => format!("index_page:user:{user_id}:{page}"),
        None => format!("index_page:anonymous:{page}"),
    }
}

/// GET /
pub async fn index(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let page = requested_page(&req);
    let key = index_cache_key(viewer.user_id(), page.as_deref());
    let viewer = viewer.username();

    if let Some(body) = state.cache.get(&key).await {
        tracing::debug!(key = %key, "Serving feed from cache");
        return Ok(templates::html(body));
    }

    let listing = state
        .posts
        .page_all(&PageRequest::new(page, INDEX_PAGE_SIZE))
        .await?;
    let (posts, pager) = templates::cards(listing);
    let body = IndexTemplate {
        viewer,
        posts,
        pager,
    }
    .render()?;

    if let Err(e) = state
        .cache
        .set(&key, &body, Some(state.index_cache_ttl))
        .await
    {
        tracing::warn!(key = %key, "Failed to cache feed page: {}", e);
    }

    Ok(templates::html(body))
}

/// GET /group/{slug}/
pub async fn group_posts(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    let slug = slug.into_inner();
    let group = state
        .groups
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("group {slug}")))?;

    let listing = state
        .posts
        .page_by_group(
            group.id,
            &PageRequest::new(requested_page(&req), GROUP_PAGE_SIZE),
        )
        .await?;
    let (posts, pager) = templates::cards(listing);

    templates::render(&GroupTemplate {
        viewer: viewer.username(),
        group,
        posts,
        pager,
    })
}

/// GET /{username}/
pub async fn profile(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    username: web::Path<String>,
) -> AppResult<HttpResponse> {
    let username = username.into_inner();
    let author = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {username}")))?;

    let listing = state
        .posts
        .page_by_author(
            author.id,
            &PageRequest::new(requested_page(&req), PROFILE_PAGE_SIZE),
        )
        .await?;
    let summary = AuthorSummary::new(&author, listing.total_items);
    let (posts, pager) = templates::cards(listing);

    templates::render(&ProfileTemplate {
        viewer: viewer.username(),
        author: summary,
        posts,
        pager,
    })
}

/// GET /{username}/{post_id}/
pub async fn post_view(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<(String, Uuid)>,
) -> AppResult<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let view = find_post(&state, &username, post_id).await?;

    let page = post_page(&state, &viewer, view, String::new(), FormErrors::new()).await?;
    templates::render(&page)
}

/// A post addressed by its author's username and its id.
pub async fn find_post(state: &AppState, username: &str, post_id: Uuid) -> AppResult<PostView> {
    state
        .posts
        .find_by_author_and_id(username, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {username}/{post_id}")))
}

/// The post page, with the comment form showing `comment_text` and `errors`.
pub async fn post_page(
    state: &AppState,
    viewer: &OptionalIdentity,
    view: PostView,
    comment_text: String,
    errors: FormErrors,
) -> AppResult<PostTemplate> {
    let author = state
        .users
        .find_by_id(view.post.author_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("author of post {}", view.post.id)))?;
    let post_count = state.posts.count_by_author(author.id).await?;
    let comments = state
        .comments
        .list_for_post(view.post.id)
        .await?
        .into_iter()
        .map(CommentCard::from)
        .collect();

    let card = PostCard::from(view);
    Ok(PostTemplate {
        viewer: viewer.username(),
        can_edit: viewer.user_id() == Some(author.id),
        author: AuthorSummary::new(&author, post_count),
        comment_url: format!("{}comment/", card.url),
        post: card,
        comments,
        comment_text,
        errors,
    })
}
