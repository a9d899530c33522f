//! Askama page templates and the view models they render.

use actix_web::HttpResponse;
use actix_web::http::header::ContentType;
use askama::Template;

use scribe_core::domain::{CommentView, Group, Page, PageLink, PostView, User};
use scribe_shared::FormErrors;
use scribe_shared::forms::SignupForm;

use crate::middleware::error::AppResult;

/// Custom template filters.
mod filters {
    /// Alternate upper and lower case, starting upper.
    pub fn uglify<T: std::fmt::Display>(s: T) -> ::askama::Result<String> {
        Ok(scribe_shared::uglify(&s.to_string()))
    }
}

pub const DATE_FORMAT: &str = "%d %B %Y %H:%M";

/// Render a template into a `200 OK` HTML response.
pub fn render<T: Template>(template: &T) -> AppResult<HttpResponse> {
    Ok(html(template.render()?))
}

pub fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}

pub fn post_url(username: &str, post_id: impl std::fmt::Display) -> String {
    format!("/{username}/{post_id}/")
}

pub fn media_url(path: &str) -> String {
    format!("/media/{path}")
}

#[derive(Debug, Clone)]
pub struct GroupLink {
    pub title: String,
    pub url: String,
}

impl From<&Group> for GroupLink {
    fn from(group: &Group) -> Self {
        Self {
            title: group.title.clone(),
            url: format!("/group/{}/", group.slug),
        }
    }
}

/// A post as listings and the post page show it.
#[derive(Debug, Clone)]
pub struct PostCard {
    pub text: String,
    pub author: String,
    pub author_url: String,
    pub url: String,
    pub edit_url: String,
    pub group: Option<GroupLink>,
    pub image_url: Option<String>,
    pub created: String,
}

impl From<PostView> for PostCard {
    fn from(view: PostView) -> Self {
        let url = post_url(&view.author, view.post.id);
        Self {
            text: view.post.text,
            author_url: format!("/{}/", view.author),
            edit_url: format!("{url}edit/"),
            url,
            author: view.author,
            group: view.group.as_ref().map(GroupLink::from),
            image_url: view.post.image.as_deref().map(media_url),
            created: view.post.created_at.format(DATE_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommentCard {
    pub author: String,
    pub author_url: String,
    pub text: String,
    pub created: String,
}

impl From<CommentView> for CommentCard {
    fn from(view: CommentView) -> Self {
        Self {
            author_url: format!("/{}/", view.author),
            author: view.author,
            text: view.comment.text,
            created: view.comment.created_at.format(DATE_FORMAT).to_string(),
        }
    }
}

/// Navigation state for the paginator include.
#[derive(Debug, Clone)]
pub struct Pager {
    pub number: u64,
    pub num_pages: u64,
    pub previous: Option<u64>,
    pub next: Option<u64>,
    pub links: Vec<PageLink>,
}

impl Pager {
    pub fn show(&self) -> bool {
        self.num_pages > 1
    }
}

impl<T> From<&Page<T>> for Pager {
    fn from(page: &Page<T>) -> Self {
        Self {
            number: page.number,
            num_pages: page.num_pages,
            previous: page.previous_page_number(),
            next: page.next_page_number(),
            links: page.links(),
        }
    }
}

/// Split a page of posts into cards and navigation.
pub fn cards(page: Page<PostView>) -> (Vec<PostCard>, Pager) {
    let pager = Pager::from(&page);
    (page.items.into_iter().map(PostCard::from).collect(), pager)
}

/// Author header shown on the profile and post pages.
#[derive(Debug, Clone)]
pub struct AuthorSummary {
    pub username: String,
    pub full_name: String,
    pub url: String,
    pub post_count: u64,
}

impl AuthorSummary {
    pub fn new(user: &User, post_count: u64) -> Self {
        Self {
            username: user.username.clone(),
            full_name: user.display_name(),
            url: format!("/{}/", user.username),
            post_count,
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub viewer: Option<String>,
    pub posts: Vec<PostCard>,
    pub pager: Pager,
}

#[derive(Template)]
#[template(path = "group.html")]
pub struct GroupTemplate {
    pub viewer: Option<String>,
    pub group: Group,
    pub posts: Vec<PostCard>,
    pub pager: Pager,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub viewer: Option<String>,
    pub author: AuthorSummary,
    pub posts: Vec<PostCard>,
    pub pager: Pager,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub viewer: Option<String>,
    pub post: PostCard,
    pub author: AuthorSummary,
    pub can_edit: bool,
    pub comments: Vec<CommentCard>,
    pub comment_url: String,
    pub comment_text: String,
    pub errors: FormErrors,
}

#[derive(Template)]
#[template(path = "post_form.html")]
pub struct PostFormTemplate {
    pub viewer: Option<String>,
    pub is_edit: bool,
    pub action: String,
    pub text: String,
    pub group: String,
    pub groups: Vec<Group>,
    pub current_image: Option<String>,
    pub errors: FormErrors,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub viewer: Option<String>,
    pub username: String,
    pub next: String,
    pub errors: FormErrors,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub viewer: Option<String>,
    pub form: SignupForm,
    pub errors: FormErrors,
}

#[derive(Template)]
#[template(path = "404.html")]
pub struct NotFoundTemplate {
    pub viewer: Option<String>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub viewer: Option<String>,
    pub status: u16,
    pub title: String,
}
