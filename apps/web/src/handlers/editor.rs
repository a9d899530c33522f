//! Login-required writes: creating and editing posts, commenting.

use actix_web::http::header;
use actix_web::{HttpResponse, web};
use uuid::Uuid;

use scribe_core::domain::{Comment, ImageKind, Post};
use scribe_core::error::DomainError;
use scribe_core::ports::BaseRepository;
use scribe_shared::FormErrors;
use scribe_shared::forms::{CommentForm, PostForm};

use crate::handlers::posts::{find_post, post_page};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::templates::{self, PostFormTemplate, media_url, post_url};
use crate::upload::{INVALID_IMAGE, PostPayload, PostSubmission};

pub const NEW_POST_URL: &str = "/new/";

pub const UNKNOWN_GROUP: &str =
    "Select a valid choice. That choice is not one of the available choices.";

pub fn redirect(location: impl Into<String>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.into()))
        .finish()
}

/// A submission that passed validation.
struct CleanSubmission {
    text: String,
    group_id: Option<Uuid>,
    image: Option<(ImageKind, Vec<u8>)>,
}

/// Validate every field, resolving the group slug and checking the image.
async fn clean(
    state: &AppState,
    submission: PostSubmission,
) -> AppResult<Result<CleanSubmission, FormErrors>> {
    let (text, group_slug) = match submission.form.validate() {
        Ok(clean) => (clean.text, clean.group_slug),
        Err(errors) => return Ok(Err(errors)),
    };
    let mut errors = FormErrors::new();

    let group_id = match group_slug {
        Some(slug) => match state.groups.find_by_slug(&slug).await? {
            Some(group) => Some(group.id),
            None => {
                errors.add("group", UNKNOWN_GROUP);
                None
            }
        },
        None => None,
    };

    let image = match submission.image {
        Some(file) => match file.image_kind() {
            Some(kind) => Some((kind, file.bytes)),
            None => {
                errors.add("image", INVALID_IMAGE);
                None
            }
        },
        None => None,
    };

    Ok(errors.finish(CleanSubmission {
        text,
        group_id,
        image,
    }))
}

/// Store the uploaded image, if any, and return its media path.
async fn store_image(
    state: &AppState,
    image: Option<(ImageKind, Vec<u8>)>,
) -> AppResult<Option<String>> {
    match image {
        Some((kind, bytes)) => Ok(Some(state.media.save_post_image(kind, &bytes).await?)),
        None => Ok(None),
    }
}

/// Remove an image stored for a write that did not go through.
async fn discard_image(state: &AppState, image: Option<&str>) {
    if let Some(path) = image {
        if let Err(e) = state.media.delete_post_image(path).await {
            tracing::warn!(file = %path, "Failed to remove orphaned image: {}", e);
        }
    }
}

/// The post form, filled with `form` and annotated with `errors`.
async fn form_page(
    state: &AppState,
    identity: &Identity,
    action: String,
    form: &PostForm,
    current_image: Option<String>,
    errors: FormErrors,
) -> AppResult<HttpResponse> {
    templates::render(&PostFormTemplate {
        viewer: Some(identity.username.clone()),
        is_edit: action != NEW_POST_URL,
        action,
        text: form.text.clone(),
        group: form.group.trim().to_string(),
        groups: state.groups.list().await?,
        current_image,
        errors,
    })
}

/// GET /new/
pub async fn new_post_form(
    identity: Identity,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    form_page(
        &state,
        &identity,
        NEW_POST_URL.to_string(),
        &PostForm::default(),
        None,
        FormErrors::new(),
    )
    .await
}

/// POST /new/
pub async fn new_post(
    identity: Identity,
    state: web::Data<AppState>,
    payload: PostPayload,
) -> AppResult<HttpResponse> {
    let submission = PostSubmission::from_payload(payload).await?;
    let form = submission.form.clone();

    let clean = match clean(&state, submission).await? {
        Ok(clean) => clean,
        Err(errors) => {
            tracing::debug!(user = %identity.username, "Rejected new post");
            return form_page(&state, &identity, NEW_POST_URL.to_string(), &form, None, errors)
                .await;
        }
    };

    let image = store_image(&state, clean.image).await?;
    let post = Post::new(identity.user_id, clean.text, clean.group_id).with_image(image.clone());
    let post = match state.posts.insert(post).await {
        Ok(post) => post,
        Err(e) => {
            discard_image(&state, image.as_deref()).await;
            return Err(e.into());
        }
    };

    tracing::info!(post_id = %post.id, author = %identity.username, "Post created");
    Ok(redirect("/"))
}

/// GET /{username}/{post_id}/edit/
pub async fn edit_post_form(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<(String, Uuid)>,
) -> AppResult<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let view = find_post(&state, &username, post_id).await?;
    let url = post_url(&view.author, view.post.id);

    match view.post.ensure_author(identity.user_id) {
        Err(DomainError::Forbidden) => return Ok(redirect(url)),
        other => other?,
    }

    let form = PostForm {
        text: view.post.text.clone(),
        group: view.group.map(|g| g.slug).unwrap_or_default(),
    };
    form_page(
        &state,
        &identity,
        format!("{url}edit/"),
        &form,
        view.post.image.as_deref().map(media_url),
        FormErrors::new(),
    )
    .await
}

/// POST /{username}/{post_id}/edit/
pub async fn edit_post(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<(String, Uuid)>,
    payload: PostPayload,
) -> AppResult<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let view = find_post(&state, &username, post_id).await?;
    let url = post_url(&view.author, view.post.id);

    match view.post.ensure_author(identity.user_id) {
        Err(DomainError::Forbidden) => {
            tracing::warn!(
                post_id = %post_id,
                user = %identity.username,
                "Edit by non-author refused"
            );
            return Ok(redirect(url));
        }
        other => other?,
    }

    let submission = PostSubmission::from_payload(payload).await?;
    let form = submission.form.clone();
    let clean = match clean(&state, submission).await? {
        Ok(clean) => clean,
        Err(errors) => {
            let current = view.post.image.as_deref().map(media_url);
            return form_page(&state, &identity, format!("{url}edit/"), &form, current, errors)
                .await;
        }
    };

    let image = store_image(&state, clean.image).await?;
    let mut post = view.post;
    post.edit(clean.text, clean.group_id, image.clone());
    if let Err(e) = state.posts.update(post).await {
        discard_image(&state, image.as_deref()).await;
        return Err(e.into());
    }

    tracing::info!(post_id = %post_id, author = %identity.username, "Post edited");
    Ok(redirect(url))
}

/// POST /{username}/{post_id}/comment/
pub async fn add_comment(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<(String, Uuid)>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let view = find_post(&state, &username, post_id).await?;
    let url = post_url(&view.author, view.post.id);

    let text = match form.validate() {
        Ok(text) => text,
        Err(errors) => {
            let viewer = OptionalIdentity(Some(identity));
            let page = post_page(&state, &viewer, view, form.into_inner().text, errors).await?;
            return templates::render(&page);
        }
    };

    let comment = state
        .comments
        .insert(Comment::new(view.post.id, identity.user_id, text))
        .await?;

    tracing::info!(comment_id = %comment.id, post_id = %post_id, "Comment added");
    Ok(redirect(url))
}
