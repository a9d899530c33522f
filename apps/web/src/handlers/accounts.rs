//! Account handlers: signup, login and logout over the session cookie.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;

use scribe_core::domain::User;
use scribe_core::error::RepoError;
use scribe_core::ports::BaseRepository;
use scribe_shared::FormErrors;
use scribe_shared::forms::{LoginForm, SignupForm};

use crate::middleware::auth::{OptionalIdentity, is_safe_next, removal_cookie, session_cookie};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::templates::{self, LoginTemplate, SignupTemplate};

pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const BAD_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

#[derive(Debug, Deserialize)]
struct NextQuery {
    next: Option<String>,
}

/// Log `user` in by setting the session cookie, then go to `location`.
fn start_session(state: &AppState, user: &User, location: &str) -> AppResult<HttpResponse> {
    let token = state
        .tokens
        .generate_token(user.id, &user.username)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let cookie = session_cookie(
        token,
        state.tokens.expiration_seconds(),
        state.session_cookie_secure,
    );

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .cookie(cookie)
        .finish())
}

fn signup_page(
    viewer: &OptionalIdentity,
    form: SignupForm,
    errors: FormErrors,
) -> AppResult<HttpResponse> {
    templates::render(&SignupTemplate {
        viewer: viewer.username(),
        form: SignupForm {
            password1: String::new(),
            password2: String::new(),
            ..form
        },
        errors,
    })
}

/// GET /auth/signup/
pub async fn signup_form(viewer: OptionalIdentity) -> AppResult<HttpResponse> {
    signup_page(&viewer, SignupForm::default(), FormErrors::new())
}

/// POST /auth/signup/
pub async fn signup(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    form: web::Form<SignupForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let clean = match form.validate() {
        Ok(clean) => clean,
        Err(errors) => return signup_page(&viewer, form, errors),
    };

    if state.users.find_by_username(&clean.username).await?.is_some() {
        let mut errors = FormErrors::new();
        errors.add("username", USERNAME_TAKEN);
        return signup_page(&viewer, form, errors);
    }

    let password_hash = state
        .passwords
        .hash(&clean.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let user = User::new(clean.username, clean.email, password_hash)
        .with_name(clean.first_name, clean.last_name);

    let user = match state.users.insert(user).await {
        Ok(user) => user,
        // Lost a race with another signup for the same name.
        Err(RepoError::Constraint(_)) => {
            let mut errors = FormErrors::new();
            errors.add("username", USERNAME_TAKEN);
            return signup_page(&viewer, form, errors);
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %user.id, username = %user.username, "User signed up");
    start_session(&state, &user, "/")
}

/// GET /auth/login/
pub async fn login_form(req: HttpRequest, viewer: OptionalIdentity) -> AppResult<HttpResponse> {
    let next = web::Query::<NextQuery>::from_query(req.query_string())
        .ok()
        .and_then(|q| q.into_inner().next)
        .unwrap_or_default();

    templates::render(&LoginTemplate {
        viewer: viewer.username(),
        username: String::new(),
        next,
        errors: FormErrors::new(),
    })
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let retry = |errors: FormErrors| {
        templates::render(&LoginTemplate {
            viewer: viewer.username(),
            username: form.username.trim().to_string(),
            next: form.next.clone(),
            errors,
        })
    };

    let (username, password) = match form.validate() {
        Ok(credentials) => credentials,
        Err(errors) => return retry(errors),
    };

    let user = match state.users.find_by_username(&username).await? {
        Some(user) => user,
        None => {
            tracing::debug!(username = %username, "Login for unknown user");
            let mut errors = FormErrors::new();
            errors.add_non_field(BAD_CREDENTIALS);
            return retry(errors);
        }
    };

    let valid = state
        .passwords
        .verify(&password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if !valid {
        tracing::debug!(username = %username, "Login with wrong password");
        let mut errors = FormErrors::new();
        errors.add_non_field(BAD_CREDENTIALS);
        return retry(errors);
    }

    let location = if is_safe_next(&form.next) {
        form.next.as_str()
    } else {
        "/"
    };
    tracing::info!(user_id = %user.id, "User logged in");
    start_session(&state, &user, location)
}

/// GET /auth/logout/
pub async fn logout(viewer: OptionalIdentity) -> HttpResponse {
    if let Some(identity) = &viewer.0 {
        tracing::info!(user_id = %identity.user_id, "User logged out");
    }
    HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .cookie(removal_cookie())
        .finish()
}
