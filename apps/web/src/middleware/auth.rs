//! Session cookie authentication extractors.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, web};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::future::{Ready, ready};
use uuid::Uuid;

use scribe_core::ports::{AuthError, TokenClaims};

use crate::state::AppState;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "scribe_session";

pub const LOGIN_URL: &str = "/auth/login/";

/// Characters escaped in the `next` parameter; `/` stays readable.
const NEXT_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Authenticated user identity extractor.
///
/// Use this in handlers to require a logged-in session:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// Missing or invalid session; answered with a redirect to the login page.
#[derive(Debug, thiserror::Error)]
#[error("Login required: {reason}")]
pub struct LoginRequired {
    pub next: String,
    reason: AuthError,
}

impl LoginRequired {
    pub fn location(&self) -> String {
        login_url(&self.next)
    }
}

impl actix_web::ResponseError for LoginRequired {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        tracing::debug!(next = %self.next, "{}", self);
        HttpResponse::Found()
            .insert_header((header::LOCATION, self.location()))
            .finish()
    }
}

/// `/auth/login/?next=<path>` with the path percent-encoded.
pub fn login_url(next: &str) -> String {
    format!("{LOGIN_URL}?next={}", utf8_percent_encode(next, NEXT_ESCAPE))
}

/// Only local absolute paths are followed after login. Browsers drop tabs
/// and newlines from URLs, so any control character is refused.
pub fn is_safe_next(next: &str) -> bool {
    next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && !next.chars().any(char::is_control)
}

fn requested_path(req: &HttpRequest) -> String {
    match req.query_string() {
        "" => req.path().to_string(),
        query => format!("{}?{}", req.path(), query),
    }
}

fn identify(req: &HttpRequest) -> Result<Identity, AuthError> {
    let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
        tracing::error!("AppState not found in app data");
        AuthError::InvalidToken("Server configuration error".to_string())
    })?;

    let cookie = req.cookie(SESSION_COOKIE).ok_or(AuthError::MissingSession)?;
    state.tokens.validate_token(cookie.value()).map(Identity::from)
}

impl FromRequest for Identity {
    type Error = LoginRequired;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(identify(req).map_err(|reason| LoginRequired {
            next: requested_path(req),
            reason,
        }))
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    /// Username to show in the navigation bar.
    pub fn username(&self) -> Option<String> {
        self.0.as_ref().map(|identity| identity.username.clone())
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|identity| identity.user_id)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalIdentity(identify(req).ok())))
    }
}

/// Session cookie holding a freshly issued token.
pub fn session_cookie(token: String, max_age_seconds: i64, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::seconds(max_age_seconds))
        .finish()
}

/// Cookie that makes the browser drop the session.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}
