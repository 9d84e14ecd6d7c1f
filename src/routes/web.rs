use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path, Request, State};
use axum::http::{Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::json;

use crate::AppState;
use crate::auth::{AUTH_COOKIE, expired_cookie};
use crate::error::BlogError;
use crate::pages;
use crate::store::User;
use crate::store::posts::post_url;
use crate::upload::CreatePostRequest;

/// Guards the admin routes. Page loads without a session are sent to the
/// login form; API calls get a bare 401.
#[axum::debug_middleware]
pub async fn require_session(
    app_state: State<Arc<AppState>>,
    cookie_jar: CookieJar,
    mut req: Request,
    nxt: Next,
) -> Result<Response, WebError> {
    match app_state.auth.validate(&cookie_jar).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            Ok(nxt.run(req).await)
        }
        Err(BlogError::Unauthenticated) => {
            let had_cookie = cookie_jar.get(AUTH_COOKIE).is_some();
            let cookie_jar = if had_cookie {
                cookie_jar.add(expired_cookie())
            } else {
                cookie_jar
            };

            let response = if req.method() == Method::GET {
                Redirect::to("/login").into_response()
            } else {
                (StatusCode::UNAUTHORIZED, "You must be logged in").into_response()
            };
            Ok((cookie_jar, response).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug)]
pub enum WebError {
    InvalidId(String),
    BadRequest(String),
    BodyTooLarge(String),
    Blog(BlogError),
    Render(handlebars::RenderError),
}

impl From<BlogError> for WebError {
    fn from(err: BlogError) -> Self {
        WebError::Blog(err)
    }
}

impl From<JsonRejection> for WebError {
    fn from(rejection: JsonRejection) -> Self {
        // Hitting the body limit surfaces as a buffering rejection.
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            WebError::BodyTooLarge(rejection.body_text())
        } else {
            WebError::BadRequest(rejection.body_text())
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::InvalidId(raw) => {
                tracing::debug!(id = %raw, "invalid post id");
                (StatusCode::FORBIDDEN, "Invalid post id").into_response()
            }
            WebError::BadRequest(msg) => {
                tracing::debug!(%msg, "malformed request body");
                (StatusCode::BAD_REQUEST, msg).into_response()
            }
            WebError::BodyTooLarge(msg) => {
                tracing::debug!(%msg, "request body over limit");
                (StatusCode::PAYLOAD_TOO_LARGE, msg).into_response()
            }
            WebError::Render(e) => {
                tracing::error!(error = %e, "template rendering failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Error rendering page").into_response()
            }
            WebError::Blog(err) => match err {
                BlogError::NotFound => (StatusCode::NOT_FOUND, "Post not found").into_response(),
                BlogError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "Incorrect email or password").into_response()
                }
                BlogError::Unauthenticated => {
                    (StatusCode::UNAUTHORIZED, "You must be logged in").into_response()
                }
                BlogError::Validation(msg) => {
                    tracing::debug!(%msg, "rejected request");
                    (StatusCode::BAD_REQUEST, msg).into_response()
                }
                err @ BlogError::TooLarge { .. } => {
                    tracing::debug!(error = %err, "rejected upload");
                    (StatusCode::PAYLOAD_TOO_LARGE, err.to_string()).into_response()
                }
                err => {
                    tracing::error!(error = %err, "request failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, "Server Error").into_response()
                }
            },
        }
    }
}

fn render(
    app_state: &AppState,
    name: &str,
    data: &serde_json::Value,
) -> Result<Html<String>, WebError> {
    app_state
        .templates
        .render(name, data)
        .map(Html)
        .map_err(WebError::Render)
}

#[axum::debug_handler]
pub async fn index(app_state: State<Arc<AppState>>) -> Result<Html<String>, WebError> {
    let featured = app_state.posts.list_featured().await?;
    let recent = app_state.posts.list_recent().await?;

    render(
        &app_state,
        "index",
        &json!({
            "chrome": pages::chrome(),
            "tagline": pages::tagline(),
            "themes": pages::THEMES,
            "featured_title": pages::FEATURED_TITLE,
            "featured": featured,
            "recent_title": pages::RECENT_TITLE,
            "recent": recent,
        }),
    )
}

#[axum::debug_handler]
pub async fn view_post(
    app_state: State<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> Result<Html<String>, WebError> {
    let id: i64 = post_id
        .parse()
        .map_err(|_| WebError::InvalidId(post_id.clone()))?;

    let post = app_state.posts.get_by_id(id).await?;

    render(
        &app_state,
        "post",
        &json!({"chrome": pages::chrome(), "post": post}),
    )
}

#[axum::debug_handler]
pub async fn admin_view(
    app_state: State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Html<String>, WebError> {
    render(
        &app_state,
        "admin",
        &json!({
            "brand": pages::BRAND,
            "form": pages::admin_form(),
            "preview": pages::admin_preview(),
            "themes": pages::THEMES,
            "user": user,
        }),
    )
}

#[axum::debug_handler]
pub async fn login_view(app_state: State<Arc<AppState>>) -> Result<Html<String>, WebError> {
    render(
        &app_state,
        "login",
        &json!({"brand": pages::BRAND, "form": pages::login_form()}),
    )
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "Email", alias = "email")]
    email: String,
    #[serde(rename = "Password", alias = "password")]
    password: String,
}

#[axum::debug_handler]
pub async fn login_handler(
    app_state: State<Arc<AppState>>,
    cookie_jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, WebError> {
    let Json(form) = payload?;
    let cookie = app_state.auth.login(&form.email, &form.password).await?;

    Ok((cookie_jar.add(cookie), Json(json!({"redirect": "/admin"}))))
}

#[axum::debug_handler]
pub async fn logout_handler(
    app_state: State<Arc<AppState>>,
    cookie_jar: CookieJar,
) -> impl IntoResponse {
    let cookie = match app_state.auth.logout(&cookie_jar).await {
        Ok(cookie) => cookie,
        Err(e) => {
            tracing::error!(error = %e, "failed to revoke session");
            expired_cookie()
        }
    };

    (cookie_jar.add(cookie), Redirect::to("/"))
}

#[axum::debug_handler]
pub async fn create_post(
    app_state: State<Arc<AppState>>,
    Extension(user): Extension<User>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<impl IntoResponse, WebError> {
    let Json(req) = payload?;
    let id = app_state.uploads.create_post(&req).await?;
    let url = post_url(id);

    tracing::info!(user_id = user.id, id, "post published");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, url.clone())],
        Json(json!({"id": id, "url": url})),
    ))
}
