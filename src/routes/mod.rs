use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::config::STATIC_URL_PREFIX;

pub mod web;

/// Three base64 images plus the text fields of a post.
const UPLOAD_BODY_LIMIT: usize = 32 * 1024 * 1024;

// Server-side rendered pages plus the two JSON endpoints the pages call.
pub fn get_web_router(app_state: Arc<AppState>) -> Router<Arc<AppState>> {
    let admin = Router::new()
        .route("/admin", get(web::admin_view))
        .route(
            "/post",
            post(web::create_post).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state,
            web::require_session,
        ));

    Router::new()
        // Front Page
        .route("/", get(web::index))
        // Posts
        .route("/post/{post_id}", get(web::view_post))
        // Auth
        .route("/login", get(web::login_view).post(web::login_handler))
        .route("/logout", get(web::logout_handler).post(web::logout_handler))
        .merge(admin)
}

/// The complete application: pages, static files and request tracing.
pub fn app(app_state: Arc<AppState>) -> Router {
    let static_dir = app_state.config.static_dir.clone();

    Router::new()
        .merge(get_web_router(app_state.clone()))
        // STATIC CONTENT
        .nest_service(STATIC_URL_PREFIX, ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        // STATE
        .with_state(app_state)
}
