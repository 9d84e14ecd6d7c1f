mod common;

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;
use escape_blog::auth::{AUTH_COOKIE, Auth};
use escape_blog::error::BlogError;
use escape_blog::store::{SessionStore, UserStore};
use time::{Duration, OffsetDateTime};

use common::memory_pool;

async fn setup() -> (Auth, UserStore, SessionStore) {
    let pool = memory_pool().await;
    let users = UserStore::new(pool.clone());
    let sessions = SessionStore::new(pool);
    users.create("editor@escape.blog", "s3cret").await.unwrap();
    (Auth::new(users.clone(), sessions.clone()), users, sessions)
}

#[tokio::test]
async fn login_then_validate_returns_the_user() {
    let (auth, users, _) = setup().await;
    let cookie = auth.login("editor@escape.blog", "s3cret").await.unwrap();

    assert_eq!(cookie.name(), AUTH_COOKIE);
    assert_eq!(cookie.path(), Some("/"));
    assert!(cookie.http_only().unwrap_or(false));

    let expires = cookie.expires_datetime().unwrap();
    let lifetime = expires - OffsetDateTime::now_utc();
    assert!(lifetime > Duration::hours(23) && lifetime <= Duration::days(1));

    let user = auth.validate(&CookieJar::new().add(cookie)).await.unwrap();
    let expected = users.find_by_credentials("editor@escape.blog", "s3cret").await.unwrap();
    assert_eq!(user.id, expected.id);
    assert_eq!(user.email, "editor@escape.blog");
}

#[tokio::test]
async fn cookie_value_is_not_the_user_id() {
    let (auth, users, _) = setup().await;
    let user = users.find_by_email("editor@escape.blog").await.unwrap().unwrap();
    let cookie = auth.login("editor@escape.blog", "s3cret").await.unwrap();
    assert_ne!(cookie.value(), user.id.to_string());

    let forged = CookieJar::new().add(Cookie::new(AUTH_COOKIE, user.id.to_string()));
    assert!(matches!(auth.validate(&forged).await, Err(BlogError::Unauthenticated)));
}

#[tokio::test]
async fn wrong_password_does_not_log_in() {
    let (auth, _, _) = setup().await;
    assert!(matches!(
        auth.login("editor@escape.blog", "guess").await,
        Err(BlogError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let (auth, _, _) = setup().await;
    let cookie = auth.login("editor@escape.blog", "s3cret").await.unwrap();
    let jar = CookieJar::new().add(cookie);

    let cleared = auth.logout(&jar).await.unwrap();
    assert_eq!(cleared.name(), AUTH_COOKIE);
    assert_eq!(cleared.value(), "");
    assert_eq!(cleared.path(), Some("/"));
    assert!(cleared.expires_datetime().unwrap() < OffsetDateTime::now_utc());

    // The old token is dead even if the client keeps sending it.
    assert!(matches!(auth.validate(&jar).await, Err(BlogError::Unauthenticated)));
    let jar = CookieJar::new().add(cleared);
    assert!(matches!(auth.validate(&jar).await, Err(BlogError::Unauthenticated)));
}

#[tokio::test]
async fn missing_cookie_is_unauthenticated() {
    let (auth, _, _) = setup().await;
    assert!(matches!(
        auth.validate(&CookieJar::new()).await,
        Err(BlogError::Unauthenticated)
    ));
}

#[tokio::test]
async fn expired_tokens_are_rejected_and_removed() {
    let (auth, users, sessions) = setup().await;
    let user = users.find_by_email("editor@escape.blog").await.unwrap().unwrap();
    let token = sessions
        .create(user.id, OffsetDateTime::now_utc() - Duration::minutes(1))
        .await
        .unwrap();

    let jar = CookieJar::new().add(Cookie::new(AUTH_COOKIE, token.to_string()));
    assert!(matches!(auth.validate(&jar).await, Err(BlogError::Unauthenticated)));
    assert_eq!(sessions.resolve(token).await.unwrap(), None);
    assert_eq!(sessions.purge_expired().await.unwrap(), 0);
}
