mod common;

use std::time::Instant;

use escape_blog::error::BlogError;
use escape_blog::store::UserStore;

use common::memory_pool;

#[tokio::test]
async fn credentials_resolve_to_the_same_user() {
    let users = UserStore::new(memory_pool().await);
    let created = users.create("editor@escape.blog", "s3cret").await.unwrap();

    let first = users.find_by_credentials("editor@escape.blog", "s3cret").await.unwrap();
    let second = users.find_by_credentials("editor@escape.blog", "s3cret").await.unwrap();
    assert_eq!(first.id, created.id);
    assert_eq!(second.id, created.id);
}

#[tokio::test]
async fn any_mismatch_is_invalid_credentials() {
    let users = UserStore::new(memory_pool().await);
    users.create("editor@escape.blog", "s3cret").await.unwrap();

    for (email, password) in [
        ("editor@escape.blog", "wrong"),
        ("other@escape.blog", "s3cret"),
        ("other@escape.blog", "wrong"),
        ("editor@escape.blog", ""),
    ] {
        assert!(matches!(
            users.find_by_credentials(email, password).await,
            Err(BlogError::InvalidCredentials)
        ));
    }
}

#[tokio::test]
async fn passwords_are_not_stored_in_plaintext() {
    let users = UserStore::new(memory_pool().await);
    let user = users.create("editor@escape.blog", "s3cret").await.unwrap();

    let stored = users.find_by_id(user.id).await.unwrap().password_hash;
    assert_ne!(stored, "s3cret");
    assert!(stored.starts_with("$argon2"));
}

#[tokio::test]
async fn find_by_id_misses_are_not_found() {
    let users = UserStore::new(memory_pool().await);
    assert!(matches!(users.find_by_id(7).await, Err(BlogError::NotFound)));
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let users = UserStore::new(memory_pool().await);
    users.create("editor@escape.blog", "one").await.unwrap();
    assert!(matches!(
        users.create("editor@escape.blog", "two").await,
        Err(BlogError::Validation(_))
    ));
    assert!(matches!(
        users.create("not-an-email", "two").await,
        Err(BlogError::Validation(_))
    ));
}

#[tokio::test]
async fn login_email_is_matched_exactly() {
    let users = UserStore::new(memory_pool().await);
    users.create("editor@escape.blog", "s3cret").await.unwrap();

    for email in [" editor@escape.blog ", "editor@escape.blog\n", "\teditor@escape.blog"] {
        assert!(matches!(
            users.find_by_credentials(email, "s3cret").await,
            Err(BlogError::InvalidCredentials)
        ));
    }
}

#[tokio::test]
async fn unknown_email_costs_a_password_check() {
    let users = UserStore::new(memory_pool().await);
    users.create("editor@escape.blog", "s3cret").await.unwrap();

    // Warm up the dummy hash.
    let _ = users.find_by_credentials("nobody@escape.blog", "s3cret").await;

    let started = Instant::now();
    for _ in 0..3 {
        let _ = users.find_by_credentials("editor@escape.blog", "wrong").await;
    }
    let wrong_password = started.elapsed();

    let started = Instant::now();
    for _ in 0..3 {
        let _ = users.find_by_credentials("nobody@escape.blog", "wrong").await;
    }
    let unknown_email = started.elapsed();

    // A bare lookup is hundreds of times faster than one argon2 run.
    assert!(
        unknown_email * 5 >= wrong_password,
        "unknown email took {unknown_email:?}, wrong password took {wrong_password:?}"
    );
}
