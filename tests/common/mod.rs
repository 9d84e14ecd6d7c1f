#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use escape_blog::AppState;
use escape_blog::config::Config;
use escape_blog::store::{self, NewPost};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// One connection, so every query sees the same in-memory database.
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    store::migrate(&pool).await.unwrap();
    pool
}

pub async fn test_state(static_dir: &Path) -> Arc<AppState> {
    let config = Config {
        static_dir: static_dir.to_path_buf(),
        ..Config::default()
    };
    Arc::new(AppState::with_pool(config, memory_pool().await).unwrap())
}

pub fn new_post(title: &str, featured: bool) -> NewPost {
    NewPost {
        theme: "Travel".into(),
        title: title.into(),
        subtitle: format!("{title} subtitle"),
        author: "Mat Vogels".into(),
        author_image: "author.png".into(),
        publish_date: "4/19/2023".into(),
        hero_image: "big.png".into(),
        hero_image_small: "small.png".into(),
        content: format!("{title} body"),
        featured,
    }
}

pub fn alps_payload() -> serde_json::Value {
    serde_json::json!({
        "theme": "Nature",
        "title": "Alps",
        "subtitle": "x",
        "authorname": "A",
        "authorphoto": "data:image/png;base64,QQ==",
        "authorphotoname": "a.png",
        "bigimage": "data:image/png;base64,Qg==",
        "bigimagename": "b.png",
        "smallimage": "data:image/png;base64,Qw==",
        "smallimagename": "c.png",
        "content": "body"
    })
}
