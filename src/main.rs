use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;

use escape_blog::config::Config;
use escape_blog::{AppState, routes, store, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine, the environment may already be set.
    let _ = dotenv();

    let config = Config::from_env().context("invalid configuration")?;
    telemetry::init(config.json_logs);

    let app_state = AppState::new(config)
        .await
        .context("failed to initialise application state")?;

    store::migrate(&app_state.db_pool)
        .await
        .context("failed to perform migrations")?;

    app_state.seed_admin().await.context("failed to seed admin")?;

    let purged = app_state
        .auth
        .purge_expired()
        .await
        .context("failed to purge sessions")?;
    if purged > 0 {
        tracing::info!(purged, "removed expired sessions");
    }

    let listener = tokio::net::TcpListener::bind(&app_state.config.host)
        .await
        .with_context(|| format!("failed to bind {}", app_state.config.host))?;

    tracing::info!(addr = %app_state.config.host, "listening");

    let app = routes::app(Arc::new(app_state));
    axum::serve(listener, app).await?;

    Ok(())
}
