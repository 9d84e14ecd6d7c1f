use handlebars::{DirectorySourceOptions, Handlebars};
use sqlx::sqlite::SqlitePool;

pub mod assets;
pub mod auth;
pub mod config;
pub mod error;
pub mod pages;
pub mod routes;
pub mod store;
pub mod telemetry;
pub mod upload;

use assets::AssetDir;
use auth::Auth;
use config::Config;
use error::{BlogError, BlogResult};
use store::{PostStore, SessionStore, UserStore};
use upload::Uploader;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db_pool: SqlitePool,
    pub templates: Handlebars<'static>,
    pub posts: PostStore,
    pub users: UserStore,
    pub auth: Auth,
    pub uploads: Uploader,
}

impl AppState {
    pub async fn new(config: Config) -> BlogResult<Self> {
        let db_pool = store::connect(&config.db_url, config.db_max_connections).await?;
        Self::with_pool(config, db_pool)
    }

    /// Wires every store onto an existing pool. Templates are loaded eagerly
    /// so a broken template fails startup rather than the first request.
    pub fn with_pool(config: Config, db_pool: SqlitePool) -> BlogResult<Self> {
        let mut templates = Handlebars::new();
        templates.set_dev_mode(config.template_dev_mode);
        templates
            .register_templates_directory(&config.template_dir, DirectorySourceOptions::default())?;

        for name in ["index", "post", "admin", "login"] {
            if !templates.has_template(name) {
                return Err(BlogError::Config(format!(
                    "template {name:?} missing from {}",
                    config.template_dir.display()
                )));
            }
        }

        let asset_prefix = config.upload_url_prefix();
        let posts = PostStore::new(db_pool.clone(), asset_prefix.clone());
        let users = UserStore::new(db_pool.clone());
        let sessions = SessionStore::new(db_pool.clone());
        let auth = Auth::new(users.clone(), sessions);
        let uploads = Uploader::new(posts.clone(), AssetDir::new(config.upload_dir(), asset_prefix));

        Ok(Self {
            config,
            db_pool,
            templates,
            posts,
            users,
            auth,
            uploads,
        })
    }

    /// Creates the configured admin account unless it already exists.
    pub async fn seed_admin(&self) -> BlogResult<()> {
        let Some(seed) = &self.config.admin else {
            return Ok(());
        };

        if self.users.find_by_email(&seed.email).await?.is_some() {
            tracing::debug!(email = %seed.email, "admin account already present");
            return Ok(());
        }

        self.users.create(&seed.email, &seed.password).await?;
        tracing::info!(email = %seed.email, "seeded admin account");
        Ok(())
    }
}
