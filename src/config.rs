//! Environment configuration.
//!
//! Every value has a default so a bare checkout runs against a local SQLite
//! file. `main` loads `.env` before calling [`Config::from_env`].

use std::path::PathBuf;

use crate::error::{BlogError, BlogResult};

/// Subdirectory of the static directory that receives uploaded images.
pub const UPLOAD_SUBDIR: &str = "sources";

/// URL prefix the static directory is mounted under.
pub const STATIC_URL_PREFIX: &str = "/static";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub db_url: String,
    pub db_max_connections: u32,
    pub static_dir: PathBuf,
    pub template_dir: PathBuf,
    pub template_dev_mode: bool,
    pub admin: Option<AdminSeed>,
    pub json_logs: bool,
}

/// Credentials of the admin account created at startup when missing.
#[derive(Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1:3000".to_string(),
            db_url: "sqlite://blog.db?mode=rwc".to_string(),
            db_max_connections: 5,
            static_dir: PathBuf::from("static"),
            template_dir: PathBuf::from("templates"),
            template_dev_mode: false,
            admin: None,
            json_logs: false,
        }
    }
}

impl Config {
    pub fn from_env() -> BlogResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Unset keys keep their
    /// defaults; malformed values are rejected.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> BlogResult<Self> {
        let defaults = Self::default();

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.trim().parse::<u32>().ok().filter(|n| *n > 0).ok_or_else(|| {
                BlogError::Config(format!("DB_MAX_CONNECTIONS must be a positive integer, got {raw:?}"))
            })?,
            None => defaults.db_max_connections,
        };

        let template_dev_mode = match lookup("TEMPLATE_DEV_MODE") {
            Some(raw) => parse_flag("TEMPLATE_DEV_MODE", &raw)?,
            None => defaults.template_dev_mode,
        };

        let admin = match (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
                Some(AdminSeed {
                    email: email.trim().to_string(),
                    password,
                })
            }
            (None, None) => None,
            _ => {
                return Err(BlogError::Config(
                    "ADMIN_EMAIL and ADMIN_PASSWORD must be set together".to_string(),
                ));
            }
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            db_url: lookup("DATABASE_URL").unwrap_or(defaults.db_url),
            db_max_connections,
            static_dir: lookup("STATIC_DIR").map(PathBuf::from).unwrap_or(defaults.static_dir),
            template_dir: lookup("TEMPLATE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.template_dir),
            template_dev_mode,
            admin,
            json_logs: lookup("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(defaults.json_logs),
        })
    }

    /// Directory uploaded images are written to.
    pub fn upload_dir(&self) -> PathBuf {
        self.static_dir.join(UPLOAD_SUBDIR)
    }

    /// Public URL prefix of [`Config::upload_dir`].
    pub fn upload_url_prefix(&self) -> String {
        format!("{STATIC_URL_PREFIX}/{UPLOAD_SUBDIR}")
    }
}

fn parse_flag(key: &str, raw: &str) -> BlogResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(BlogError::Config(format!("{key} must be a boolean, got {raw:?}"))),
    }
}
