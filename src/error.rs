use thiserror::Error;

/// Everything that can go wrong below the HTTP layer.
#[derive(Debug, Error)]
pub enum BlogError {
    #[error("record not found")]
    NotFound,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("not authenticated")]
    Unauthenticated,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{what} exceeds {limit} bytes")]
    TooLarge { what: &'static str, limit: usize },

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl BlogError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<argon2::password_hash::Error> for BlogError {
    fn from(err: argon2::password_hash::Error) -> Self {
        Self::Hash(err.to_string())
    }
}

pub type BlogResult<T> = Result<T, BlogError>;
