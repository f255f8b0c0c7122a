use thiserror::Error;

/// Errors raised by the repositories.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("database error: {0}")]
    Db(#[source] sqlx::Error),

    #[error("{0}")]
    Conflict(String),

    #[error("invalid lookup: {0}")]
    InvalidLookup(String),

    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("role [{0}] does not exist")]
    UnknownRole(String),

    #[error("failed to generate api key: {0}")]
    KeyGeneration(String),
}

impl RepoError {
    /// Unique violations become [`RepoError::Conflict`].
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e
            && dbe.code().as_deref() == Some("23505")
        {
            return RepoError::Conflict(dbe.message().to_string());
        }
        RepoError::Db(e)
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        Self::from_sqlx(e)
    }
}
