use crate::database::DatabaseError;
use sqlx::Error as SqlxError;
use thiserror::Error;
use uuid::Uuid;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Repository errors outside of a scoring run
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Race-level scoring errors
    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Repository-specific error types
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database query error
    #[error("Query error: {0}")]
    Query(SqlxError),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Duplicate record
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Backing store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        match &err {
            SqlxError::RowNotFound => RepositoryError::NotFound("Record not found".to_string()),
            SqlxError::PoolTimedOut | SqlxError::PoolClosed => {
                RepositoryError::Unavailable(err.to_string())
            }
            SqlxError::Database(db_err) => {
                // Check for common PostgreSQL error codes
                let code = db_err.code().map(|c| c.to_string());
                match code.as_deref() {
                    // Unique violation
                    Some("23505") => RepositoryError::Duplicate(db_err.message().to_string()),
                    // Foreign key / check violation
                    Some("23503") | Some("23514") => {
                        RepositoryError::ConstraintViolation(db_err.message().to_string())
                    }
                    _ => RepositoryError::Query(err),
                }
            }
            _ => RepositoryError::Query(err),
        }
    }
}

/// Race-level failures of a recompute.
///
/// Everything except `PersistenceFailure` is detected before any score is
/// written, so a failed race never carries partial writes.
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("race {0} not found")]
    RaceNotFound(Uuid),

    #[error("race {race_id} has status '{status}', results are not published")]
    RaceNotPublished { race_id: Uuid, status: String },

    #[error("race {0} has no official result")]
    NoOfficialResult(Uuid),

    #[error("official result for race {race_id} lists entry {entry_id} more than once")]
    MalformedOfficialResult { race_id: Uuid, entry_id: Uuid },

    #[error("pool {pool_id} has {active} active rulesets, expected exactly one")]
    NoActiveRuleset { pool_id: Uuid, active: usize },

    #[error("persistence failure: {0}")]
    PersistenceFailure(#[from] RepositoryError),
}

impl ScoringError {
    /// Short machine-readable tag, used in logs and CLI output
    pub fn kind(&self) -> &'static str {
        match self {
            ScoringError::RaceNotFound(_) => "race_not_found",
            ScoringError::RaceNotPublished { .. } => "race_not_published",
            ScoringError::NoOfficialResult(_) => "no_official_result",
            ScoringError::MalformedOfficialResult { .. } => "malformed_official_result",
            ScoringError::NoActiveRuleset { .. } => "no_active_ruleset",
            ScoringError::PersistenceFailure(_) => "persistence_failure",
        }
    }

    /// Whether retrying the same race later can succeed without a data fix
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ScoringError::PersistenceFailure(RepositoryError::Unavailable(_))
                | ScoringError::PersistenceFailure(RepositoryError::Query(_))
        )
    }
}
