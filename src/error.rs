use thiserror::Error;

/// Business-rule rejections plus storage passthrough. A rejection makes no
/// state change; callers surface the message as-is.
#[derive(Debug, Error)]
pub enum ElectionError {
    #[error("a candidate from the same party is already running for this position")]
    DuplicateCandidate { party: String, position: String },

    #[error("no candidate at index {index}")]
    CandidateNotFound { index: i64 },

    #[error("this voter is already registered")]
    AlreadyRegistered { voter_id: i64 },

    #[error("you are not registered")]
    NotRegistered { voter_id: i64 },

    #[error("you have already voted for this position")]
    AlreadyVoted { voter_id: i64, position: String },

    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("voter id must be a positive integer, got {0}")]
    InvalidVoterId(i64),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// True when `err` is a UNIQUE/PRIMARY KEY violation. Used to map a lost
/// insert race to the same rejection a sequential duplicate gets.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}
