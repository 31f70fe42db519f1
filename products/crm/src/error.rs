use thiserror::Error;
use uuid::Uuid;

/// Failures reported by the sales collaborators and the store.
#[derive(Debug, Error)]
pub enum SalesError {
    #[error("unknown enum code: {0}")]
    UnknownEnumCode(String),
    #[error("probability {value} for status {status} is outside 0..=1")]
    ProbabilityOutOfRange { status: String, value: f64 },
    #[error("unknown status {status} in enum {code}")]
    UnknownStatus { code: String, status: String },
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },
    /// A relation builder could not derive an associated record, e.g. an
    /// account for a customer without a name.
    #[error("relation build failed: {0}")]
    Relation(String),
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
}

pub type SalesResult<T> = Result<T, SalesError>;
