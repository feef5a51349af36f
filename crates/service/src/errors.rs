use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Closed set of failure categories. Callers map these to transport
/// status codes; messages are for humans only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    StoreUnavailable,
    InvalidId,
    MissingFields,
    InvalidPlays,
    EmptyField,
    NotFound,
    DuplicateName,
    Internal,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("database connection unavailable")]
    StoreUnavailable,
    #[error("invalid song id")]
    InvalidId,
    #[error("fields \"name\" and \"path\" are required")]
    MissingFields,
    #[error("field \"plays\" must be a number greater than or equal to 0")]
    InvalidPlays,
    #[error("field \"{0}\" cannot be empty")]
    EmptyField(&'static str),
    #[error("song not found")]
    NotFound,
    #[error("a song with that name already exists")]
    DuplicateName,
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::StoreUnavailable => ErrorKind::StoreUnavailable,
            ServiceError::InvalidId => ErrorKind::InvalidId,
            ServiceError::MissingFields => ErrorKind::MissingFields,
            ServiceError::InvalidPlays => ErrorKind::InvalidPlays,
            ServiceError::EmptyField(_) => ErrorKind::EmptyField,
            ServiceError::NotFound => ErrorKind::NotFound,
            ServiceError::DuplicateName => ErrorKind::DuplicateName,
            ServiceError::Db(_) => ErrorKind::Internal,
        }
    }

    /// Unique-index violations surface as `DuplicateName`; every other
    /// driver error is internal.
    pub fn from_db(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::DuplicateName,
            _ => ServiceError::Db(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_has_a_kind() {
        assert_eq!(ServiceError::EmptyField("path").kind(), ErrorKind::EmptyField);
        assert_eq!(ServiceError::Db("boom".into()).kind(), ErrorKind::Internal);
        assert_eq!(ServiceError::EmptyField("name").to_string(), "field \"name\" cannot be empty");
    }

    #[test]
    fn plain_driver_errors_are_internal() {
        let err = ServiceError::from_db(DbErr::Custom("connection reset".into()));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
