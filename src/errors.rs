use sea_orm::error::DbErr;
use serde::Serialize;
use uuid::Uuid;

/// Error taxonomy for every engine operation.
///
/// All variants are recoverable by the caller; storage failures roll back
/// the surrounding transaction before they propagate.
#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(
        #[from]
        #[serde(skip)]
        sea_orm::error::DbErr,
    ),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Concurrent modification: {0}")]
    ConcurrentModification(Uuid),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(
        #[from]
        #[serde(skip)]
        anyhow::Error,
    ),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

pub trait IntoDbErr {
    fn into_db_err(self) -> DbErr;
}

impl IntoDbErr for DbErr {
    fn into_db_err(self) -> DbErr {
        self
    }
}

impl IntoDbErr for String {
    fn into_db_err(self) -> DbErr {
        DbErr::Custom(self)
    }
}

impl IntoDbErr for &str {
    fn into_db_err(self) -> DbErr {
        DbErr::Custom(self.to_string())
    }
}

impl ServiceError {
    /// Generic constructor that normalizes any supported database error input.
    pub fn db_error<E: IntoDbErr>(error: E) -> Self {
        ServiceError::DatabaseError(error.into_db_err())
    }

    /// Convenience constructor for not-found failures keyed by entity + id.
    pub fn not_found(entity: &str, id: Uuid) -> Self {
        ServiceError::NotFound(format!("{} {} not found", entity, id))
    }

    /// Convenience constructor for invalid transitions between named states.
    pub fn bad_transition(
        axis: &str,
        from: impl std::fmt::Display,
        to: impl std::fmt::Display,
    ) -> Self {
        ServiceError::InvalidStateTransition(format!("{}: {} -> {}", axis, from, to))
    }

    /// True when retrying the same call cannot succeed (caller error, not
    /// transient storage trouble).
    pub fn is_permanent(&self) -> bool {
        !matches!(
            self,
            ServiceError::DatabaseError(_) | ServiceError::ConcurrentModification(_)
        )
    }

    /// Message suitable for surfacing to an end user. Internal errors are
    /// collapsed to a generic message so storage details never leak.
    pub fn user_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Storage error".to_string(),
            Self::InternalError(_) | Self::Other(_) => "Internal error".to_string(),
            Self::ConcurrentModification(id) => {
                format!("Concurrent modification for ID {}", id)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_masks_storage_details() {
        let err = ServiceError::db_error("connection reset by peer");
        assert_eq!(err.user_message(), "Storage error");
    }

    #[test]
    fn user_message_passes_through_domain_errors() {
        let err = ServiceError::Unauthorized("only a Head may approve".into());
        assert!(err.user_message().contains("only a Head may approve"));
    }

    #[test]
    fn validation_errors_are_permanent() {
        let err = ServiceError::ValidationError("share percentages must sum to 100".into());
        assert!(err.is_permanent());
    }

    #[test]
    fn database_errors_are_retryable() {
        let err = ServiceError::db_error("timeout");
        assert!(!err.is_permanent());
    }
}
