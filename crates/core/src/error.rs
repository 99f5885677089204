use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Stored data violates an ordering or uniqueness invariant. Not
    /// user-correctable; the operation that detected it must not commit.
    #[error("Consistency fault: {0}")]
    Consistency(String),
}
