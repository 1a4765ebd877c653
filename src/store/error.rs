use crate::model::{EntityKind, Id};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: EntityKind, id: Id },
    /// The backend refused the values it was given (constraint or type violation)
    #[error("rejected by storage: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    pub fn not_found(entity: EntityKind, id: impl Into<Id>) -> Self {
        StoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}
