use thiserror::Error;

use crate::auth::AuthError;
use crate::store::StoreError;
use crate::validate::ValidationError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("Couldn't {operation} {entity}{}: {source}", .id.map(|id| format!(" {}", id)).unwrap_or_default())]
    Storage {
        operation: &'static str,
        entity: &'static str,
        id: Option<i32>,
        #[source]
        source: StoreError,
    },

    #[error("Total emissions for {entity} came out as {total}")]
    NonFiniteTotal { entity: &'static str, total: f64 },

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        CoreError::NotFound { entity, id }
    }

    /// The entity named by a NotFound error, e.g. `"mine"`.
    pub fn missing_entity(&self) -> Option<&'static str> {
        match self {
            CoreError::NotFound { entity, .. } => Some(entity),
            _ => None,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Tags a storage failure with the operation and record it happened on.
pub trait StoreContext<T> {
    fn during(self, operation: &'static str, entity: &'static str, id: Option<i32>) -> CoreResult<T>;
}

impl<T> StoreContext<T> for Result<T, StoreError> {
    fn during(self, operation: &'static str, entity: &'static str, id: Option<i32>) -> CoreResult<T> {
        self.map_err(|source| {
            log::error!("Storage failure during {} {} {:?}: {}", operation, entity, id, source);
            CoreError::Storage { operation, entity, id, source }
        })
    }
}
