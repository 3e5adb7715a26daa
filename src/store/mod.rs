mod mongo;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Employee, NewEmployee};

pub use mongo::MongoEmployeeStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique index violation; carries the store's own message.
    #[error("{0}")]
    Duplicate(String),
    #[error(
        "Cast to ObjectId failed for value \"{0}\" (type string) at path \"_id\" for model \"Employee\""
    )]
    InvalidId(String),
    #[error("Employee validation failed: {0}")]
    Validation(String),
    #[error("{0}")]
    Backend(String),
}

/// Persistence for employee records. The store is the authority on email
/// uniqueness: `insert` and `replace` fail with [`StoreError::Duplicate`]
/// when another record already owns the email.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn insert(&self, employee: NewEmployee) -> Result<Employee, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Employee>, StoreError>;

    /// All records in the store's natural order.
    async fn find_all(&self) -> Result<Vec<Employee>, StoreError>;

    /// Overwrites the record with the same id. `None` if it no longer exists.
    async fn replace(&self, employee: &Employee) -> Result<Option<Employee>, StoreError>;

    /// Removes the record permanently, returning what was removed.
    async fn delete(&self, id: &str) -> Result<Option<Employee>, StoreError>;
}
