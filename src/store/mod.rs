//! Storage contract for mines, emission records, mining operations and users.
//!
//! Stores are handed to the services explicitly. [PgStore] wraps a connection borrowed from the
//! request's pool guard for the duration of one call; [MemoryStore] keeps everything in-process.

mod memory;
mod pg;

use thiserror::Error;

use crate::db::{Emission, EmissionChanges, Mine, MineFields, NewEmission, NewOperationRow, NewUser, OperationColumns, User};
use crate::db_types::Role;
use crate::emissions::EmissionStatistics;
use crate::operations::MiningOperation;

pub use memory::MemoryStore;
pub use pg::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StoreError::Database(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation, _))
        )
    }

    /// The row pointed at a parent (e.g. a mine) that no longer exists.
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            StoreError::Database(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::ForeignKeyViolation, _))
        )
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait MineStore {
    fn insert_mine(&mut self, fields: MineFields) -> StoreResult<Mine>;
    fn get_mine(&mut self, id: i32) -> StoreResult<Option<Mine>>;
    /// Newest first
    fn list_mines(&mut self) -> StoreResult<Vec<Mine>>;
    fn update_mine(&mut self, id: i32, fields: MineFields) -> StoreResult<usize>;
    /// Deletes the mine together with its emission records and mining operations, all or nothing.
    /// Returns the number of mines deleted.
    fn delete_mine_cascade(&mut self, id: i32) -> StoreResult<usize>;

    fn mine_exists(&mut self, id: i32) -> StoreResult<bool> {
        Ok(self.get_mine(id)?.is_some())
    }
}

pub trait EmissionStore {
    /// Returns the assigned id
    fn insert_emission(&mut self, record: NewEmission) -> StoreResult<i32>;
    fn get_emission(&mut self, id: i32) -> StoreResult<Option<Emission>>;
    /// Newest date first
    fn list_emissions_by_mine(&mut self, mine_id: i32) -> StoreResult<Vec<Emission>>;
    /// Returns the number of rows affected
    fn update_emission(&mut self, id: i32, changes: EmissionChanges) -> StoreResult<usize>;
    /// Returns the number of rows affected
    fn delete_emission(&mut self, id: i32) -> StoreResult<usize>;
    fn emission_totals(&mut self, mine_id: Option<i32>) -> StoreResult<Vec<f64>>;

    fn aggregate_emissions(&mut self, mine_id: Option<i32>) -> StoreResult<EmissionStatistics> {
        Ok(EmissionStatistics::from_totals(self.emission_totals(mine_id)?))
    }
}

pub trait OperationStore {
    fn insert_operation(&mut self, row: NewOperationRow) -> StoreResult<MiningOperation>;
    fn get_operation(&mut self, id: i32) -> StoreResult<Option<MiningOperation>>;
    /// Newest date first
    fn list_operations_by_mine(&mut self, mine_id: i32) -> StoreResult<Vec<MiningOperation>>;
    fn update_operation(&mut self, id: i32, columns: OperationColumns) -> StoreResult<usize>;
    fn delete_operation(&mut self, id: i32) -> StoreResult<usize>;
}

pub trait UserStore {
    fn insert_user(&mut self, user: NewUser) -> StoreResult<User>;
    fn get_user(&mut self, id: i32) -> StoreResult<Option<User>>;
    fn find_user_by_name(&mut self, username: &str) -> StoreResult<Option<User>>;
    fn list_users(&mut self) -> StoreResult<Vec<User>>;
    fn update_user_role(&mut self, id: i32, role: Role) -> StoreResult<usize>;
    fn delete_user(&mut self, id: i32) -> StoreResult<usize>;
}
