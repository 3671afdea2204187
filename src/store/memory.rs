use std::collections::BTreeMap;

use chrono::Utc;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use itertools::Itertools;

use crate::db::{Emission, EmissionChanges, Mine, MineFields, NewEmission, NewOperationRow, NewUser, OperationColumns, User};
use crate::db_types::Role;
use crate::operations::MiningOperation;
use crate::store::{EmissionStore, MineStore, OperationStore, StoreError, StoreResult, UserStore};

/// In-process store with the same semantics as the Postgres one.
///
/// Every call holds `&mut self` for its whole duration. The mine cascade also restores its
/// snapshot when it fails partway, so it is all or nothing like the Postgres transaction.
#[derive(Debug, Default)]
pub struct MemoryStore {
    last_id: i32,
    mines: BTreeMap<i32, Mine>,
    emissions: BTreeMap<i32, Emission>,
    operations: BTreeMap<i32, MiningOperation>,
    users: BTreeMap<i32, User>,
    outage: Option<String>,
    cascade_interruption: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail with [StoreError::Unavailable] until cleared with `None`.
    pub fn set_outage(&mut self, reason: Option<&str>) {
        self.outage = reason.map(str::to_string);
    }

    /// Makes the next mine cascades fail after their emission records are gone but before the
    /// operations and the mine are, until cleared with `None`.
    pub fn interrupt_cascade(&mut self, reason: Option<&str>) {
        self.cascade_interruption = reason.map(str::to_string);
    }

    fn check(&self) -> StoreResult<()> {
        match &self.outage {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    fn check_mine_reference(&self, mine_id: i32, table: &str) -> StoreResult<()> {
        if self.mines.contains_key(&mine_id) {
            return Ok(());
        }
        let message = format!("insert on table \"{}\" violates foreign key constraint: mine {} is not present", table, mine_id);
        Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, Box::new(message)).into())
    }

    // Same order as the Postgres transaction
    fn cascade(&mut self, id: i32) -> StoreResult<usize> {
        self.emissions.retain(|_, emission| emission.mine_id != id);
        if let Some(reason) = &self.cascade_interruption {
            return Err(StoreError::Unavailable(reason.clone()));
        }
        self.operations.retain(|_, operation| operation.mine_id != id);
        Ok(self.mines.remove(&id).map_or(0, |_| 1))
    }

    // Ids are shared across tables, which is fine since nothing depends on them being dense
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

impl MineStore for MemoryStore {
    fn insert_mine(&mut self, fields: MineFields) -> StoreResult<Mine> {
        self.check()?;
        let mine = Mine {
            id: self.next_id(),
            name: fields.name,
            location: fields.location,
            area_size: fields.area_size,
            operational_status: fields.operational_status,
            created_at: Utc::now(),
        };
        self.mines.insert(mine.id, mine.clone());
        Ok(mine)
    }

    fn get_mine(&mut self, id: i32) -> StoreResult<Option<Mine>> {
        self.check()?;
        Ok(self.mines.get(&id).cloned())
    }

    fn list_mines(&mut self) -> StoreResult<Vec<Mine>> {
        self.check()?;
        Ok(self.mines.values()
            .sorted_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)))
            .cloned()
            .collect())
    }

    fn update_mine(&mut self, id: i32, fields: MineFields) -> StoreResult<usize> {
        self.check()?;
        Ok(match self.mines.get_mut(&id) {
            Some(mine) => {
                mine.name = fields.name;
                mine.location = fields.location;
                mine.area_size = fields.area_size;
                mine.operational_status = fields.operational_status;
                1
            }
            None => 0,
        })
    }

    fn delete_mine_cascade(&mut self, id: i32) -> StoreResult<usize> {
        self.check()?;
        let snapshot = (self.mines.clone(), self.emissions.clone(), self.operations.clone());

        let result = self.cascade(id);
        if result.is_err() {
            (self.mines, self.emissions, self.operations) = snapshot;
        }
        result
    }
}

impl EmissionStore for MemoryStore {
    fn insert_emission(&mut self, record: NewEmission) -> StoreResult<i32> {
        self.check()?;
        self.check_mine_reference(record.mine_id, "emissions")?;
        let id = self.next_id();
        self.emissions.insert(id, Emission {
            id,
            mine_id: record.mine_id,
            date: record.date,
            coal_output: record.coal_output,
            electricity_usage: record.electricity_usage,
            fuel_consumption: record.fuel_consumption,
            methane_leaks: record.methane_leaks,
            stockpile_emissions: record.stockpile_emissions,
            total_emissions: record.total_emissions,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    fn get_emission(&mut self, id: i32) -> StoreResult<Option<Emission>> {
        self.check()?;
        Ok(self.emissions.get(&id).cloned())
    }

    fn list_emissions_by_mine(&mut self, mine_id: i32) -> StoreResult<Vec<Emission>> {
        self.check()?;
        Ok(self.emissions.values()
            .filter(|emission| emission.mine_id == mine_id)
            .sorted_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)))
            .cloned()
            .collect())
    }

    fn update_emission(&mut self, id: i32, changes: EmissionChanges) -> StoreResult<usize> {
        self.check()?;
        Ok(match self.emissions.get_mut(&id) {
            Some(emission) => {
                if let Some(date) = changes.date {
                    emission.date = date;
                }
                emission.coal_output = changes.coal_output;
                emission.electricity_usage = changes.electricity_usage;
                emission.fuel_consumption = changes.fuel_consumption;
                emission.methane_leaks = changes.methane_leaks;
                emission.stockpile_emissions = changes.stockpile_emissions;
                emission.total_emissions = changes.total_emissions;
                1
            }
            None => 0,
        })
    }

    fn delete_emission(&mut self, id: i32) -> StoreResult<usize> {
        self.check()?;
        Ok(self.emissions.remove(&id).map_or(0, |_| 1))
    }

    fn emission_totals(&mut self, mine_id: Option<i32>) -> StoreResult<Vec<f64>> {
        self.check()?;
        Ok(self.emissions.values()
            .filter(|emission| mine_id.map_or(true, |mine_id| emission.mine_id == mine_id))
            .map(|emission| emission.total_emissions)
            .collect())
    }
}

impl OperationStore for MemoryStore {
    fn insert_operation(&mut self, row: NewOperationRow) -> StoreResult<MiningOperation> {
        self.check()?;
        self.check_mine_reference(row.mine_id, "mining_operations")?;
        let id = self.next_id();
        let operation = MiningOperation {
            id,
            mine_id: row.mine_id,
            date: row.date,
            details: row.columns.into(),
            created_at: Utc::now(),
        };
        self.operations.insert(id, operation.clone());
        Ok(operation)
    }

    fn get_operation(&mut self, id: i32) -> StoreResult<Option<MiningOperation>> {
        self.check()?;
        Ok(self.operations.get(&id).cloned())
    }

    fn list_operations_by_mine(&mut self, mine_id: i32) -> StoreResult<Vec<MiningOperation>> {
        self.check()?;
        Ok(self.operations.values()
            .filter(|operation| operation.mine_id == mine_id)
            .sorted_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)))
            .cloned()
            .collect())
    }

    fn update_operation(&mut self, id: i32, columns: OperationColumns) -> StoreResult<usize> {
        self.check()?;
        Ok(match self.operations.get_mut(&id) {
            Some(operation) => {
                operation.details = columns.into();
                1
            }
            None => 0,
        })
    }

    fn delete_operation(&mut self, id: i32) -> StoreResult<usize> {
        self.check()?;
        Ok(self.operations.remove(&id).map_or(0, |_| 1))
    }
}

impl UserStore for MemoryStore {
    fn insert_user(&mut self, user: NewUser) -> StoreResult<User> {
        self.check()?;
        if self.users.values().any(|existing| existing.username == user.username) {
            let message = format!("duplicate key value violates unique constraint \"users_username_key\": {}", user.username);
            return Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, Box::new(message)).into());
        }

        let user = User {
            id: self.next_id(),
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn get_user(&mut self, id: i32) -> StoreResult<Option<User>> {
        self.check()?;
        Ok(self.users.get(&id).cloned())
    }

    fn find_user_by_name(&mut self, username: &str) -> StoreResult<Option<User>> {
        self.check()?;
        Ok(self.users.values().find(|user| user.username == username).cloned())
    }

    fn list_users(&mut self) -> StoreResult<Vec<User>> {
        self.check()?;
        Ok(self.users.values().cloned().collect())
    }

    fn update_user_role(&mut self, id: i32, role: Role) -> StoreResult<usize> {
        self.check()?;
        Ok(match self.users.get_mut(&id) {
            Some(user) => {
                user.role = role;
                1
            }
            None => 0,
        })
    }

    fn delete_user(&mut self, id: i32) -> StoreResult<usize> {
        self.check()?;
        Ok(self.users.remove(&id).map_or(0, |_| 1))
    }
}
