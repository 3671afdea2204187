use diesel::dsl::{avg, count_star, max, min, sum};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use log::info;

use crate::db::{Emission, EmissionChanges, Mine, MineFields, NewEmission, NewOperationRow, NewUser, OperationColumns, OperationRow, User};
use crate::db_types::Role;
use crate::emissions::EmissionStatistics;
use crate::operations::MiningOperation;
use crate::schema::{emissions, mines, mining_operations, users};
use crate::store::{EmissionStore, MineStore, OperationStore, StoreResult, UserStore};

/// Postgres-backed store over one pooled connection.
pub struct PgStore<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgStore<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

impl MineStore for PgStore<'_> {
    fn insert_mine(&mut self, fields: MineFields) -> StoreResult<Mine> {
        let mine = diesel::insert_into(mines::table)
            .values(&fields)
            .returning(Mine::as_returning())
            .get_result(self.conn)?;
        Ok(mine)
    }

    fn get_mine(&mut self, id: i32) -> StoreResult<Option<Mine>> {
        let mine = mines::table
            .find(id)
            .select(Mine::as_select())
            .first(self.conn)
            .optional()?;
        Ok(mine)
    }

    fn list_mines(&mut self) -> StoreResult<Vec<Mine>> {
        let all = mines::table
            .order((mines::created_at.desc(), mines::id.desc()))
            .select(Mine::as_select())
            .load(self.conn)?;
        Ok(all)
    }

    fn update_mine(&mut self, id: i32, fields: MineFields) -> StoreResult<usize> {
        let updated = diesel::update(mines::table.find(id))
            .set(&fields)
            .execute(self.conn)?;
        Ok(updated)
    }

    fn delete_mine_cascade(&mut self, id: i32) -> StoreResult<usize> {
        let deleted = self.conn.transaction::<_, DieselError, _>(|c| {
            let emissions_deleted = diesel::delete(emissions::table.filter(emissions::mine_id.eq(id)))
                .execute(c)?;
            let operations_deleted = diesel::delete(mining_operations::table.filter(mining_operations::mine_id.eq(id)))
                .execute(c)?;
            let mines_deleted = diesel::delete(mines::table.find(id))
                .execute(c)?;

            if mines_deleted > 0 {
                info!("Deleted mine {} with {} emission records and {} mining operations",
                      id, emissions_deleted, operations_deleted);
            }
            Ok(mines_deleted)
        })?;
        Ok(deleted)
    }

    fn mine_exists(&mut self, id: i32) -> StoreResult<bool> {
        let exists = diesel::select(diesel::dsl::exists(mines::table.find(id)))
            .get_result(self.conn)?;
        Ok(exists)
    }
}

impl EmissionStore for PgStore<'_> {
    fn insert_emission(&mut self, record: NewEmission) -> StoreResult<i32> {
        let id = diesel::insert_into(emissions::table)
            .values(&record)
            .returning(emissions::id)
            .get_result(self.conn)?;
        Ok(id)
    }

    fn get_emission(&mut self, id: i32) -> StoreResult<Option<Emission>> {
        let emission = emissions::table
            .find(id)
            .select(Emission::as_select())
            .first(self.conn)
            .optional()?;
        Ok(emission)
    }

    fn list_emissions_by_mine(&mut self, mine_id: i32) -> StoreResult<Vec<Emission>> {
        let records = emissions::table
            .filter(emissions::mine_id.eq(mine_id))
            .order((emissions::date.desc(), emissions::id.desc()))
            .select(Emission::as_select())
            .load(self.conn)?;
        Ok(records)
    }

    fn update_emission(&mut self, id: i32, changes: EmissionChanges) -> StoreResult<usize> {
        let updated = diesel::update(emissions::table.find(id))
            .set(&changes)
            .execute(self.conn)?;
        Ok(updated)
    }

    fn delete_emission(&mut self, id: i32) -> StoreResult<usize> {
        let deleted = diesel::delete(emissions::table.find(id))
            .execute(self.conn)?;
        Ok(deleted)
    }

    fn emission_totals(&mut self, mine_id: Option<i32>) -> StoreResult<Vec<f64>> {
        let mut query = emissions::table
            .select(emissions::total_emissions)
            .into_boxed();
        if let Some(mine_id) = mine_id {
            query = query.filter(emissions::mine_id.eq(mine_id));
        }
        Ok(query.load(self.conn)?)
    }

    // Postgres aggregates natively, so skip shipping every total over the wire
    fn aggregate_emissions(&mut self, mine_id: Option<i32>) -> StoreResult<EmissionStatistics> {
        let (count, total, average, lowest, highest): (i64, Option<f64>, Option<f64>, Option<f64>, Option<f64>) =
            match mine_id {
                Some(mine_id) => emissions::table
                    .filter(emissions::mine_id.eq(mine_id))
                    .select((
                        count_star(),
                        sum(emissions::total_emissions),
                        avg(emissions::total_emissions),
                        min(emissions::total_emissions),
                        max(emissions::total_emissions),
                    ))
                    .get_result(self.conn)?,
                None => emissions::table
                    .select((
                        count_star(),
                        sum(emissions::total_emissions),
                        avg(emissions::total_emissions),
                        min(emissions::total_emissions),
                        max(emissions::total_emissions),
                    ))
                    .get_result(self.conn)?,
            };

        Ok(EmissionStatistics {
            total_records: count,
            // SUM over no rows is NULL, but the sum of nothing is zero
            total_emissions: total.unwrap_or(0.0),
            average_emissions: average,
            min_emissions: lowest,
            max_emissions: highest,
        })
    }
}

impl OperationStore for PgStore<'_> {
    fn insert_operation(&mut self, row: NewOperationRow) -> StoreResult<MiningOperation> {
        let inserted = diesel::insert_into(mining_operations::table)
            .values(&row)
            .returning(OperationRow::as_returning())
            .get_result(self.conn)?;
        Ok(MiningOperation::from(inserted))
    }

    fn get_operation(&mut self, id: i32) -> StoreResult<Option<MiningOperation>> {
        let row = mining_operations::table
            .find(id)
            .select(OperationRow::as_select())
            .first(self.conn)
            .optional()?;
        Ok(row.map(MiningOperation::from))
    }

    fn list_operations_by_mine(&mut self, mine_id: i32) -> StoreResult<Vec<MiningOperation>> {
        let rows = mining_operations::table
            .filter(mining_operations::mine_id.eq(mine_id))
            .order((mining_operations::date.desc(), mining_operations::id.desc()))
            .select(OperationRow::as_select())
            .load(self.conn)?;
        Ok(rows.into_iter().map(MiningOperation::from).collect())
    }

    fn update_operation(&mut self, id: i32, columns: OperationColumns) -> StoreResult<usize> {
        let updated = diesel::update(mining_operations::table.find(id))
            .set(&columns)
            .execute(self.conn)?;
        Ok(updated)
    }

    fn delete_operation(&mut self, id: i32) -> StoreResult<usize> {
        let deleted = diesel::delete(mining_operations::table.find(id))
            .execute(self.conn)?;
        Ok(deleted)
    }
}

impl UserStore for PgStore<'_> {
    fn insert_user(&mut self, user: NewUser) -> StoreResult<User> {
        let user = diesel::insert_into(users::table)
            .values(&user)
            .returning(User::as_returning())
            .get_result(self.conn)?;
        Ok(user)
    }

    fn get_user(&mut self, id: i32) -> StoreResult<Option<User>> {
        let user = users::table
            .find(id)
            .select(User::as_select())
            .first(self.conn)
            .optional()?;
        Ok(user)
    }

    fn find_user_by_name(&mut self, username: &str) -> StoreResult<Option<User>> {
        let user = users::table
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first(self.conn)
            .optional()?;
        Ok(user)
    }

    fn list_users(&mut self) -> StoreResult<Vec<User>> {
        let all = users::table
            .order(users::id.asc())
            .select(User::as_select())
            .load(self.conn)?;
        Ok(all)
    }

    fn update_user_role(&mut self, id: i32, role: Role) -> StoreResult<usize> {
        let updated = diesel::update(users::table.find(id))
            .set(users::role.eq(role))
            .execute(self.conn)?;
        Ok(updated)
    }

    fn delete_user(&mut self, id: i32) -> StoreResult<usize> {
        let deleted = diesel::delete(users::table.find(id))
            .execute(self.conn)?;
        Ok(deleted)
    }
}
