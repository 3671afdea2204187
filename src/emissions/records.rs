use chrono::{DateTime, Utc};
use log::info;

use crate::db::{Emission, EmissionChanges, NewEmission};
use crate::emissions::{EmissionFactors, EmissionInput, EmissionStatistics};
use crate::error::{CoreError, CoreResult, StoreContext};
use crate::store::{EmissionStore, MineStore};

const EMISSION: &str = "emission record";
const MINE: &str = "mine";

/// A validated request to create an emission record.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionSubmission {
    pub mine_id: i32,
    /// Defaults to the time of submission
    pub date: Option<DateTime<Utc>>,
    pub input: EmissionInput,
}

/// A validated request to replace the inputs of an existing emission record.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionUpdate {
    /// None keeps the stored date
    pub date: Option<DateTime<Utc>>,
    pub input: EmissionInput,
}

/// Creates, updates and deletes emission records. These are the only writes of `total_emissions`,
/// and every one of them recomputes it from the inputs being written.
pub struct EmissionRecords<'s, S> {
    store: &'s mut S,
    factors: &'s EmissionFactors,
}

impl<'s, S: EmissionStore + MineStore> EmissionRecords<'s, S> {
    pub fn new(store: &'s mut S, factors: &'s EmissionFactors) -> Self {
        Self { store, factors }
    }

    fn computed_total(&self, input: &EmissionInput) -> CoreResult<f64> {
        let total = input.total(self.factors);
        if !total.is_finite() {
            return Err(CoreError::NonFiniteTotal { entity: EMISSION, total });
        }
        Ok(total)
    }

    pub fn create(&mut self, submission: EmissionSubmission) -> CoreResult<Emission> {
        let mine_id = submission.mine_id;
        let mine_exists = self.store.mine_exists(mine_id)
            .during("look up", MINE, Some(mine_id))?;
        if !mine_exists {
            return Err(CoreError::not_found(MINE, mine_id));
        }

        let input = submission.input;
        let total_emissions = self.computed_total(&input)?;

        // The mine can still vanish between the check above and the insert
        let inserted = self.store.insert_emission(NewEmission {
            mine_id,
            date: submission.date.unwrap_or_else(Utc::now),
            coal_output: input.coal_output,
            electricity_usage: input.electricity_usage,
            fuel_consumption: input.fuel_consumption,
            methane_leaks: input.methane_leaks,
            stockpile_emissions: input.stockpile_emissions,
            total_emissions,
        });
        let id = match inserted {
            Err(e) if e.is_foreign_key_violation() => return Err(CoreError::not_found(MINE, mine_id)),
            other => other.during("create", EMISSION, None)?,
        };
        info!("Created emission record {} for mine {} ({} tCO2e)", id, mine_id, total_emissions);

        self.get(id)
    }

    pub fn update(&mut self, id: i32, update: EmissionUpdate) -> CoreResult<Emission> {
        let input = update.input;
        let total_emissions = self.computed_total(&input)?;

        let updated = self.store.update_emission(id, EmissionChanges {
            date: update.date,
            coal_output: input.coal_output,
            electricity_usage: input.electricity_usage,
            fuel_consumption: input.fuel_consumption,
            methane_leaks: input.methane_leaks,
            stockpile_emissions: input.stockpile_emissions,
            total_emissions,
        }).during("update", EMISSION, Some(id))?;
        if updated == 0 {
            return Err(CoreError::not_found(EMISSION, id));
        }
        info!("Updated emission record {} ({} tCO2e)", id, total_emissions);

        self.get(id)
    }

    pub fn delete(&mut self, id: i32) -> CoreResult<()> {
        let deleted = self.store.delete_emission(id)
            .during("delete", EMISSION, Some(id))?;
        if deleted == 0 {
            return Err(CoreError::not_found(EMISSION, id));
        }
        info!("Deleted emission record {}", id);
        Ok(())
    }

    pub fn get(&mut self, id: i32) -> CoreResult<Emission> {
        self.store.get_emission(id)
            .during("fetch", EMISSION, Some(id))?
            .ok_or_else(|| CoreError::not_found(EMISSION, id))
    }

    pub fn list_for_mine(&mut self, mine_id: i32) -> CoreResult<Vec<Emission>> {
        self.store.list_emissions_by_mine(mine_id)
            .during("list emission records of", MINE, Some(mine_id))
    }

    /// Count, sum, average, min and max of `total_emissions`, optionally for one mine only.
    pub fn statistics(&mut self, mine_id: Option<i32>) -> CoreResult<EmissionStatistics> {
        aggregate(self.store, mine_id)
    }
}

pub fn aggregate<S: EmissionStore>(store: &mut S, mine_id: Option<i32>) -> CoreResult<EmissionStatistics> {
    store.aggregate_emissions(mine_id)
        .during("aggregate emission records for", MINE, mine_id)
}
