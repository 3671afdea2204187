//! Mining operation records.
//!
//! These are stored independently of emission records: nothing links an operation to any
//! emission record, and changing one never changes the other. Emission figures for an operation
//! are derived on demand (see [OperationRecords::estimate]).

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::db::{NewOperationRow, OperationColumns};
use crate::emissions::{estimate_operation, DerivationFactors, EmissionFactors, OperationEstimate};
use crate::error::{CoreError, CoreResult, StoreContext};
use crate::store::{MineStore, OperationStore};

const OPERATION: &str = "mining operation";
const MINE: &str = "mine";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Excavation {
    /// m³
    pub material_volume: f64,
    pub equipment_hours: f64,
    /// liters
    pub fuel_consumption: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transportation {
    /// km
    pub distance: f64,
    pub vehicle_types: String,
    /// liters
    pub fuel_consumption: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub operating_hours: f64,
    /// kWh
    pub energy_consumption: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Energy {
    /// kWh
    pub electricity: f64,
    /// liters
    pub diesel: f64,
    /// liters of other fuels
    pub other: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waste {
    /// m³
    pub overburden: f64,
    /// tons
    pub waste_rock: f64,
    pub treatment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDetails {
    #[serde(rename = "excavationData")]
    pub excavation: Excavation,
    #[serde(rename = "transportationData")]
    pub transportation: Transportation,
    #[serde(rename = "equipmentData")]
    pub equipment: Equipment,
    #[serde(rename = "energyConsumption")]
    pub energy: Energy,
    #[serde(rename = "wasteManagement")]
    pub waste: Waste,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MiningOperation {
    pub id: i32,
    pub mine_id: i32,
    pub date: DateTime<Utc>,
    #[serde(flatten)]
    pub details: OperationDetails,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationSubmission {
    pub mine_id: i32,
    pub date: DateTime<Utc>,
    pub details: OperationDetails,
}

pub struct OperationRecords<'s, S> {
    store: &'s mut S,
}

impl<'s, S: OperationStore + MineStore> OperationRecords<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self { store }
    }

    pub fn create(&mut self, submission: OperationSubmission) -> CoreResult<MiningOperation> {
        let mine_id = submission.mine_id;
        let mine_exists = self.store.mine_exists(mine_id)
            .during("look up", MINE, Some(mine_id))?;
        if !mine_exists {
            return Err(CoreError::not_found(MINE, mine_id));
        }

        let inserted = self.store.insert_operation(NewOperationRow {
            mine_id,
            date: submission.date,
            columns: OperationColumns::from(&submission.details),
        });
        let operation = match inserted {
            Err(e) if e.is_foreign_key_violation() => return Err(CoreError::not_found(MINE, mine_id)),
            other => other.during("create", OPERATION, None)?,
        };
        info!("Created mining operation {} for mine {}", operation.id, mine_id);

        Ok(operation)
    }

    /// Replaces the measurements. The mine and date stay as they were.
    pub fn update(&mut self, id: i32, details: OperationDetails) -> CoreResult<MiningOperation> {
        let updated = self.store.update_operation(id, OperationColumns::from(&details))
            .during("update", OPERATION, Some(id))?;
        if updated == 0 {
            return Err(CoreError::not_found(OPERATION, id));
        }
        info!("Updated mining operation {}", id);

        self.get(id)
    }

    pub fn delete(&mut self, id: i32) -> CoreResult<()> {
        let deleted = self.store.delete_operation(id)
            .during("delete", OPERATION, Some(id))?;
        if deleted == 0 {
            return Err(CoreError::not_found(OPERATION, id));
        }
        info!("Deleted mining operation {}", id);
        Ok(())
    }

    pub fn get(&mut self, id: i32) -> CoreResult<MiningOperation> {
        self.store.get_operation(id)
            .during("fetch", OPERATION, Some(id))?
            .ok_or_else(|| CoreError::not_found(OPERATION, id))
    }

    pub fn list_for_mine(&mut self, mine_id: i32) -> CoreResult<Vec<MiningOperation>> {
        self.store.list_operations_by_mine(mine_id)
            .during("list mining operations of", MINE, Some(mine_id))
    }

    /// Emission inputs and total derived from a stored operation. Nothing is written.
    pub fn estimate(&mut self, id: i32, derivation: &DerivationFactors, emission: &EmissionFactors) -> CoreResult<OperationEstimate> {
        let operation = self.get(id)?;
        checked_estimate(&operation.details, derivation, emission)
    }
}

/// Like [estimate_operation], but refuses to hand back a NaN or infinite total.
pub fn checked_estimate(details: &OperationDetails, derivation: &DerivationFactors, emission: &EmissionFactors) -> CoreResult<OperationEstimate> {
    let estimate = estimate_operation(details, derivation, emission);
    if !estimate.total_emissions.is_finite() {
        return Err(CoreError::NonFiniteTotal { entity: OPERATION, total: estimate.total_emissions });
    }
    Ok(estimate)
}
