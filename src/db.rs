use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rocket_sync_db_pools::database;
use serde::Serialize;

use crate::db_types::{OperationalStatus, Role};
use crate::emissions::EmissionInput;
use crate::operations::{Energy, Equipment, Excavation, MiningOperation, OperationDetails, Transportation, Waste};
use crate::schema::*;

#[database("minecarbon")]
pub struct MinecarbonDbConn(diesel::PgConnection);

#[derive(Identifiable, Queryable, Selectable, Debug, Clone, PartialEq, Serialize)]
#[diesel(table_name = mines)]
pub struct Mine {
    pub id: i32,
    pub name: String,
    pub location: String,
    pub area_size: f64,
    pub operational_status: OperationalStatus,
    pub created_at: DateTime<Utc>,
}

/// Everything about a mine the client controls. Used for both insert and update.
#[derive(Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = mines)]
pub struct MineFields {
    pub name: String,
    pub location: String,
    pub area_size: f64,
    pub operational_status: OperationalStatus,
}

#[derive(Identifiable, Queryable, Selectable, Debug, Clone, PartialEq, Serialize)]
#[diesel(table_name = emissions)]
pub struct Emission {
    pub id: i32,
    pub mine_id: i32,
    pub date: DateTime<Utc>,
    pub coal_output: f64,
    pub electricity_usage: f64,
    pub fuel_consumption: f64,
    pub methane_leaks: f64,
    pub stockpile_emissions: f64,
    pub total_emissions: f64,
    pub created_at: DateTime<Utc>,
}

impl Emission {
    pub fn input(&self) -> EmissionInput {
        EmissionInput {
            coal_output: self.coal_output,
            electricity_usage: self.electricity_usage,
            fuel_consumption: self.fuel_consumption,
            methane_leaks: self.methane_leaks,
            stockpile_emissions: self.stockpile_emissions,
        }
    }
}

// Only built by EmissionRecords, which computes total_emissions from the inputs beside it
#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = emissions)]
pub struct NewEmission {
    pub mine_id: i32,
    pub date: DateTime<Utc>,
    pub coal_output: f64,
    pub electricity_usage: f64,
    pub fuel_consumption: f64,
    pub methane_leaks: f64,
    pub stockpile_emissions: f64,
    pub total_emissions: f64,
}

#[derive(AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = emissions)]
pub struct EmissionChanges {
    // None leaves the stored date alone
    pub date: Option<DateTime<Utc>>,
    pub coal_output: f64,
    pub electricity_usage: f64,
    pub fuel_consumption: f64,
    pub methane_leaks: f64,
    pub stockpile_emissions: f64,
    pub total_emissions: f64,
}

#[derive(Identifiable, Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = mining_operations)]
pub struct OperationRow {
    pub id: i32,
    pub mine_id: i32,
    pub date: DateTime<Utc>,
    #[diesel(embed)]
    pub columns: OperationColumns,
    pub created_at: DateTime<Utc>,
}

/// The measurement columns of a mining operation, flattened out of [OperationDetails].
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = mining_operations)]
#[diesel(treat_none_as_null = true)]
pub struct OperationColumns {
    pub excavation_material_volume: f64,
    pub excavation_equipment_hours: f64,
    pub excavation_fuel_consumption: f64,
    pub transport_distance: f64,
    pub transport_vehicle_types: String,
    pub transport_fuel_consumption: f64,
    pub equipment_type: String,
    pub equipment_operating_hours: f64,
    pub equipment_energy_consumption: f64,
    pub energy_electricity: f64,
    pub energy_diesel: f64,
    pub energy_other: Option<f64>,
    pub waste_overburden: f64,
    pub waste_rock: f64,
    pub waste_treatment: String,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = mining_operations)]
pub struct NewOperationRow {
    pub mine_id: i32,
    pub date: DateTime<Utc>,
    #[diesel(embed)]
    pub columns: OperationColumns,
}

impl From<&OperationDetails> for OperationColumns {
    fn from(details: &OperationDetails) -> Self {
        Self {
            excavation_material_volume: details.excavation.material_volume,
            excavation_equipment_hours: details.excavation.equipment_hours,
            excavation_fuel_consumption: details.excavation.fuel_consumption,
            transport_distance: details.transportation.distance,
            transport_vehicle_types: details.transportation.vehicle_types.clone(),
            transport_fuel_consumption: details.transportation.fuel_consumption,
            equipment_type: details.equipment.equipment_type.clone(),
            equipment_operating_hours: details.equipment.operating_hours,
            equipment_energy_consumption: details.equipment.energy_consumption,
            energy_electricity: details.energy.electricity,
            energy_diesel: details.energy.diesel,
            energy_other: details.energy.other,
            waste_overburden: details.waste.overburden,
            waste_rock: details.waste.waste_rock,
            waste_treatment: details.waste.treatment.clone(),
        }
    }
}

impl From<OperationColumns> for OperationDetails {
    fn from(columns: OperationColumns) -> Self {
        OperationDetails {
            excavation: Excavation {
                material_volume: columns.excavation_material_volume,
                equipment_hours: columns.excavation_equipment_hours,
                fuel_consumption: columns.excavation_fuel_consumption,
            },
            transportation: Transportation {
                distance: columns.transport_distance,
                vehicle_types: columns.transport_vehicle_types,
                fuel_consumption: columns.transport_fuel_consumption,
            },
            equipment: Equipment {
                equipment_type: columns.equipment_type,
                operating_hours: columns.equipment_operating_hours,
                energy_consumption: columns.equipment_energy_consumption,
            },
            energy: Energy {
                electricity: columns.energy_electricity,
                diesel: columns.energy_diesel,
                other: columns.energy_other,
            },
            waste: Waste {
                overburden: columns.waste_overburden,
                waste_rock: columns.waste_rock,
                treatment: columns.waste_treatment,
            },
        }
    }
}

impl From<OperationRow> for MiningOperation {
    fn from(row: OperationRow) -> Self {
        MiningOperation {
            id: row.id,
            mine_id: row.mine_id,
            date: row.date,
            details: row.columns.into(),
            created_at: row.created_at,
        }
    }
}

#[derive(Identifiable, Queryable, Selectable, Debug, Clone, PartialEq, Serialize)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}
