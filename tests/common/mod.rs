//! Fixtures shared by the integration tests

#![allow(dead_code)]

use chrono::{TimeZone, Utc};

use minecarbon::db::{Mine, MineFields};
use minecarbon::db_types::OperationalStatus;
use minecarbon::emissions::{EmissionInput, EmissionSubmission};
use minecarbon::mines::Mines;
use minecarbon::operations::{Energy, Equipment, Excavation, OperationDetails, OperationSubmission, Transportation, Waste};
use minecarbon::store::MemoryStore;

pub const EPSILON: f64 = 1e-9;

pub fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < EPSILON, "expected {}, got {}", expected, actual);
}

pub fn add_mine(store: &mut MemoryStore, name: &str) -> Mine {
    Mines::new(store)
        .create(MineFields {
            name: name.to_string(),
            location: "Hunter Valley".to_string(),
            area_size: 420.0,
            operational_status: OperationalStatus::Active,
        })
        .expect("mine should be created")
}

/// Totals 366.636 tCO2e under the IPCC factors
pub fn reference_input() -> EmissionInput {
    EmissionInput {
        coal_output: 100.0,
        electricity_usage: 5000.0,
        fuel_consumption: 200.0,
        methane_leaks: 10.0,
        stockpile_emissions: 2.0,
    }
}

/// An input totalling exactly `total` tCO2e, all of it from the stockpile
pub fn input_totalling(total: f64) -> EmissionInput {
    EmissionInput { stockpile_emissions: total, ..EmissionInput::default() }
}

pub fn submission(mine_id: i32, day: u32, input: EmissionInput) -> EmissionSubmission {
    EmissionSubmission {
        mine_id,
        date: Some(Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap()),
        input,
    }
}

pub fn operation_details() -> OperationDetails {
    OperationDetails {
        excavation: Excavation { material_volume: 100.0, equipment_hours: 12.0, fuel_consumption: 30.0 },
        transportation: Transportation { distance: 8.0, vehicle_types: "haul truck".into(), fuel_consumption: 40.0 },
        equipment: Equipment { equipment_type: "excavator".into(), operating_hours: 6.0, energy_consumption: 50.0 },
        energy: Energy { electricity: 20.0, diesel: 10.0, other: None },
        waste: Waste { overburden: 300.0, waste_rock: 5.0, treatment: "backfill".into() },
    }
}

pub fn operation_submission(mine_id: i32, day: u32) -> OperationSubmission {
    OperationSubmission {
        mine_id,
        date: Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap(),
        details: operation_details(),
    }
}
