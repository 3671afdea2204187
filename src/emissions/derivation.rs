use serde::Serialize;

use crate::emissions::{DerivationFactors, EmissionFactors, EmissionInput};
use crate::operations::OperationDetails;

/// Emission inputs derived from a mining operation, along with the total they produce.
///
/// Shown next to the operation it came from. It is never stored as an emission record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OperationEstimate {
    pub emission_input: EmissionInput,
    pub total_emissions: f64,
}

pub fn derive_emission_input(details: &OperationDetails, factors: &DerivationFactors) -> EmissionInput {
    let excavation = &details.excavation;
    let energy = &details.energy;

    EmissionInput {
        coal_output: excavation.material_volume * factors.coal_density,
        electricity_usage: details.equipment.energy_consumption + energy.electricity,
        fuel_consumption: excavation.fuel_consumption
            + details.transportation.fuel_consumption
            + energy.diesel
            + energy.other.unwrap_or(0.0),
        methane_leaks: excavation.material_volume * factors.methane_emission,
        stockpile_emissions: details.waste.waste_rock * factors.waste_emission,
    }
}

pub fn estimate_operation(
    details: &OperationDetails,
    derivation: &DerivationFactors,
    emission: &EmissionFactors,
) -> OperationEstimate {
    let emission_input = derive_emission_input(details, derivation);
    OperationEstimate {
        emission_input,
        total_emissions: emission_input.total(emission),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::{Energy, Equipment, Excavation, Transportation, Waste};

    const EPSILON: f64 = 1e-9;

    fn details(other: Option<f64>) -> OperationDetails {
        OperationDetails {
            excavation: Excavation { material_volume: 100.0, equipment_hours: 12.0, fuel_consumption: 30.0 },
            transportation: Transportation { distance: 8.0, vehicle_types: "haul truck".into(), fuel_consumption: 40.0 },
            equipment: Equipment { equipment_type: "excavator".into(), operating_hours: 6.0, energy_consumption: 50.0 },
            energy: Energy { electricity: 20.0, diesel: 10.0, other },
            waste: Waste { overburden: 300.0, waste_rock: 5.0, treatment: "backfill".into() },
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < EPSILON, "expected {}, got {}", expected, actual);
    }

    #[test]
    fn reference_derivation() {
        let input = derive_emission_input(&details(Some(0.0)), &DerivationFactors::STANDARD);

        assert_close(input.coal_output, 150.0);
        assert_close(input.electricity_usage, 70.0);
        assert_close(input.fuel_consumption, 80.0);
        assert_close(input.methane_leaks, 2.0);
        assert_close(input.stockpile_emissions, 0.25);
    }

    #[test]
    fn missing_other_energy_counts_as_zero() {
        let with_zero = derive_emission_input(&details(Some(0.0)), &DerivationFactors::STANDARD);
        let without = derive_emission_input(&details(None), &DerivationFactors::STANDARD);
        assert_eq!(with_zero, without);
    }

    #[test]
    fn other_energy_is_fuel() {
        let input = derive_emission_input(&details(Some(15.0)), &DerivationFactors::STANDARD);
        assert_close(input.fuel_consumption, 95.0);
    }

    #[test]
    fn distance_and_hours_do_not_contribute() {
        let mut longer = details(None);
        longer.transportation.distance = 9000.0;
        longer.excavation.equipment_hours = 9000.0;
        longer.equipment.operating_hours = 9000.0;
        longer.waste.overburden = 9000.0;

        assert_eq!(
            derive_emission_input(&longer, &DerivationFactors::STANDARD),
            derive_emission_input(&details(None), &DerivationFactors::STANDARD),
        );
    }

    #[test]
    fn estimate_feeds_the_calculator() {
        let estimate = estimate_operation(&details(Some(0.0)), &DerivationFactors::STANDARD, &EmissionFactors::IPCC);
        // 150 * 0.8 + 70 * 0.82 / 1000 + 80 * 2.68 / 1000 + 2 * 28 + 0.25
        assert_close(estimate.total_emissions, 120.0 + 0.0574 + 0.2144 + 56.0 + 0.25);
        assert_eq!(estimate.total_emissions, estimate.emission_input.total(&EmissionFactors::IPCC));
    }
}
