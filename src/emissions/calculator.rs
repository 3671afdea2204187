use serde::{Deserialize, Serialize};

use crate::emissions::EmissionFactors;

/// The five raw operational inputs an emission total is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EmissionInput {
    /// tons
    pub coal_output: f64,
    /// kWh
    pub electricity_usage: f64,
    /// liters
    pub fuel_consumption: f64,
    /// m³
    pub methane_leaks: f64,
    /// tCO2e
    pub stockpile_emissions: f64,
}

impl EmissionInput {
    /// Total emissions in tCO2e. No rounding happens here.
    ///
    /// Inputs are not validated: negative values go through the arithmetic as they are and a NaN
    /// input produces a NaN total. Callers check their inputs first.
    pub fn total(&self, factors: &EmissionFactors) -> f64 {
        let coal = self.coal_output * factors.coal_production;
        // Electricity and diesel factors are per kg
        let electricity = (self.electricity_usage * factors.electricity) / 1000.0;
        let fuel = (self.fuel_consumption * factors.diesel_fuel) / 1000.0;
        let methane = self.methane_leaks * factors.methane_gwp;

        coal + electricity + fuel + methane + self.stockpile_emissions
    }
}

pub fn compute_total(input: &EmissionInput, factors: &EmissionFactors) -> f64 {
    input.total(factors)
}
