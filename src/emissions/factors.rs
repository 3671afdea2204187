use serde::{Deserialize, Serialize};

/// Conversion coefficients for the raw inputs of an emission record, based on IPCC guidelines.
///
/// Loaded once at startup and never mutated afterwards. A different set of factors means a
/// different configuration, not an edit to this one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissionFactors {
    /// tCO2e per ton of coal output
    pub coal_production: f64,
    /// kgCO2e per kWh of electricity
    pub electricity: f64,
    /// kgCO2e per liter of diesel
    pub diesel_fuel: f64,
    /// Global warming potential of methane, applied directly to leaked m³
    pub methane_gwp: f64,
}

impl EmissionFactors {
    pub const IPCC: EmissionFactors = EmissionFactors {
        coal_production: 0.8,
        electricity: 0.82,
        diesel_fuel: 2.68,
        methane_gwp: 28.0,
    };
}

impl Default for EmissionFactors {
    fn default() -> Self {
        Self::IPCC
    }
}

/// Secondary coefficients used to turn a mining operation into emission inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivationFactors {
    /// tons of coal per m³ of excavated material
    pub coal_density: f64,
    /// m³ of methane per unit of excavated material volume
    pub methane_emission: f64,
    /// tCO2e per ton of waste rock
    pub waste_emission: f64,
}

impl DerivationFactors {
    pub const STANDARD: DerivationFactors = DerivationFactors {
        coal_density: 1.5,
        methane_emission: 0.02,
        waste_emission: 0.05,
    };
}

impl Default for DerivationFactors {
    fn default() -> Self {
        Self::STANDARD
    }
}
