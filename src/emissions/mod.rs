// Emissions engine
mod factors;
mod calculator;
mod derivation;
mod aggregate;
mod records;

pub use factors::{EmissionFactors, DerivationFactors};
pub use calculator::{EmissionInput, compute_total};
pub use derivation::{OperationEstimate, derive_emission_input, estimate_operation};
pub use aggregate::EmissionStatistics;
pub use records::{EmissionRecords, EmissionSubmission, EmissionUpdate, aggregate};
