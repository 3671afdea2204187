use itertools::Itertools;
use serde::Serialize;

/// Summary of the `total_emissions` column over a set of emission records. Never stored.
///
/// `average_emissions`, `min_emissions` and `max_emissions` are `None` (serialized as `null`)
/// when there are no records, which is not the same thing as a total of zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmissionStatistics {
    pub total_records: i64,
    pub total_emissions: f64,
    pub average_emissions: Option<f64>,
    pub min_emissions: Option<f64>,
    pub max_emissions: Option<f64>,
}

impl EmissionStatistics {
    pub fn empty() -> Self {
        EmissionStatistics {
            total_records: 0,
            total_emissions: 0.0,
            average_emissions: None,
            min_emissions: None,
            max_emissions: None,
        }
    }

    /// Client-side aggregation, for stores that can't aggregate natively.
    pub fn from_totals<I: IntoIterator<Item = f64>>(totals: I) -> Self {
        let totals = totals.into_iter().collect_vec();
        let (min, max) = match totals.iter().copied().minmax_by(|a, b| a.total_cmp(b)).into_option() {
            Some(bounds) => bounds,
            None => return Self::empty(),
        };

        let count = totals.len();
        let sum: f64 = totals.iter().sum();

        EmissionStatistics {
            total_records: count as i64,
            total_emissions: sum,
            average_emissions: Some(sum / count as f64),
            min_emissions: Some(min),
            max_emissions: Some(max),
        }
    }
}
