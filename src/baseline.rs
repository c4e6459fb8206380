//! Statewide high-school earnings baseline
//!
//! The statewide baseline is the survey-weighted mean of county-level
//! high-school-graduate median incomes:
//!
//! `statewide = Σ(hs_median_income_i × weight_sum_i) / Σ(weight_sum_i)`
//!
//! It is a process-wide constant per dataset version; the pipeline computes it
//! once per run and reuses the value for every institution.

use crate::dataset::CountyBaseline;
use crate::error::{Result, RoiError};

/// Compute the weighted statewide baseline from county survey rows.
///
/// A negative county weight or a non-positive total weight is a fatal
/// configuration error, never a silent divide.
pub fn statewide_baseline(counties: &[CountyBaseline]) -> Result<f64> {
    if counties.is_empty() {
        return Err(RoiError::Configuration(
            "county baseline table is empty".to_string(),
        ));
    }

    let mut numerator = 0.0;
    let mut total_weight = 0.0;
    for county in counties {
        if county.weight_sum < 0.0 {
            return Err(RoiError::Configuration(format!(
                "county `{}` has negative survey weight {}",
                county.county, county.weight_sum
            )));
        }
        numerator += county.hs_median_income * county.weight_sum;
        total_weight += county.weight_sum;
    }

    if total_weight <= 0.0 {
        return Err(RoiError::Configuration(
            "zero total weight across county baseline table".to_string(),
        ));
    }

    Ok(numerator / total_weight)
}
