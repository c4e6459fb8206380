//! Zero/missing net-price imputation
//!
//! A $0 net price is a data-quality artifact, not a free education. Left alone
//! it would rank as an instant payback, so the pipeline either imputes it here
//! (flagged) or the deriver excludes the record from ranking entirely.

use serde::{Deserialize, Serialize};

use super::data::{InstitutionRecord, Sector};

/// How to fill zero/missing net prices before ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImputeMethod {
    /// Leave records untouched; the deriver will mark them undetermined.
    None,
    /// Median of clean prices within the same sector, falling back to the
    /// overall median for sectors with no clean rows.
    SectorMedian,
    /// Median of all clean prices.
    OverallMedian,
}

fn needs_imputation(record: &InstitutionRecord) -> bool {
    match record.total_net_price {
        None => true,
        Some(price) => price == 0.0,
    }
}

fn median(values: &mut Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

fn clean_prices(records: &[InstitutionRecord], sector: Option<Sector>) -> Option<f64> {
    let mut prices: Vec<f64> = records
        .iter()
        .filter(|r| !needs_imputation(r))
        .filter(|r| sector.map_or(true, |s| r.sector == s))
        .filter_map(|r| r.total_net_price)
        .collect();
    median(&mut prices)
}

/// Replace zero/missing net prices in place. Imputed records are flagged via
/// `price_imputed` and the number touched is returned for the validation
/// report.
pub fn impute_net_prices(records: &mut [InstitutionRecord], method: ImputeMethod) -> usize {
    if method == ImputeMethod::None {
        return 0;
    }

    let overall = clean_prices(records, None);
    let mut imputed = 0usize;

    for i in 0..records.len() {
        if !needs_imputation(&records[i]) {
            continue;
        }
        let fill = if method == ImputeMethod::SectorMedian {
            clean_prices(records, Some(records[i].sector)).or(overall)
        } else {
            overall
        };
        if let Some(price) = fill {
            records[i].total_net_price = Some(price);
            records[i].price_imputed = true;
            imputed += 1;
        }
    }

    if imputed > 0 {
        log::info!("imputed {} zero/missing net prices via {:?}", imputed, method);
    }
    imputed
}
