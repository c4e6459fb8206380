//! Per-institution premium and ROI derivation
//!
//! ROI is a tagged value, never a bare float with magic sentinels. The source
//! data this replaces used 999 in one place and infinity in another for
//! "never recoups"; a typed variant removes that class of bug at every
//! comparison and formatting site.

use serde::{Deserialize, Serialize};

use crate::dataset::InstitutionRecord;

/// Payback period outcome for one institution under one baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Roi {
    /// Positive earnings premium; years to recoup the total net price.
    Finite(f64),
    /// Premium is zero or negative: no finite payback period exists.
    Unrecoupable,
    /// Earnings, baseline, or price is missing (or price is an unimputed $0).
    /// Excluded from ranking, distinct from unrecoupable.
    Undetermined,
}

impl Roi {
    pub fn finite(&self) -> Option<f64> {
        match self {
            Roi::Finite(years) => Some(*years),
            _ => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, Roi::Finite(_))
    }
}

/// Premium and ROI for one institution under one baseline methodology.
/// Ranks are assigned later over the whole collection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    /// `median_earnings_10yr - baseline`; `None` when either side is missing.
    pub premium: Option<f64>,
    pub roi: Roi,
}

/// Derive premium and ROI for one record against a baseline value.
///
/// Pass the statewide constant for the statewide methodology, or the record's
/// own county baseline for the local methodology. Missing inputs produce
/// `Undetermined`, never a numeric default. A price of exactly $0 is treated
/// as missing unless the imputation pass already replaced it; a "free" ROI
/// must never outrank real ones.
pub fn derive_metric(record: &InstitutionRecord, baseline: Option<f64>) -> MetricResult {
    let premium = match (record.median_earnings_10yr, baseline) {
        (Some(earnings), Some(base)) => Some(earnings - base),
        _ => None,
    };

    let roi = match (premium, record.total_net_price) {
        (Some(premium), Some(price)) => {
            if price == 0.0 {
                Roi::Undetermined
            } else if premium > 0.0 {
                Roi::Finite(price / premium)
            } else {
                Roi::Unrecoupable
            }
        }
        _ => Roi::Undetermined,
    };

    MetricResult { premium, roi }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Sector;
    use approx::assert_relative_eq;

    fn record(earnings: Option<f64>, price: Option<f64>) -> InstitutionRecord {
        InstitutionRecord {
            unitid: Some(1),
            name: "Test College".to_string(),
            region: "Bay Area".to_string(),
            county: "Alameda".to_string(),
            sector: Sector::Public,
            median_earnings_10yr: earnings,
            total_net_price: price,
            county_hs_baseline: Some(25000.0),
            price_imputed: false,
        }
    }

    #[test]
    fn test_finite_roi() {
        let m = derive_metric(&record(Some(40000.0), Some(20000.0)), Some(25000.0));
        assert_relative_eq!(m.premium.unwrap(), 15000.0, epsilon = 1e-9);
        assert_relative_eq!(m.roi.finite().unwrap(), 20000.0 / 15000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_negative_premium_is_unrecoupable() {
        let m = derive_metric(&record(Some(20000.0), Some(15000.0)), Some(24939.44));
        assert_relative_eq!(m.premium.unwrap(), 20000.0 - 24939.44, epsilon = 1e-9);
        assert_eq!(m.roi, Roi::Unrecoupable);
    }

    #[test]
    fn test_zero_premium_is_unrecoupable() {
        let m = derive_metric(&record(Some(25000.0), Some(10000.0)), Some(25000.0));
        assert_eq!(m.roi, Roi::Unrecoupable);
    }

    #[test]
    fn test_missing_earnings_is_undetermined() {
        let m = derive_metric(&record(None, Some(20000.0)), Some(25000.0));
        assert_eq!(m.premium, None);
        assert_eq!(m.roi, Roi::Undetermined);
    }

    #[test]
    fn test_missing_price_is_undetermined_but_premium_survives() {
        let m = derive_metric(&record(Some(40000.0), None), Some(25000.0));
        assert_eq!(m.premium, Some(15000.0));
        assert_eq!(m.roi, Roi::Undetermined);
    }

    #[test]
    fn test_missing_baseline_is_undetermined() {
        // County methodology with no county baseline on the record
        let m = derive_metric(&record(Some(40000.0), Some(20000.0)), None);
        assert_eq!(m.premium, None);
        assert_eq!(m.roi, Roi::Undetermined);
    }

    #[test]
    fn test_zero_price_is_undetermined_not_free() {
        let m = derive_metric(&record(Some(40000.0), Some(0.0)), Some(25000.0));
        assert_eq!(m.roi, Roi::Undetermined);
    }
}
