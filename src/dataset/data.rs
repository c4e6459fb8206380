//! Typed records for institutions, county baselines, and published reference ROI

use serde::{Deserialize, Serialize};

/// Institution sector categories from the source data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sector {
    Public,
    PrivateNonProfit,
    PrivateForProfit,
    /// Sector label absent or not one of the known categories.
    Unknown,
}

impl Sector {
    /// Map a raw CSV label to a sector, tolerating case and whitespace drift.
    pub fn parse(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();
        match normalized.as_str() {
            "public" => Sector::Public,
            "private non-profit" | "private nonprofit" => Sector::PrivateNonProfit,
            "private for-profit" | "private forprofit" => Sector::PrivateForProfit,
            _ => Sector::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sector::Public => "Public",
            Sector::PrivateNonProfit => "Private non-profit",
            Sector::PrivateForProfit => "Private for-profit",
            Sector::Unknown => "Unknown",
        }
    }
}

/// One institution row from the combined dataset.
///
/// Numeric fields stay `Option` through the whole pipeline: a missing value is
/// never coerced to a default that could silently participate in comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionRecord {
    /// Stable numeric identifier (IPEDS UNITID). Absent in some source files;
    /// joins then fall back to the normalized name.
    pub unitid: Option<u32>,
    /// Display name, non-empty. Secondary join key.
    pub name: String,
    pub region: String,
    pub county: String,
    pub sector: Sector,
    /// Median earnings ~10 years after enrollment.
    pub median_earnings_10yr: Option<f64>,
    /// Total program cost. Canonical representation is the full program cost;
    /// per-year figures are a rendering concern, never an input to ranking.
    pub total_net_price: Option<f64>,
    /// High-school-graduate earnings baseline for the institution's county.
    pub county_hs_baseline: Option<f64>,
    /// Set when the imputation pass replaced a zero or missing net price.
    pub price_imputed: bool,
}

/// One county row from the ACS high-school earnings survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountyBaseline {
    pub county: String,
    /// Median income of high-school graduates aged 25-34 in this county.
    pub hs_median_income: f64,
    /// ACS survey weight. Must be non-negative; the statewide baseline is the
    /// weight_sum-weighted mean across counties.
    pub weight_sum: f64,
}

/// Externally published payback figure for an institution, merged into the
/// comparison table for side-by-side display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRoi {
    pub unitid: Option<u32>,
    pub name: String,
    /// Parsed "years to recoup net costs" figure; `None` when unparseable.
    pub roi_years: Option<f64>,
}

/// Normalize an institution name for fallback joining: trimmed and
/// case-folded. Names that differ only by case or surrounding whitespace
/// must still match.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
