//! Data-quality validation
//!
//! Findings are structured and aggregated, never swallowed: every record the
//! pipeline excludes or adjusts shows up as a count here. Fatal configuration
//! problems live in [`crate::error::RoiError`]; everything in this module is
//! non-fatal and degrades only the affected records.

use serde::{Deserialize, Serialize};

use crate::dataset::InstitutionRecord;
use crate::metrics::{MetricResult, Roi};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingKind {
    ZeroNetPrice,
    MissingNetPrice,
    MissingEarnings,
    NegativeEarnings,
    /// Finite ROI outside the configured plausibility band.
    ExtremeRoi,
    /// More than 10% of a field's values are missing.
    HighMissingness,
    /// Zero/missing net price replaced by the imputation pass.
    ImputedNetPrice,
    /// Name-fallback join matched multiple reference rows.
    JoinAmbiguity,
    /// No reference row matched by UNITID or name.
    JoinMiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
}

/// One aggregated data-quality finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    /// Field or column the finding applies to.
    pub field: String,
    /// Number of affected records.
    pub count: usize,
    pub severity: Severity,
}

/// Structured list of findings, surfaced to whatever renders warnings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn add(&mut self, kind: FindingKind, field: &str, count: usize, severity: Severity) {
        if count == 0 {
            return;
        }
        log::warn!("data quality: {:?} on `{}` affects {} records", kind, field, count);
        self.findings.push(Finding {
            kind,
            field: field.to_string(),
            count,
            severity,
        });
    }

    /// Total affected records across findings of one kind.
    pub fn count(&self, kind: FindingKind) -> usize {
        self.findings
            .iter()
            .filter(|f| f.kind == kind)
            .map(|f| f.count)
            .sum()
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Plausibility band for finite ROI values, in years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiBand {
    pub min: f64,
    pub max: f64,
}

impl Default for RoiBand {
    fn default() -> Self {
        Self {
            min: -10.0,
            max: 100.0,
        }
    }
}

/// Validate raw institution records before derivation and imputation.
pub fn validate_records(records: &[InstitutionRecord]) -> ValidationReport {
    let mut report = ValidationReport::default();

    let zero_price = records
        .iter()
        .filter(|r| r.total_net_price == Some(0.0))
        .count();
    report.add(FindingKind::ZeroNetPrice, "total_net_price", zero_price, Severity::Warning);

    let missing_price = records.iter().filter(|r| r.total_net_price.is_none()).count();
    report.add(FindingKind::MissingNetPrice, "total_net_price", missing_price, Severity::Warning);

    let missing_earnings = records
        .iter()
        .filter(|r| r.median_earnings_10yr.is_none())
        .count();
    report.add(
        FindingKind::MissingEarnings,
        "median_earnings_10yr",
        missing_earnings,
        Severity::Warning,
    );

    let negative_earnings = records
        .iter()
        .filter(|r| r.median_earnings_10yr.is_some_and(|e| e < 0.0))
        .count();
    report.add(
        FindingKind::NegativeEarnings,
        "median_earnings_10yr",
        negative_earnings,
        Severity::Warning,
    );

    check_missingness(&mut report, records);
    report
}

/// Flag fields missing in more than 10% of records.
fn check_missingness(report: &mut ValidationReport, records: &[InstitutionRecord]) {
    if records.is_empty() {
        return;
    }
    let fields: [(&str, fn(&InstitutionRecord) -> bool); 4] = [
        ("unitid", |r| r.unitid.is_none()),
        ("median_earnings_10yr", |r| r.median_earnings_10yr.is_none()),
        ("total_net_price", |r| r.total_net_price.is_none()),
        ("hs_median_income", |r| r.county_hs_baseline.is_none()),
    ];
    for (field, is_missing) in fields {
        let missing = records.iter().filter(|r| is_missing(r)).count();
        if missing as f64 / records.len() as f64 > 0.1 {
            report.add(FindingKind::HighMissingness, field, missing, Severity::Warning);
        }
    }
}

/// Flag finite ROI values outside the plausibility band for one methodology.
pub fn check_roi_band(
    report: &mut ValidationReport,
    field: &str,
    metrics: &[MetricResult],
    band: RoiBand,
) {
    let extreme = metrics
        .iter()
        .filter(|m| match m.roi {
            Roi::Finite(years) => years < band.min || years > band.max,
            _ => false,
        })
        .count();
    report.add(FindingKind::ExtremeRoi, field, extreme, Severity::Warning);
}
