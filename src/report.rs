//! Display formatting and export for the comparison table
//!
//! Rendering decisions live here, at the edge. The pipeline's tagged ROI
//! values pick their own display per variant; per-year cost figures, if ever
//! wanted, would also be derived here and never fed back into ranking.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Result, RoiError};
use crate::metrics::Roi;
use crate::pipeline::ComparisonTable;

/// `$40,000`, `-$4,939`, em-dash for missing.
pub fn format_currency(value: Option<f64>) -> String {
    match value {
        None => "—".to_string(),
        Some(v) => {
            let rounded = v.round();
            let sign = if rounded < 0.0 { "-" } else { "" };
            format!("{}${}", sign, group_thousands(rounded.abs() as u64))
        }
    }
}

fn group_thousands(mut n: u64) -> String {
    let mut groups = Vec::new();
    loop {
        let group = n % 1000;
        n /= 1000;
        if n == 0 {
            groups.push(group.to_string());
            break;
        }
        groups.push(format!("{:03}", group));
    }
    groups.reverse();
    groups.join(",")
}

/// Human rendering of a payback outcome.
///
/// Negative finite values mean the cost basis itself was negative; the money
/// is recouped before it is spent.
pub fn format_roi(roi: Roi) -> String {
    match roi {
        Roi::Undetermined => "—".to_string(),
        Roi::Unrecoupable => "Never recoups".to_string(),
        Roi::Finite(years) if years < 0.0 => "Immediate".to_string(),
        Roi::Finite(years) if years > 100.0 => "> 100 years".to_string(),
        Roi::Finite(years) => format!("{:.1} years", years),
    }
}

/// `↑ +3` improved under the local baseline, `↓ -2` worsened, `—` unchanged
/// or not comparable.
pub fn format_rank_delta(delta: Option<i64>) -> String {
    match delta {
        None | Some(0) => "—".to_string(),
        Some(d) if d > 0 => format!("↑ +{}", d),
        Some(d) => format!("↓ {}", d),
    }
}

/// Write the ranked comparison table as CSV.
pub fn write_table_csv<W: Write>(table: &ComparisonTable, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record([
            "unitid",
            "institution",
            "region",
            "county",
            "sector",
            "median_earnings_10yr",
            "total_net_price",
            "price_imputed",
            "premium_statewide",
            "premium_local",
            "roi_statewide_years",
            "roi_local_years",
            "rank_statewide",
            "rank_local",
            "rank_delta",
            "premium_delta",
            "reference_roi_years",
        ])
        .map_err(|e| RoiError::Serialize(e.to_string()))?;

    for row in &table.rows {
        csv_writer
            .write_record([
                row.unitid.map(|id| id.to_string()).unwrap_or_default(),
                row.name.clone(),
                row.region.clone(),
                row.county.clone(),
                row.sector.label().to_string(),
                number_cell(row.median_earnings_10yr),
                number_cell(row.total_net_price),
                row.price_imputed.to_string(),
                number_cell(row.statewide.premium),
                number_cell(row.local.premium),
                roi_cell(row.statewide.roi),
                roi_cell(row.local.roi),
                row.statewide.rank.to_string(),
                row.local.rank.to_string(),
                row.rank_delta.map(|d| d.to_string()).unwrap_or_default(),
                number_cell(row.premium_delta),
                number_cell(row.reference_roi_years),
            ])
            .map_err(|e| RoiError::Serialize(e.to_string()))?;
    }
    csv_writer
        .flush()
        .map_err(|e| RoiError::Serialize(e.to_string()))?;
    Ok(())
}

fn number_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

/// CSV keeps the sentinel as a label, never a magic number.
fn roi_cell(roi: Roi) -> String {
    match roi {
        Roi::Finite(years) => format!("{:.4}", years),
        Roi::Unrecoupable => "unrecoupable".to_string(),
        Roi::Undetermined => String::new(),
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    table: &'a ComparisonTable,
}

/// Serialize the full table plus validation report as pretty JSON.
pub fn table_to_json(table: &ComparisonTable) -> Result<String> {
    let report = JsonReport {
        generated_at: Utc::now(),
        table,
    };
    serde_json::to_string_pretty(&report).map_err(|e| RoiError::Serialize(e.to_string()))
}
