//! Rank institutions by ROI under statewide and county baselines
//!
//! Loads the combined institution table and county baseline survey, runs the
//! comparison pipeline, prints a ranked summary with any data-quality
//! findings, and optionally writes the full table as CSV and/or JSON.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};

use roi_explorer::dataset::{
    load_county_baselines, load_institutions, load_reference_roi, ImputeMethod,
};
use roi_explorer::report::{format_currency, format_rank_delta, format_roi, table_to_json, write_table_csv};
use roi_explorer::validate::RoiBand;
use roi_explorer::{Dataset, MethodParams, Pipeline};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ImputeArg {
    None,
    SectorMedian,
    OverallMedian,
}

impl From<ImputeArg> for ImputeMethod {
    fn from(arg: ImputeArg) -> Self {
        match arg {
            ImputeArg::None => ImputeMethod::None,
            ImputeArg::SectorMedian => ImputeMethod::SectorMedian,
            ImputeArg::OverallMedian => ImputeMethod::OverallMedian,
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Earnings premium and ROI rankings under statewide vs county baselines")]
struct Args {
    /// Combined institution table CSV
    #[arg(long, default_value = "data/roi_with_county_baseline_combined.csv")]
    institutions: PathBuf,

    /// County high-school baseline survey CSV
    #[arg(long, default_value = "data/hs_median_county_25_34.csv")]
    counties: PathBuf,

    /// Externally published ROI figures to merge for comparison (optional)
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Write the full ranked table to this CSV file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write the full report (table + validation) to this JSON file
    #[arg(long)]
    json: Option<PathBuf>,

    /// Zero/missing net-price handling before ranking
    #[arg(long, value_enum, default_value = "sector-median")]
    impute: ImputeArg,

    /// Lower bound of the plausible ROI band, in years
    #[arg(long, default_value_t = -10.0, allow_hyphen_values = true)]
    roi_min: f64,

    /// Upper bound of the plausible ROI band, in years
    #[arg(long, default_value_t = 100.0, allow_hyphen_values = true)]
    roi_max: f64,

    /// Number of rows to print
    #[arg(long, default_value_t = 20)]
    top: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let institutions = load_institutions(&args.institutions)
        .with_context(|| format!("loading {}", args.institutions.display()))?;
    let counties = load_county_baselines(&args.counties)
        .with_context(|| format!("loading {}", args.counties.display()))?;
    let reference = match &args.reference {
        Some(path) => {
            load_reference_roi(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => Vec::new(),
    };

    let dataset = Dataset {
        version: dataset_version(&args.institutions, &args.counties),
        institutions,
        counties,
        reference,
    };
    let params = MethodParams {
        impute: args.impute.into(),
        roi_band: RoiBand {
            min: args.roi_min,
            max: args.roi_max,
        },
    };

    let mut pipeline = Pipeline::new();
    let table = pipeline.run(&dataset, &params)?;

    println!(
        "Statewide HS baseline: {}  ({} counties, {} institutions)",
        format_currency(Some(table.statewide_baseline)),
        dataset.counties.len(),
        table.rows.len(),
    );
    println!();
    println!(
        "{:<40} {:<14} {:>14} {:>14} {:>8} {:>8} {:>8}",
        "Institution", "Region", "ROI (SW)", "ROI (Local)", "Rk SW", "Rk Loc", "Δ"
    );
    for row in table.rows.iter().take(args.top) {
        println!(
            "{:<40} {:<14} {:>14} {:>14} {:>8} {:>8} {:>8}",
            truncate(&row.name, 40),
            truncate(&row.region, 14),
            format_roi(row.statewide.roi),
            format_roi(row.local.roi),
            row.statewide.rank,
            row.local.rank,
            format_rank_delta(row.rank_delta),
        );
    }

    if !table.validation.is_clean() {
        println!("\nData-quality findings:");
        for finding in &table.validation.findings {
            println!(
                "  {:?} [{:?}] on `{}`: {} records",
                finding.kind, finding.severity, finding.field, finding.count
            );
        }
    }

    if let Some(path) = &args.output {
        let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write_table_csv(&table, file)?;
        println!("\nRanked table written to {}", path.display());
    }
    if let Some(path) = &args.json {
        fs::write(path, table_to_json(&table)?)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("JSON report written to {}", path.display());
    }

    Ok(())
}

/// Version tag from input file modification times; any edit to either file
/// invalidates cached pipeline results.
fn dataset_version(institutions: &Path, counties: &Path) -> String {
    let stamp = |path: &Path| {
        fs::metadata(path)
            .and_then(|m| m.modified())
            .map(|t| DateTime::<Utc>::from(t).to_rfc3339())
            .unwrap_or_else(|_| "unknown".to_string())
    };
    format!(
        "{}@{};{}@{}",
        institutions.display(),
        stamp(institutions),
        counties.display(),
        stamp(counties)
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}
