//! CSV ingestion with header normalization and currency coercion
//!
//! The source files carry the usual spreadsheet debris: trailing whitespace in
//! headers, `$` and thousands separators in numeric cells, parentheses for
//! negative values. Everything is cleaned here, at the boundary, so the
//! pipeline only ever sees typed records.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::data::{CountyBaseline, InstitutionRecord, ReferenceRoi, Sector};
use crate::error::{Result, RoiError};

/// Parse a currency-ish cell into a number.
///
/// Handles `$40,000`, `(1.2)` as `-1.2`, surrounding whitespace, and em-dash /
/// "NA" style placeholders. Returns `None` for anything that does not contain
/// a parseable number; callers decide what missing means.
pub fn parse_currency(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Accounting convention: (1234.5) means -1234.5
    let (negated, inner) = match trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
    {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };

    // Strip $, commas, spaces, and any other decoration
    let cleaned: String = inner
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let value: f64 = cleaned.parse().ok()?;
    Some(if negated { -value } else { value })
}

/// Header index with trimmed names and alias resolution.
struct ColumnMap {
    headers: Vec<String>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        Self {
            headers: headers.iter().map(|h| h.trim().to_string()).collect(),
        }
    }

    /// First column whose trimmed header matches any alias.
    fn find(&self, aliases: &[&str]) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| aliases.iter().any(|a| h == a))
    }

    fn require(&self, aliases: &[&str], path: &Path) -> Result<usize> {
        self.find(aliases).ok_or_else(|| RoiError::MissingColumn {
            column: aliases[0].to_string(),
            path: path.to_path_buf(),
        })
    }
}

fn field<'r>(record: &'r csv::StringRecord, idx: Option<usize>) -> &'r str {
    idx.and_then(|i| record.get(i)).unwrap_or("")
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|source| RoiError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::ReaderBuilder::new().flexible(true).from_reader(file))
}

/// Load the combined institution table.
pub fn load_institutions(path: &Path) -> Result<Vec<InstitutionRecord>> {
    let reader = open_reader(path)?;
    read_institutions(reader, path)
}

/// Load institutions from any reader (tests feed in-memory CSV here).
pub fn load_institutions_from_reader<R: Read>(reader: R, origin: &Path) -> Result<Vec<InstitutionRecord>> {
    let csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    read_institutions(csv_reader, origin)
}

fn read_institutions<R: Read>(mut reader: csv::Reader<R>, path: &Path) -> Result<Vec<InstitutionRecord>> {
    let headers = reader.headers().map_err(|source| RoiError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    let columns = ColumnMap::from_headers(headers);

    let name_idx = columns.require(&["Institution", "institution"], path)?;
    let unitid_idx = columns.find(&["UNITID", "unitid"]);
    let region_idx = columns.find(&["Region", "region"]);
    let county_idx = columns.find(&["County", "county"]);
    let sector_idx = columns.find(&["Sector", "sector"]);
    let price_idx = columns.find(&["total_net_price", "Total Net Price"]);
    let earnings_idx = columns.find(&["median_earnings_10yr", "Median Earnings (10y)"]);
    let baseline_idx = columns.find(&["hs_median_income", "county_hs_baseline"]);

    for (label, idx) in [
        ("total_net_price", price_idx),
        ("median_earnings_10yr", earnings_idx),
        ("hs_median_income", baseline_idx),
    ] {
        if idx.is_none() {
            log::warn!("{}: column `{}` not found, treating as all-missing", path.display(), label);
        }
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for row in reader.records() {
        let row = row.map_err(|source| RoiError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        let name = field(&row, Some(name_idx)).trim().to_string();
        if name.is_empty() {
            skipped += 1;
            continue;
        }

        records.push(InstitutionRecord {
            unitid: field(&row, unitid_idx).trim().parse().ok(),
            name,
            region: field(&row, region_idx).trim().to_string(),
            county: field(&row, county_idx).trim().to_string(),
            sector: Sector::parse(field(&row, sector_idx)),
            median_earnings_10yr: parse_currency(field(&row, earnings_idx)),
            total_net_price: parse_currency(field(&row, price_idx)),
            county_hs_baseline: parse_currency(field(&row, baseline_idx)),
            price_imputed: false,
        });
    }

    if skipped > 0 {
        log::warn!("{}: skipped {} rows with empty institution name", path.display(), skipped);
    }
    log::info!("{}: loaded {} institution records", path.display(), records.len());
    Ok(records)
}

/// Load the county high-school baseline table.
pub fn load_county_baselines(path: &Path) -> Result<Vec<CountyBaseline>> {
    let reader = open_reader(path)?;
    read_county_baselines(reader, path)
}

pub fn load_county_baselines_from_reader<R: Read>(reader: R, origin: &Path) -> Result<Vec<CountyBaseline>> {
    let csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    read_county_baselines(csv_reader, origin)
}

fn read_county_baselines<R: Read>(mut reader: csv::Reader<R>, path: &Path) -> Result<Vec<CountyBaseline>> {
    let headers = reader.headers().map_err(|source| RoiError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    let columns = ColumnMap::from_headers(headers);

    let income_idx = columns.require(&["hs_median_income"], path)?;
    let weight_idx = columns.require(&["weight_sum"], path)?;
    let county_idx = columns.find(&["county", "County", "county_name"]);

    let mut counties = Vec::new();
    let mut skipped = 0usize;
    for (i, row) in reader.records().enumerate() {
        let row = row.map_err(|source| RoiError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        let income = parse_currency(field(&row, Some(income_idx)));
        let weight = parse_currency(field(&row, Some(weight_idx)));
        let (Some(hs_median_income), Some(weight_sum)) = (income, weight) else {
            skipped += 1;
            continue;
        };

        let county = match county_idx {
            Some(idx) => field(&row, Some(idx)).trim().to_string(),
            None => format!("row {}", i + 1),
        };
        counties.push(CountyBaseline {
            county,
            hs_median_income,
            weight_sum,
        });
    }

    if skipped > 0 {
        log::warn!("{}: skipped {} county rows with unparseable numbers", path.display(), skipped);
    }
    Ok(counties)
}

/// Load externally published ROI figures ("years to recoup net costs").
pub fn load_reference_roi(path: &Path) -> Result<Vec<ReferenceRoi>> {
    let reader = open_reader(path)?;
    read_reference_roi(reader, path)
}

pub fn load_reference_roi_from_reader<R: Read>(reader: R, origin: &Path) -> Result<Vec<ReferenceRoi>> {
    let csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    read_reference_roi(csv_reader, origin)
}

fn read_reference_roi<R: Read>(mut reader: csv::Reader<R>, path: &Path) -> Result<Vec<ReferenceRoi>> {
    let headers = reader.headers().map_err(|source| RoiError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    let columns = ColumnMap::from_headers(headers);

    let roi_idx = columns.require(&["ROI: Years to Recoup Net Costs", "roi_years"], path)?;
    let name_idx = columns.require(&["Institution", "institution"], path)?;
    let unitid_idx = columns.find(&["UNITID", "unitid"]);

    let mut rows = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|source| RoiError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        let name = field(&row, Some(name_idx)).trim().to_string();
        if name.is_empty() {
            continue;
        }
        rows.push(ReferenceRoi {
            unitid: field(&row, unitid_idx).trim().parse().ok(),
            name,
            roi_years: parse_currency(field(&row, Some(roi_idx))),
        });
    }

    log::info!("{}: loaded {} reference ROI rows", path.display(), rows.len());
    Ok(rows)
}
