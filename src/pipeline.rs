//! Pipeline orchestration: one consolidated computation path
//!
//! Every consumer (CLI, export, tests) goes through [`Pipeline::run`] with
//! explicit [`MethodParams`]; there are no per-screen reimplementations of the
//! ranking logic. The full result is cached keyed by (dataset version,
//! parameters) and recomputed from source fields on any key change — derived
//! values are never adjusted in place, which is how double-scaling bugs start.

use serde::{Deserialize, Serialize};

use crate::baseline::statewide_baseline;
use crate::dataset::{
    impute_net_prices, CountyBaseline, ImputeMethod, InstitutionRecord, ReferenceRoi, Sector,
};
use crate::error::Result;
use crate::metrics::{
    derive_metric, premium_delta, rank_delta, rank_rois, JoinMatch, MetricResult, ReferenceIndex,
    Roi,
};
use crate::validate::{
    check_roi_band, validate_records, FindingKind, RoiBand, Severity, ValidationReport,
};

/// Methodology parameters, passed explicitly on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodParams {
    pub impute: ImputeMethod,
    pub roi_band: RoiBand,
}

impl Default for MethodParams {
    fn default() -> Self {
        Self {
            impute: ImputeMethod::SectorMedian,
            roi_band: RoiBand::default(),
        }
    }
}

/// Immutable input snapshot for one dataset version.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Caller-assigned version tag; changes whenever the input files change.
    pub version: String,
    pub institutions: Vec<InstitutionRecord>,
    pub counties: Vec<CountyBaseline>,
    /// Externally published ROI figures; empty when not supplied.
    pub reference: Vec<ReferenceRoi>,
}

/// Premium, ROI, and rank under one baseline methodology.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedMetric {
    pub premium: Option<f64>,
    pub roi: Roi,
    /// Competition rank; non-finite ROI records share the sentinel rank one
    /// past the worst finite rank.
    pub rank: u32,
}

/// One institution in the final comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRow {
    pub unitid: Option<u32>,
    pub name: String,
    pub region: String,
    pub county: String,
    pub sector: Sector,
    pub median_earnings_10yr: Option<f64>,
    pub total_net_price: Option<f64>,
    pub price_imputed: bool,
    pub statewide: RankedMetric,
    pub local: RankedMetric,
    /// `rank_statewide - rank_local`; positive = the county baseline ranks
    /// this institution better. `None` unless both methodologies produced a
    /// finite ROI.
    pub rank_delta: Option<i64>,
    /// `premium_local - premium_statewide`.
    pub premium_delta: Option<f64>,
    /// Published payback figure joined by UNITID (name fallback).
    pub reference_roi_years: Option<f64>,
}

/// Final ranked result set, ordered by local-baseline rank then name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonTable {
    pub statewide_baseline: f64,
    pub rows: Vec<RankedRow>,
    pub validation: ValidationReport,
}

#[derive(Debug, Clone, PartialEq)]
struct CacheKey {
    version: String,
    params: MethodParams,
}

/// Stateful wrapper adding a whole-result cache over the pure computation.
#[derive(Default)]
pub struct Pipeline {
    cache: Option<(CacheKey, ComparisonTable)>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the full pipeline, reusing the cached table when the dataset
    /// version and parameters both match the previous run.
    pub fn run(&mut self, dataset: &Dataset, params: &MethodParams) -> Result<ComparisonTable> {
        let key = CacheKey {
            version: dataset.version.clone(),
            params: params.clone(),
        };
        if let Some((cached_key, table)) = &self.cache {
            if *cached_key == key {
                log::debug!("pipeline cache hit for dataset version `{}`", key.version);
                return Ok(table.clone());
            }
        }

        let table = compute_table(dataset, params)?;
        self.cache = Some((key, table.clone()));
        Ok(table)
    }
}

/// Pure computation: records in, ranked comparison table out. Running this
/// twice on identical input yields identical output.
pub fn compute_table(dataset: &Dataset, params: &MethodParams) -> Result<ComparisonTable> {
    let mut validation = validate_records(&dataset.institutions);

    let mut records = dataset.institutions.clone();
    let imputed = impute_net_prices(&mut records, params.impute);
    validation.add(
        FindingKind::ImputedNetPrice,
        "total_net_price",
        imputed,
        Severity::Info,
    );

    let baseline = statewide_baseline(&dataset.counties)?;
    log::info!(
        "statewide baseline ${:.2} from {} counties",
        baseline,
        dataset.counties.len()
    );

    let statewide_metrics: Vec<MetricResult> = records
        .iter()
        .map(|r| derive_metric(r, Some(baseline)))
        .collect();
    let local_metrics: Vec<MetricResult> = records
        .iter()
        .map(|r| derive_metric(r, r.county_hs_baseline))
        .collect();

    let statewide_ranks = rank_rois(&roi_column(&statewide_metrics));
    let local_ranks = rank_rois(&roi_column(&local_metrics));

    check_roi_band(&mut validation, "roi_statewide_years", &statewide_metrics, params.roi_band);
    check_roi_band(&mut validation, "roi_local_years", &local_metrics, params.roi_band);

    let reference = join_reference(&records, &dataset.reference, &mut validation);

    let mut rows: Vec<RankedRow> = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let statewide = RankedMetric {
                premium: statewide_metrics[i].premium,
                roi: statewide_metrics[i].roi,
                rank: statewide_ranks[i],
            };
            let local = RankedMetric {
                premium: local_metrics[i].premium,
                roi: local_metrics[i].roi,
                rank: local_ranks[i],
            };
            let delta = if statewide.roi.is_finite() && local.roi.is_finite() {
                Some(rank_delta(statewide.rank, local.rank))
            } else {
                None
            };
            RankedRow {
                unitid: record.unitid,
                name: record.name.clone(),
                region: record.region.clone(),
                county: record.county.clone(),
                sector: record.sector,
                median_earnings_10yr: record.median_earnings_10yr,
                total_net_price: record.total_net_price,
                price_imputed: record.price_imputed,
                rank_delta: delta,
                premium_delta: premium_delta(statewide.premium, local.premium),
                reference_roi_years: reference[i],
                statewide,
                local,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.local
            .rank
            .cmp(&b.local.rank)
            .then_with(|| a.name.cmp(&b.name))
    });

    log::info!("ranked {} institutions", rows.len());
    Ok(ComparisonTable {
        statewide_baseline: baseline,
        rows,
        validation,
    })
}

fn roi_column(metrics: &[MetricResult]) -> Vec<Roi> {
    metrics.iter().map(|m| m.roi).collect()
}

/// Join published reference ROI onto the record set, counting every miss and
/// ambiguity instead of silently dropping rows.
fn join_reference(
    records: &[InstitutionRecord],
    reference: &[ReferenceRoi],
    validation: &mut ValidationReport,
) -> Vec<Option<f64>> {
    if reference.is_empty() {
        return vec![None; records.len()];
    }

    let index = ReferenceIndex::build(reference);
    let mut missing = 0usize;
    let mut ambiguous = 0usize;
    let joined = records
        .iter()
        .map(|record| match index.lookup(record.unitid, &record.name) {
            JoinMatch::Unique(i) => reference[i].roi_years,
            JoinMatch::Missing => {
                missing += 1;
                None
            }
            JoinMatch::Ambiguous => {
                ambiguous += 1;
                None
            }
        })
        .collect();

    validation.add(FindingKind::JoinMiss, "reference_roi", missing, Severity::Info);
    validation.add(
        FindingKind::JoinAmbiguity,
        "reference_roi",
        ambiguous,
        Severity::Warning,
    );
    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn institution(
        unitid: u32,
        name: &str,
        earnings: Option<f64>,
        price: Option<f64>,
        county_baseline: Option<f64>,
    ) -> InstitutionRecord {
        InstitutionRecord {
            unitid: Some(unitid),
            name: name.to_string(),
            region: "Test Region".to_string(),
            county: "Test County".to_string(),
            sector: Sector::Public,
            median_earnings_10yr: earnings,
            total_net_price: price,
            county_hs_baseline: county_baseline,
            price_imputed: false,
        }
    }

    fn scenario_dataset() -> Dataset {
        Dataset {
            version: "v1".to_string(),
            institutions: vec![
                institution(1, "First College", Some(40000.0), Some(20000.0), Some(25000.0)),
                institution(2, "Second College", Some(35000.0), Some(10000.0), Some(20000.0)),
                institution(3, "Third College", Some(20000.0), Some(15000.0), Some(25000.0)),
            ],
            // Single county pinning the statewide baseline at 24939.44
            counties: vec![CountyBaseline {
                county: "Only".to_string(),
                hs_median_income: 24939.44,
                weight_sum: 100.0,
            }],
            reference: Vec::new(),
        }
    }

    fn row_by_id(table: &ComparisonTable, unitid: u32) -> &RankedRow {
        table
            .rows
            .iter()
            .find(|r| r.unitid == Some(unitid))
            .expect("row present")
    }

    #[test]
    fn test_three_institution_scenario() {
        let table = compute_table(&scenario_dataset(), &MethodParams::default()).unwrap();
        assert_relative_eq!(table.statewide_baseline, 24939.44, epsilon = 1e-9);

        let first = row_by_id(&table, 1);
        let second = row_by_id(&table, 2);
        let third = row_by_id(&table, 3);

        // Statewide premiums
        assert_relative_eq!(first.statewide.premium.unwrap(), 40000.0 - 24939.44, epsilon = 1e-9);
        assert_relative_eq!(third.statewide.premium.unwrap(), -4939.44, epsilon = 1e-6);

        // Third has a negative statewide premium: sentinel ROI, ranked worst
        assert_eq!(third.statewide.roi, Roi::Unrecoupable);
        assert_eq!(third.statewide.rank, 3);

        // First and second get finite ROI, ranked ascending by years
        assert!(second.statewide.roi.finite().unwrap() < first.statewide.roi.finite().unwrap());
        assert_eq!(second.statewide.rank, 1);
        assert_eq!(first.statewide.rank, 2);

        // Local methodology ranks the same way for this data
        assert_eq!(second.local.rank, 1);
        assert_eq!(first.local.rank, 2);
        assert_eq!(first.rank_delta, Some(0));
        assert_eq!(third.rank_delta, None);

        // Table ordered by local rank
        assert_eq!(table.rows[0].unitid, Some(2));
    }

    #[test]
    fn test_idempotent_recomputation() {
        let dataset = scenario_dataset();
        let params = MethodParams::default();
        let a = compute_table(&dataset, &params).unwrap();
        let b = compute_table(&dataset, &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_cache_hit_returns_identical_table() {
        let dataset = scenario_dataset();
        let params = MethodParams::default();
        let mut pipeline = Pipeline::new();
        let a = pipeline.run(&dataset, &params).unwrap();
        let b = pipeline.run(&dataset, &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_cache_invalidated_by_params() {
        let dataset = scenario_dataset();
        let mut pipeline = Pipeline::new();
        let default = pipeline.run(&dataset, &MethodParams::default()).unwrap();

        let narrow = MethodParams {
            roi_band: RoiBand { min: 0.0, max: 1.0 },
            ..MethodParams::default()
        };
        let narrowed = pipeline.run(&dataset, &narrow).unwrap();

        // First College's 1.33-year ROI now sits outside the band
        assert_eq!(default.validation.count(FindingKind::ExtremeRoi), 0);
        assert!(narrowed.validation.count(FindingKind::ExtremeRoi) > 0);
    }

    #[test]
    fn test_zero_total_weight_aborts() {
        let mut dataset = scenario_dataset();
        dataset.counties[0].weight_sum = 0.0;
        let err = compute_table(&dataset, &MethodParams::default()).unwrap_err();
        assert!(matches!(err, crate::error::RoiError::Configuration(_)));
    }

    #[test]
    fn test_reference_join_counts_misses_and_ambiguities() {
        let mut dataset = scenario_dataset();
        dataset.institutions[1].unitid = None; // joins by name
        dataset.reference = vec![
            ReferenceRoi {
                unitid: Some(1),
                name: "First College".to_string(),
                roi_years: Some(1.5),
            },
            // Matches "Second College" by normalized name despite case drift
            ReferenceRoi {
                unitid: None,
                name: "  SECOND college ".to_string(),
                roi_years: Some(0.8),
            },
        ];

        let table = compute_table(&dataset, &MethodParams::default()).unwrap();
        assert_eq!(row_by_id(&table, 1).reference_roi_years, Some(1.5));
        let second = table
            .rows
            .iter()
            .find(|r| r.name == "Second College")
            .unwrap();
        assert_eq!(second.reference_roi_years, Some(0.8));

        // Third College has no reference row: counted, not hidden
        assert_eq!(row_by_id(&table, 3).reference_roi_years, None);
        assert_eq!(table.validation.count(FindingKind::JoinMiss), 1);
    }

    #[test]
    fn test_zero_price_excluded_without_imputation() {
        let mut dataset = scenario_dataset();
        dataset.institutions[0].total_net_price = Some(0.0);
        let params = MethodParams {
            impute: ImputeMethod::None,
            ..MethodParams::default()
        };
        let table = compute_table(&dataset, &params).unwrap();

        let first = row_by_id(&table, 1);
        assert_eq!(first.statewide.roi, Roi::Undetermined);
        // Sentinel rank, shared with Third College's unrecoupable
        assert_eq!(first.statewide.rank, 2);
        assert_eq!(table.validation.count(FindingKind::ZeroNetPrice), 1);
    }

    #[test]
    fn test_zero_price_imputed_when_enabled() {
        let mut dataset = scenario_dataset();
        dataset.institutions[0].total_net_price = Some(0.0);
        let table = compute_table(&dataset, &MethodParams::default()).unwrap();

        let first = row_by_id(&table, 1);
        assert!(first.price_imputed);
        // Imputed from the remaining clean prices (10000, 15000)
        assert_eq!(first.total_net_price, Some(12500.0));
        assert!(first.statewide.roi.is_finite());
        assert_eq!(table.validation.count(FindingKind::ImputedNetPrice), 1);
    }
}
