//! Typed records and CSV ingestion for the ROI pipeline

mod data;
pub mod impute;
pub mod loader;

pub use data::{normalize_name, CountyBaseline, InstitutionRecord, ReferenceRoi, Sector};
pub use impute::{impute_net_prices, ImputeMethod};
pub use loader::{
    load_county_baselines, load_institutions, load_reference_roi, parse_currency,
};
