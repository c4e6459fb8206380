//! Earnings premium and ROI ranking pipeline
//!
//! Compares two methodologies for computing a higher-education earnings
//! premium — graduate earnings minus a high-school-graduate baseline — and the
//! payback-period rankings each produces:
//!
//! - **Statewide**: one survey-weighted baseline applied to every institution.
//! - **Local**: the institution's own county baseline.
//!
//! Raw institution records flow through baseline computation, per-institution
//! premium and ROI derivation, dense ranking within each methodology, and
//! rank-delta computation, ending in a validated, ordered comparison table
//! that any consumer renders or exports. The whole pipeline is pure,
//! single-threaded, and deterministic; I/O lives in [`dataset::loader`] and
//! the CLI binary.

pub mod baseline;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod validate;

pub use error::{Result, RoiError};
pub use pipeline::{compute_table, ComparisonTable, Dataset, MethodParams, Pipeline, RankedRow};
