//! Premium derivation, ranking, and cross-methodology comparison

mod delta;
mod derive;
mod rank;

pub use delta::{premium_delta, rank_delta, JoinMatch, ReferenceIndex};
pub use derive::{derive_metric, MetricResult, Roi};
pub use rank::rank_rois;
