//! Cross-methodology deltas and identifier/name joining
//!
//! Sign convention, fixed across the whole crate: `rank_delta =
//! rank_statewide - rank_county`. Positive means the county (local) baseline
//! ranks the institution better (a lower rank number). `premium_delta =
//! premium_county - premium_statewide`, positive when the local baseline
//! yields the larger premium.
//!
//! Joins prefer the stable UNITID. The normalized-name fallback is exactly
//! that, a fallback: name collisions can silently drop or duplicate records,
//! so every zero-match and multi-match is counted and surfaced, never hidden.

use std::collections::HashMap;

use crate::dataset::{normalize_name, ReferenceRoi};

/// Rank improvement from statewide to county methodology.
/// Positive = the county baseline ranks this institution better.
pub fn rank_delta(rank_statewide: u32, rank_county: u32) -> i64 {
    rank_statewide as i64 - rank_county as i64
}

/// Premium shift from statewide to county methodology.
pub fn premium_delta(premium_statewide: Option<f64>, premium_county: Option<f64>) -> Option<f64> {
    match (premium_statewide, premium_county) {
        (Some(sw), Some(local)) => Some(local - sw),
        _ => None,
    }
}

/// Outcome of looking one record up in a reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinMatch {
    /// Exactly one reference row matched.
    Unique(usize),
    /// No row matched by UNITID or name.
    Missing,
    /// More than one row matched; the record is excluded from the reference
    /// column rather than joined arbitrarily.
    Ambiguous,
}

/// Index over a reference ROI table: UNITID first, normalized name second.
pub struct ReferenceIndex {
    by_unitid: HashMap<u32, Vec<usize>>,
    by_name: HashMap<String, Vec<usize>>,
}

impl ReferenceIndex {
    pub fn build(rows: &[ReferenceRoi]) -> Self {
        let mut by_unitid: HashMap<u32, Vec<usize>> = HashMap::new();
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            if let Some(id) = row.unitid {
                by_unitid.entry(id).or_default().push(i);
            }
            by_name.entry(normalize_name(&row.name)).or_default().push(i);
        }
        Self { by_unitid, by_name }
    }

    /// Resolve a record to a reference row.
    ///
    /// A present UNITID is authoritative: if it matches nothing the result is
    /// `Missing` (no second-guessing via names). The name path applies only
    /// when the identifier is absent.
    pub fn lookup(&self, unitid: Option<u32>, name: &str) -> JoinMatch {
        if let Some(id) = unitid {
            return match self.by_unitid.get(&id).map(Vec::as_slice) {
                Some([only]) => JoinMatch::Unique(*only),
                Some(_) => JoinMatch::Ambiguous,
                None => JoinMatch::Missing,
            };
        }
        match self.by_name.get(&normalize_name(name)).map(Vec::as_slice) {
            Some([only]) => JoinMatch::Unique(*only),
            Some(_) => JoinMatch::Ambiguous,
            None => JoinMatch::Missing,
        }
    }
}
