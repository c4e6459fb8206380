//! Dense competition ranking over ROI years
//!
//! Ascending by finite `roi_years` (lower payback is better). Ties share the
//! minimum rank: rank = 1 + count of records with strictly smaller ROI.
//! Unrecoupable and undetermined records never interleave with finite ones;
//! they all receive a single sentinel rank one past the worst finite rank.

use super::derive::Roi;

/// Assign ranks to a collection of ROI outcomes, in input order.
///
/// Deterministic and independent of input ordering: the rank of a finite
/// value depends only on the multiset of finite values. With no finite
/// records at all, every record gets the sentinel rank 1.
pub fn rank_rois(rois: &[Roi]) -> Vec<u32> {
    let mut finite: Vec<f64> = rois.iter().filter_map(Roi::finite).collect();
    finite.sort_by(f64::total_cmp);

    let sentinel = match finite.last() {
        // Worst finite rank + 1
        Some(&worst) => count_strictly_better(&finite, worst) + 2,
        None => 1,
    };

    rois.iter()
        .map(|roi| match roi.finite() {
            Some(years) => count_strictly_better(&finite, years) + 1,
            None => sentinel,
        })
        .collect()
}

/// Number of finite ROI values strictly smaller than `years`.
/// `finite` must be sorted ascending.
fn count_strictly_better(finite: &[f64], years: f64) -> u32 {
    finite.partition_point(|v| *v < years) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascending_ranks() {
        let rois = vec![Roi::Finite(1.33), Roi::Finite(0.99), Roi::Unrecoupable];
        assert_eq!(rank_rois(&rois), vec![2, 1, 3]);
    }

    #[test]
    fn test_ties_share_minimum_rank() {
        let rois = vec![
            Roi::Finite(2.0),
            Roi::Finite(1.0),
            Roi::Finite(1.0),
            Roi::Finite(3.0),
        ];
        // Two tied at rank 1, next distinct value gets rank 3
        assert_eq!(rank_rois(&rois), vec![3, 1, 1, 4]);
    }

    #[test]
    fn test_sentinel_follows_tied_worst_rank() {
        let rois = vec![
            Roi::Finite(1.0),
            Roi::Finite(2.0),
            Roi::Finite(2.0),
            Roi::Undetermined,
        ];
        // Worst finite rank is 2 (shared), sentinel is 3
        assert_eq!(rank_rois(&rois), vec![1, 2, 2, 3]);
    }

    #[test]
    fn test_order_independence() {
        let a = vec![Roi::Finite(3.0), Roi::Finite(1.0), Roi::Finite(2.0)];
        let b = vec![Roi::Finite(1.0), Roi::Finite(2.0), Roi::Finite(3.0)];
        let ranks_a = rank_rois(&a);
        let ranks_b = rank_rois(&b);
        assert_eq!(ranks_a, vec![3, 1, 2]);
        assert_eq!(ranks_b, vec![1, 2, 3]);
    }

    #[test]
    fn test_rank_monotone_in_roi() {
        let rois = vec![
            Roi::Finite(0.5),
            Roi::Finite(4.0),
            Roi::Finite(2.5),
            Roi::Finite(2.5),
            Roi::Unrecoupable,
            Roi::Finite(9.0),
        ];
        let ranks = rank_rois(&rois);
        for (i, a) in rois.iter().enumerate() {
            for (j, b) in rois.iter().enumerate() {
                if let (Some(ra), Some(rb)) = (a.finite(), b.finite()) {
                    if ra < rb {
                        assert!(ranks[i] < ranks[j]);
                    }
                    if ra == rb {
                        assert_eq!(ranks[i], ranks[j]);
                    }
                }
            }
        }
    }

    #[test]
    fn test_no_finite_records() {
        let rois = vec![Roi::Unrecoupable, Roi::Undetermined];
        assert_eq!(rank_rois(&rois), vec![1, 1]);
    }

    #[test]
    fn test_non_finite_always_worst() {
        let rois = vec![Roi::Finite(250.0), Roi::Unrecoupable];
        let ranks = rank_rois(&rois);
        assert!(ranks[1] > ranks[0]);
    }
}
