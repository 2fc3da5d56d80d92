//! Regrouping an existing site assignment into fewer, unevenly weighted groups.
//!
//! Groups are only ever moved whole, so no site is split and any repeat class shared by two
//! merged groups is paid for once.

use crate::classset::ClassSet;
use crate::error::{PartitionError, Result};
use crate::hypergraph::Hypergraph;
use crate::judicious::Judicious;
use crate::partition::{Partition, Partitioner};
use std::cmp::Reverse;

/// Largest scale factor tried before giving up on a set of proportions
const MAX_SCALE: u64 = 1_000_000;

/// Turn split proportions into integer weights of at least 2 each.
///
/// Uses the smallest common factor `f` for which every `round(p * f)` reaches 2.
pub fn scale_proportions(proportions: &[f64]) -> Result<Vec<usize>> {
    if proportions.is_empty() {
        return Err(PartitionError::InvalidProportions(
            "no proportions given".to_string(),
        ));
    }
    if let Some(bad) = proportions.iter().find(|p| !p.is_finite() || **p <= 0.0) {
        return Err(PartitionError::InvalidProportions(format!(
            "proportion {bad} is not a positive number"
        )));
    }

    let smallest = proportions.iter().copied().fold(f64::INFINITY, f64::min);
    // round(x) >= 2 exactly when x >= 1.5; start just below the analytic answer
    let mut factor = ((1.5 / smallest).ceil() as u64).saturating_sub(1).max(1);

    while factor <= MAX_SCALE {
        let weights: Vec<usize> = proportions
            .iter()
            .map(|p| (p * factor as f64).round() as usize)
            .collect();
        if weights.iter().all(|&w| w >= 2) {
            return Ok(weights);
        }
        factor += 1;
    }

    Err(PartitionError::InvalidProportions(format!(
        "smallest proportion {smallest} needs a scale factor above {MAX_SCALE}"
    )))
}

/// Merge whole `groups` into `weights.len()` target groups.
///
/// Groups are placed by decreasing repeat class count (original order on ties). Each goes to
/// the target furthest below its share `w_j / W` of the total cost, compared exactly as
/// `w_j * total - cost_j * W`; the lowest target index wins ties.
pub fn reassign(hypergraph: &Hypergraph, groups: &[Vec<u32>], weights: &[usize]) -> Result<Partition> {
    if weights.is_empty() || weights.contains(&0) {
        return Err(PartitionError::InvalidProportions(
            "target weights must be positive".to_string(),
        ));
    }

    let signatures = hypergraph.site_signatures();
    let costs: Vec<usize> = groups
        .iter()
        .map(|g| hypergraph.rcc(g, &signatures))
        .collect();
    let total = costs.iter().sum::<usize>() as i128;
    let weight_sum = weights.iter().sum::<usize>() as i128;

    let mut order: Vec<usize> = (0..groups.len()).filter(|&i| !groups[i].is_empty()).collect();
    order.sort_by_key(|&i| (Reverse(costs[i]), i));

    let m = hypergraph.num_classes();
    let mut targets: Vec<(Vec<u32>, ClassSet)> = vec![(Vec::new(), ClassSet::new(m)); weights.len()];

    for i in order {
        let mut best = 0;
        let mut best_deficit = i128::MIN;
        for (j, (_, classes)) in targets.iter().enumerate() {
            let deficit = weights[j] as i128 * total - classes.len() as i128 * weight_sum;
            if deficit > best_deficit {
                best = j;
                best_deficit = deficit;
            }
        }

        log::debug!(
            "Group {} (cost {}) -> target {} (deficit {}/{})",
            i,
            costs[i],
            best,
            best_deficit,
            weight_sum
        );
        let (sites, classes) = &mut targets[best];
        sites.extend_from_slice(&groups[i]);
        classes.union_with(&hypergraph.classes_of(&groups[i], &signatures));
    }

    let bound = targets.iter().map(|(_, c)| c.len()).max().unwrap_or(0);
    let blocks = targets.into_iter().map(|(sites, _)| sites).collect();
    Ok(Partition::new(weights.len(), bound, blocks))
}

/// Result of splitting one partition by proportions
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    pub weights: Vec<usize>,
    /// Judicious partition into `sum(weights)` groups
    pub groups: Partition,
    /// The groups merged into one block per proportion
    pub merged: Partition,
}

/// Partition judiciously into `sum(weights)` groups, then merge by proportion
pub fn split(hypergraph: &Hypergraph, proportions: &[f64], judicious: &Judicious) -> Result<SplitOutcome> {
    let weights = scale_proportions(proportions)?;
    let k: usize = weights.iter().sum();
    let groups = judicious.partition(hypergraph, k)?;
    let merged = reassign(hypergraph, &groups.blocks, &weights)?;
    Ok(SplitOutcome {
        weights,
        groups,
        merged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_proportions() {
        assert_eq!(scale_proportions(&[0.5, 0.5]).unwrap(), vec![2, 2]);
        assert_eq!(scale_proportions(&[0.25, 0.75]).unwrap(), vec![2, 5]);
        assert_eq!(scale_proportions(&[3.0, 7.0]).unwrap(), vec![3, 7]);
        assert_eq!(scale_proportions(&[1.0]).unwrap(), vec![2]);
    }

    #[test]
    fn test_scale_proportions_rejects_bad_input() {
        assert!(scale_proportions(&[]).is_err());
        assert!(scale_proportions(&[0.5, 0.0]).is_err());
        assert!(scale_proportions(&[0.5, -0.2]).is_err());
        assert!(scale_proportions(&[f64::NAN]).is_err());
        assert!(scale_proportions(&[1.0, 1e-9]).is_err());
    }

    #[test]
    fn test_reassign_moves_whole_groups() {
        let hg = Hypergraph::from_site_lists(
            8,
            vec![vec![0, 1], vec![2, 3], vec![4, 5], vec![6, 7], vec![0, 2]],
        );
        let groups = vec![vec![0, 1], vec![2, 3], vec![4, 5], vec![6, 7]];
        let merged = reassign(&hg, &groups, &[1, 1]).unwrap();

        assert!(merged.is_exact_cover(8));
        for group in &groups {
            let owners: Vec<_> = group
                .iter()
                .map(|&s| merged.assignment(8)[s as usize])
                .collect();
            assert!(owners.windows(2).all(|w| w[0] == w[1]));
        }
        // Costs 2, 2, 1, 1: both heavy groups go to different targets first
        assert_eq!(merged.blocks, vec![vec![0, 1, 4, 5], vec![2, 3, 6, 7]]);
    }

    #[test]
    fn test_reassign_follows_weights() {
        let hg = Hypergraph::from_site_lists(4, vec![vec![0], vec![1], vec![2], vec![3]]);
        let groups = vec![vec![0], vec![1], vec![2], vec![3]];
        let merged = reassign(&hg, &groups, &[3, 1]).unwrap();
        assert_eq!(merged.blocks, vec![vec![0, 1, 2], vec![3]]);
    }

    #[test]
    fn test_reassign_rejects_zero_weight() {
        let hg = Hypergraph::from_site_lists(2, vec![vec![0, 1]]);
        assert!(reassign(&hg, &[vec![0], vec![1]], &[1, 0]).is_err());
    }
}
