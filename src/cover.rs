//! Candidate blocks and the greedy set cover over them.
//!
//! A signature fits a block when all of its classes are in the block. Two generators feed the
//! cover:
//!
//! * exhaustive: every size-`bound` superset of some signature. A block fitting nothing can
//!   never win a greedy round, so leaving those out does not change which blocks are chosen.
//! * pairwise: the union of every pair of signatures that stays within `bound` classes, plus
//!   each signature on its own. Used once the exhaustive count exceeds the budget.

use crate::classset::{self, ClassSet};
use crate::error::{PartitionError, Result};
use crate::hypergraph::Signature;
use itertools::Itertools;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Default ceiling on exhaustively generated combinations per refinement step
pub const DEFAULT_MAX_CANDIDATES: u128 = 1_000_000;

/// How the candidates of a step were generated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generator {
    Exhaustive,
    Pairwise,
}

/// A class combination of at most `bound` ids and the signatures that fit it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Class ids, ascending
    pub classes: Vec<u32>,
    /// Indices of fitting signatures, ascending
    pub covers: Vec<u32>,
}

/// A chosen block together with the signatures it claimed when chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverBlock {
    pub classes: Vec<u32>,
    pub claimed: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct Cover {
    pub bound: usize,
    pub generator: Generator,
    /// Number of candidate blocks considered
    pub candidates: usize,
    pub blocks: Vec<CoverBlock>,
}

impl Cover {
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// `C(n, r)`, saturating at `u128::MAX`
fn binomial(n: usize, r: usize) -> u128 {
    if r > n {
        return 0;
    }
    let r = r.min(n - r);
    let mut acc: u128 = 1;
    for i in 0..r {
        // acc * (n - i) is divisible by (i + 1) at every step
        acc = match acc.checked_mul((n - i) as u128) {
            Some(v) => v / (i as u128 + 1),
            None => return u128::MAX,
        };
    }
    acc
}

/// Number of signature extensions the generator would enumerate
pub fn extension_count(signatures: &[Signature], num_classes: usize, bound: usize) -> u128 {
    signatures
        .iter()
        .map(|sig| {
            let own = sig.classes.len();
            if own > bound {
                0
            } else {
                binomial(num_classes - own, bound - own)
            }
        })
        .fold(0u128, |acc, n| acc.saturating_add(n))
}

/// All size-`bound` supersets of one signature's classes, within `0..num_classes`
fn extensions(sig: &Signature, num_classes: usize, bound: usize) -> Vec<Vec<u32>> {
    let own = sig.classes.to_vec();
    if own.len() > bound {
        return Vec::new();
    }
    let missing = bound - own.len();
    if missing == 0 {
        return vec![own];
    }

    (0..num_classes as u32)
        .filter(|&id| !sig.classes.contains(id))
        .combinations(missing)
        .map(|extra| {
            let mut combination = own.clone();
            combination.extend(extra);
            combination.sort_unstable();
            combination
        })
        .collect()
}

/// Enumerate candidate blocks of size `bound`, sorted lexicographically by class ids.
///
/// Per-signature enumeration runs on the rayon pool; merging is sequential in signature order,
/// so the result does not depend on the number of threads.
pub fn generate_candidates(
    signatures: &[Signature],
    num_classes: usize,
    bound: usize,
) -> Vec<Candidate> {
    let per_signature: Vec<Vec<Vec<u32>>> = signatures
        .par_iter()
        .map(|sig| extensions(sig, num_classes, bound))
        .collect();

    let mut fits: FxHashMap<Vec<u32>, Vec<u32>> = FxHashMap::default();
    for (idx, combinations) in per_signature.into_iter().enumerate() {
        for combination in combinations {
            fits.entry(combination).or_default().push(idx as u32);
        }
    }

    let mut candidates: Vec<Candidate> = fits
        .into_iter()
        .map(|(classes, covers)| Candidate { classes, covers })
        .collect();
    candidates.par_sort_unstable_by(|a, b| a.classes.cmp(&b.classes));

    candidates
}

/// Candidate blocks built from signature pairs, sorted lexicographically by class ids.
///
/// Each signature is a candidate by itself, so every signature of at most `bound` classes is
/// fittable. Covers are recomputed against all signatures, not just the pair that built a block.
pub fn pairwise_candidates(signatures: &[Signature], bound: usize) -> Vec<Candidate> {
    let per_signature: Vec<Vec<ClassSet>> = (0..signatures.len())
        .into_par_iter()
        .map(|i| {
            let own = &signatures[i].classes;
            let mut blocks = Vec::new();
            if own.len() <= bound {
                blocks.push(own.clone());
            }
            for other in &signatures[i + 1..] {
                let merged = classset::union(own, &other.classes);
                if merged.len() <= bound {
                    blocks.push(merged);
                }
            }
            blocks
        })
        .collect();

    let mut distinct: FxHashSet<ClassSet> = FxHashSet::default();
    let blocks: Vec<ClassSet> = per_signature
        .into_iter()
        .flatten()
        .filter(|block| distinct.insert(block.clone()))
        .collect();

    let mut candidates: Vec<Candidate> = blocks
        .par_iter()
        .map(|block| Candidate {
            classes: block.to_vec(),
            covers: signatures
                .iter()
                .enumerate()
                .filter(|(_, sig)| classset::is_subset(&sig.classes, block))
                .map(|(i, _)| i as u32)
                .collect(),
        })
        .collect();
    candidates.par_sort_unstable_by(|a, b| a.classes.cmp(&b.classes));

    candidates
}

/// Greedy maximum coverage over `candidates`.
///
/// Each round picks the candidate covering the most not-yet-covered signatures, the
/// lexicographically smallest combination on ties (candidates must be sorted). Stale heap
/// entries are rescored lazily; scores only shrink, so an entry whose stale score is still
/// exact when popped is the true maximum.
pub fn greedy_cover(
    candidates: &[Candidate],
    num_signatures: usize,
    bound: usize,
) -> Result<Vec<CoverBlock>> {
    let mut covered = vec![false; num_signatures];
    let mut remaining = num_signatures;
    let mut heap: BinaryHeap<(usize, Reverse<usize>)> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| (c.covers.len(), Reverse(i)))
        .collect();
    let mut blocks = Vec::new();

    while remaining > 0 {
        let Some((stale, Reverse(i))) = heap.pop() else {
            return Err(PartitionError::Uncoverable { bound, remaining });
        };

        let candidate = &candidates[i];
        let fresh = candidate
            .covers
            .iter()
            .filter(|&&e| !covered[e as usize])
            .count();
        if fresh == 0 {
            continue;
        }
        if fresh < stale {
            heap.push((fresh, Reverse(i)));
            continue;
        }

        let claimed: Vec<u32> = candidate
            .covers
            .iter()
            .copied()
            .filter(|&e| !covered[e as usize])
            .collect();
        for &e in &claimed {
            covered[e as usize] = true;
        }
        remaining -= claimed.len();
        blocks.push(CoverBlock {
            classes: candidate.classes.clone(),
            claimed,
        });
    }

    Ok(blocks)
}

/// Generate candidates at `bound` and cover `signatures` greedily.
///
/// Exhaustive generation is used while it needs at most `budget` combinations, pairwise
/// generation otherwise. From `bound >= num_classes` on, the single block of all classes is
/// the only candidate, so a fold that outgrows pairwise generation still ends in one block.
pub fn solve(
    signatures: &[Signature],
    num_classes: usize,
    bound: usize,
    budget: u128,
) -> Result<Cover> {
    let required = extension_count(signatures, num_classes, bound);
    let (generator, candidates) = if bound >= num_classes {
        // Only the block of every class is left, and it fits everything
        let whole = Candidate {
            classes: (0..num_classes as u32).collect(),
            covers: (0..signatures.len() as u32).collect(),
        };
        (Generator::Exhaustive, vec![whole])
    } else if required <= budget {
        (
            Generator::Exhaustive,
            generate_candidates(signatures, num_classes, bound),
        )
    } else {
        log::debug!(
            "L={}: {} combinations exceed the budget of {}, generating from signature pairs",
            bound,
            required,
            budget
        );
        (Generator::Pairwise, pairwise_candidates(signatures, bound))
    };

    let blocks = greedy_cover(&candidates, signatures.len(), bound)?;
    Ok(Cover {
        bound,
        generator,
        candidates: candidates.len(),
        blocks,
    })
}
