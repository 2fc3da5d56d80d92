//! Reference partitioners used to judge the quality of judicious partitioning.

use crate::classset::{self, ClassSet};
use crate::error::Result;
use crate::hypergraph::Hypergraph;
use crate::partition::{Partition, Partitioner, validate_worker_count};

/// Default slack between the fullest viable block and the emptiest block
pub const DEFAULT_CAPACITY_SLACK: usize = 12;

/// Contiguous slices of near-equal size, the first `n % k` one site larger
pub fn naive_split(num_sites: usize, k: usize) -> Vec<Vec<u32>> {
    let base = num_sites / k;
    let extra = num_sites % k;
    let mut start = 0;
    (0..k)
        .map(|i| {
            let len = base + usize::from(i < extra);
            let block = (start as u32..(start + len) as u32).collect();
            start += len;
            block
        })
        .collect()
}

/// Splits the site range without looking at repeat classes
#[derive(Debug, Clone, Copy, Default)]
pub struct Naive;

impl Partitioner for Naive {
    fn name(&self) -> &'static str {
        "naive"
    }

    fn partition(&self, hypergraph: &Hypergraph, k: usize) -> Result<Partition> {
        validate_worker_count(k, hypergraph.num_sites())?;
        let blocks = naive_split(hypergraph.num_sites(), k);
        let mut partition = Partition::new(k, 0, blocks);
        partition.bound = partition.worst_rcc(hypergraph);
        Ok(partition)
    }
}

/// Streaming assignment in site order.
///
/// A block is viable while it holds at most `slack` more sites than the emptiest block. Each
/// site joins the viable block sharing the most of its classes, or the emptiest block when no
/// viable block shares any.
#[derive(Debug, Clone, Copy)]
pub struct MinMax {
    pub slack: usize,
}

impl Default for MinMax {
    fn default() -> Self {
        Self {
            slack: DEFAULT_CAPACITY_SLACK,
        }
    }
}

impl MinMax {
    pub fn new(slack: usize) -> Self {
        Self { slack }
    }
}

impl Partitioner for MinMax {
    fn name(&self) -> &'static str {
        "minmax"
    }

    fn partition(&self, hypergraph: &Hypergraph, k: usize) -> Result<Partition> {
        validate_worker_count(k, hypergraph.num_sites())?;

        let m = hypergraph.num_classes();
        let mut blocks: Vec<Vec<u32>> = vec![Vec::new(); k];
        let mut block_classes: Vec<ClassSet> = vec![ClassSet::new(m); k];

        for (site, classes) in hypergraph.site_signatures().into_iter().enumerate() {
            let smallest = (0..k).min_by_key(|&i| blocks[i].len()).unwrap_or(0);
            let capacity = blocks[smallest].len() + self.slack;

            let mut best = smallest;
            let mut best_shared = 0;
            for i in (0..k).filter(|&i| blocks[i].len() <= capacity) {
                let shared = classes.len() - classset::difference(&classes, &block_classes[i]).len();
                if shared > best_shared {
                    best = i;
                    best_shared = shared;
                }
            }

            blocks[best].push(site as u32);
            block_classes[best].union_with(&classes);
        }

        let bound = block_classes.iter().map(ClassSet::len).max().unwrap_or(0);
        Ok(Partition::new(k, bound, blocks))
    }
}
