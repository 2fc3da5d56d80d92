use crate::error::{PartitionError, Result};
use crate::hypergraph::Hypergraph;
use serde::{Deserialize, Serialize};

/// Assignment of sites to `k` workers.
///
/// `blocks[i]` holds worker `i`'s sites in ascending order. Blocks are disjoint; trailing blocks
/// are empty when fewer than `k` workers were needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub k: usize,
    /// Upper bound on any block's repeat class count
    pub bound: usize,
    pub blocks: Vec<Vec<u32>>,
}

impl Partition {
    /// Sorts each block and pads with empty blocks up to `k`
    pub fn new(k: usize, bound: usize, mut blocks: Vec<Vec<u32>>) -> Self {
        for block in &mut blocks {
            block.sort_unstable();
        }
        if blocks.len() < k {
            blocks.resize_with(k, Vec::new);
        }
        Self { k, bound, blocks }
    }

    /// Worker index per site, `None` for sites no block holds
    pub fn assignment(&self, num_sites: usize) -> Vec<Option<usize>> {
        let mut out = vec![None; num_sites];
        for (worker, block) in self.blocks.iter().enumerate() {
            for &site in block {
                if let Some(slot) = out.get_mut(site as usize) {
                    *slot = Some(worker);
                }
            }
        }
        out
    }

    pub fn non_empty_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_empty()).count()
    }

    /// True when every site in `[0, num_sites)` is in exactly one block
    pub fn is_exact_cover(&self, num_sites: usize) -> bool {
        let mut seen = vec![false; num_sites];
        for &site in self.blocks.iter().flatten() {
            match seen.get_mut(site as usize) {
                Some(s) if !*s => *s = true,
                _ => return false,
            }
        }
        seen.into_iter().all(|s| s)
    }

    /// Repeat class count of each block
    pub fn block_costs(&self, hypergraph: &Hypergraph) -> Vec<usize> {
        let signatures = hypergraph.site_signatures();
        self.blocks
            .iter()
            .map(|block| hypergraph.rcc(block, &signatures))
            .collect()
    }

    /// Largest repeat class count over all blocks
    pub fn worst_rcc(&self, hypergraph: &Hypergraph) -> usize {
        self.block_costs(hypergraph).into_iter().max().unwrap_or(0)
    }

    pub fn total_rcc(&self, hypergraph: &Hypergraph) -> usize {
        self.block_costs(hypergraph).into_iter().sum()
    }
}

/// A strategy distributing a hypergraph's sites over `k` workers
pub trait Partitioner {
    fn name(&self) -> &'static str;

    fn partition(&self, hypergraph: &Hypergraph, k: usize) -> Result<Partition>;
}

/// `k` must lie in `1..=num_sites`
pub fn validate_worker_count(k: usize, num_sites: usize) -> Result<()> {
    if k == 0 || k > num_sites {
        return Err(PartitionError::InvalidWorkerCount {
            k,
            sites: num_sites,
        });
    }
    Ok(())
}
