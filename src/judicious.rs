//! Judicious partitioning: cover site signatures with as few size-L class blocks as possible,
//! growing L until the cover fits the worker count.
//!
//! Each refinement step is an immutable [`Refinement`]: a block size and the signatures to
//! cover. Probing solves the cover at that size. A cover that is too large is folded into the
//! next state by aggregating every chosen block's claimed signatures into one signature, so
//! the next step covers far fewer, larger signatures at L + 1.

use crate::classset::ClassSet;
use crate::cover::{self, Cover, DEFAULT_MAX_CANDIDATES};
use crate::error::Result;
use crate::hypergraph::{Hypergraph, Signature};
use crate::partition::{Partition, Partitioner, validate_worker_count};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Instant;

/// One state of the refinement fold
#[derive(Debug, Clone)]
pub struct Refinement {
    /// Block size L probed by this step
    pub bound: usize,
    pub signatures: Vec<Signature>,
    num_classes: usize,
    num_sites: usize,
}

impl Refinement {
    /// Starting state: per-site signatures at L = cm
    pub fn initial(hypergraph: &Hypergraph) -> Self {
        Self {
            bound: hypergraph.max_degree(),
            signatures: hypergraph.signatures(),
            num_classes: hypergraph.num_classes(),
            num_sites: hypergraph.num_sites(),
        }
    }

    pub fn probe(&self, max_candidates: u128) -> Result<Cover> {
        cover::solve(
            &self.signatures,
            self.num_classes,
            self.bound,
            max_candidates,
        )
    }

    /// Next state: one signature per chosen block, at L + 1
    pub fn aggregate(&self, cover: &Cover) -> Refinement {
        let mut consumed = vec![false; self.num_sites];
        let signatures = cover
            .blocks
            .iter()
            .map(|block| {
                let mut classes = ClassSet::new(self.num_classes);
                let mut sites = Vec::new();
                for &e in &block.claimed {
                    let sig = &self.signatures[e as usize];
                    classes.union_with(&sig.classes);
                    for &site in &sig.sites {
                        if !consumed[site as usize] {
                            consumed[site as usize] = true;
                            sites.push(site);
                        }
                    }
                }
                sites.sort_unstable();
                Signature { classes, sites }
            })
            .collect();

        Refinement {
            bound: self.bound + 1,
            signatures,
            num_classes: self.num_classes,
            num_sites: self.num_sites,
        }
    }

    /// Worker blocks from a cover: each chosen block hosts the sites of its claimed signatures
    pub fn extract(&self, cover: &Cover, k: usize) -> Partition {
        let blocks = cover
            .blocks
            .iter()
            .map(|block| {
                block
                    .claimed
                    .iter()
                    .flat_map(|&e| self.signatures[e as usize].sites.iter().copied())
                    .collect()
            })
            .collect();
        Partition::new(k, self.bound, blocks)
    }
}

/// Greedy set-cover partitioner minimizing the worst per-worker repeat class count
#[derive(Debug, Clone)]
pub struct Judicious {
    max_candidates: u128,
    progress: bool,
}

impl Default for Judicious {
    fn default() -> Self {
        Self {
            max_candidates: DEFAULT_MAX_CANDIDATES,
            progress: false,
        }
    }
}

impl Judicious {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of candidate blocks generated per step
    pub fn with_max_candidates(mut self, max_candidates: u128) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    /// Show a spinner on stderr while refining
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    fn spinner(&self) -> Option<ProgressBar> {
        if !self.progress {
            return None;
        }
        let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        let style = ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message("Refining cover");
        Some(pb)
    }

    /// Partition once per requested worker count, in the order given.
    ///
    /// The sequence of covers does not depend on k, so a single refinement run serves every
    /// k: each one is extracted from the first step whose cover has at most k blocks.
    pub fn partition_many(&self, hypergraph: &Hypergraph, ks: &[usize]) -> Result<Vec<Partition>> {
        for &k in ks {
            validate_worker_count(k, hypergraph.num_sites())?;
        }
        let mut results: Vec<Option<Partition>> = vec![None; ks.len()];
        if ks.is_empty() {
            return Ok(Vec::new());
        }

        let spinner = self.spinner();
        let mut state = Refinement::initial(hypergraph);
        log::debug!(
            "Refinement start: {} sites, {} classes, {} distinct signatures, cm={}",
            hypergraph.num_sites(),
            hypergraph.num_classes(),
            state.signatures.len(),
            state.bound
        );

        loop {
            let step_start = Instant::now();
            let cover = state.probe(self.max_candidates)?;
            log::debug!(
                "L={}: {} signatures, {} {:?} candidates, cover of {} blocks in {:.2?}",
                state.bound,
                state.signatures.len(),
                cover.candidates,
                cover.generator,
                cover.len(),
                step_start.elapsed()
            );
            if let Some(pb) = &spinner {
                pb.set_message(format!("Refining: L={}, cover of {} blocks", state.bound, cover.len()));
                pb.tick();
            }

            for (slot, &k) in results.iter_mut().zip(ks) {
                if slot.is_none() && cover.len() <= k {
                    log::info!("k={}: {} blocks at L={}", k, cover.len(), state.bound);
                    *slot = Some(state.extract(&cover, k));
                }
            }

            if results.iter().all(Option::is_some) {
                break;
            }
            state = state.aggregate(&cover);
        }

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        Ok(results.into_iter().flatten().collect())
    }
}

impl Partitioner for Judicious {
    fn name(&self) -> &'static str {
        "judicious"
    }

    fn partition(&self, hypergraph: &Hypergraph, k: usize) -> Result<Partition> {
        let mut partitions = self.partition_many(hypergraph, &[k])?;
        Ok(partitions.remove(0))
    }
}
