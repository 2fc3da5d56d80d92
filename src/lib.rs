//! # Judicious
//!
//! Distributes the alignment sites of a phylogenetic likelihood computation over `k` workers
//! so that the worst per-worker count of distinct repeat classes is as small as possible.
//!
//! This crate provides both a library and a binary.
//!
#![doc = include_str!("../README.md")]

pub mod baseline;
pub mod classset;
pub mod cover;
pub mod ddf;
pub mod error;
pub mod hypergraph;
pub mod judicious;
pub mod partition;
pub mod reassign;
pub mod repeats;
pub mod run;
pub mod stats;

pub use baseline::{DEFAULT_CAPACITY_SLACK, MinMax, Naive, naive_split};
pub use classset::ClassSet;
pub use cover::DEFAULT_MAX_CANDIDATES;
pub use ddf::{DdfBlock, parse_ddf, write_ddf};
pub use error::PartitionError;
pub use hypergraph::{Hypergraph, RepeatClass, Signature};
pub use judicious::{Judicious, Refinement};
pub use partition::{Partition, Partitioner};
pub use reassign::{reassign, scale_proportions, split};
pub use repeats::{RepeatsFile, load_hypergraph, parse_repeats, read_repeats};
pub use run::Strategy;
pub use stats::{OutputFormat, StatsReport, compute_stats};

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Configuration for partitioning one repeats partition for one or more worker counts
pub struct PartitionConfig {
    /// Path to repeats file
    pub repeats_path: PathBuf,

    /// Worker counts, one DDF block each
    pub ks: Vec<usize>,

    /// Id of the partition to distribute
    pub partition: u32,

    pub strategy: Strategy,

    /// Size slack for the min-max strategy
    pub capacity_slack: usize,

    /// Exhaustive candidate budget per refinement step
    pub max_candidates: u128,

    /// Path to output file (None for stdout)
    pub output_path: Option<PathBuf>,

    /// Suppress status output on stderr
    pub quiet: bool,
}

impl PartitionConfig {
    /// Create a new partitioning configuration with the specified repeats path
    pub fn new<P: AsRef<Path>>(repeats_path: P, ks: Vec<usize>) -> Self {
        Self {
            repeats_path: repeats_path.as_ref().to_path_buf(),
            ks,
            partition: 0,
            strategy: Strategy::Judicious,
            capacity_slack: DEFAULT_CAPACITY_SLACK,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            output_path: None,
            quiet: false,
        }
    }

    /// Set the partition id
    pub fn with_partition(mut self, partition: u32) -> Self {
        self.partition = partition;
        self
    }

    /// Set the strategy
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the min-max capacity slack
    pub fn with_capacity_slack(mut self, capacity_slack: usize) -> Self {
        self.capacity_slack = capacity_slack;
        self
    }

    /// Set the candidate budget
    pub fn with_max_candidates(mut self, max_candidates: u128) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    /// Set the output path
    pub fn with_output<P: AsRef<Path>>(mut self, output_path: P) -> Self {
        self.output_path = Some(output_path.as_ref().to_path_buf());
        self
    }

    /// Set quiet mode
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Execute the partitioning with this configuration
    pub fn execute(&self) -> Result<()> {
        run::partition(self)
    }
}

/// Configuration for splitting one partition across unevenly sized workers
pub struct SplitConfig {
    /// Path to repeats file
    pub repeats_path: PathBuf,

    /// Relative worker sizes, one per output worker
    pub proportions: Vec<f64>,

    /// Id of the partition to distribute
    pub partition: u32,

    /// Exhaustive candidate budget per refinement step
    pub max_candidates: u128,

    /// Path to output file (None for stdout)
    pub output_path: Option<PathBuf>,

    /// Suppress status output on stderr
    pub quiet: bool,
}

impl SplitConfig {
    /// Create a new split configuration with the specified repeats path
    pub fn new<P: AsRef<Path>>(repeats_path: P, proportions: Vec<f64>) -> Self {
        Self {
            repeats_path: repeats_path.as_ref().to_path_buf(),
            proportions,
            partition: 0,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            output_path: None,
            quiet: false,
        }
    }

    /// Set the partition id
    pub fn with_partition(mut self, partition: u32) -> Self {
        self.partition = partition;
        self
    }

    /// Set the candidate budget
    pub fn with_max_candidates(mut self, max_candidates: u128) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    /// Set the output path
    pub fn with_output<P: AsRef<Path>>(mut self, output_path: P) -> Self {
        self.output_path = Some(output_path.as_ref().to_path_buf());
        self
    }

    /// Set quiet mode
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Execute the split with this configuration
    pub fn execute(&self) -> Result<()> {
        run::split(self)
    }
}

/// Configuration for reporting repeat class counts of existing data distributions
pub struct StatsConfig {
    /// Path to repeats file
    pub repeats_path: PathBuf,

    /// Path to DDF file with one or more distributions
    pub ddf_path: PathBuf,

    /// Id of the partition the distributions refer to
    pub partition: u32,

    /// Path to output file (None for stdout)
    pub output_path: Option<PathBuf>,

    pub output_format: OutputFormat,

    /// Suppress status output on stderr
    pub quiet: bool,
}

impl StatsConfig {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(repeats_path: P, ddf_path: Q) -> Self {
        Self {
            repeats_path: repeats_path.as_ref().to_path_buf(),
            ddf_path: ddf_path.as_ref().to_path_buf(),
            partition: 0,
            output_path: None,
            output_format: OutputFormat::Table,
            quiet: false,
        }
    }

    /// Set the partition id
    pub fn with_partition(mut self, partition: u32) -> Self {
        self.partition = partition;
        self
    }

    /// Set the output path
    pub fn with_output<P: AsRef<Path>>(mut self, output_path: P) -> Self {
        self.output_path = Some(output_path.as_ref().to_path_buf());
        self
    }

    /// Set the output format
    pub fn with_format(mut self, output_format: OutputFormat) -> Self {
        self.output_format = output_format;
        self
    }

    /// Set quiet mode
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn execute(&self) -> Result<()> {
        stats::run(self)
    }
}
