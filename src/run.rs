use crate::baseline::{MinMax, Naive};
use crate::ddf::write_ddf;
use crate::hypergraph::Hypergraph;
use crate::judicious::Judicious;
use crate::partition::{Partition, Partitioner};
use crate::reassign;
use crate::repeats::load_hypergraph;
use crate::{PartitionConfig, SplitConfig};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Partitioning strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Judicious,
    Naive,
    MinMax,
}

fn get_writer(output_path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    Ok(match output_path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create output file {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    })
}

fn load(path: &Path, partition: u32) -> Result<(String, Hypergraph)> {
    load_hypergraph(path, partition).with_context(|| format!("Failed to load repeats file {}", path.display()))
}

fn partition_each<P: Partitioner>(
    partitioner: &P,
    hypergraph: &Hypergraph,
    ks: &[usize],
) -> crate::error::Result<Vec<Partition>> {
    ks.iter().map(|&k| partitioner.partition(hypergraph, k)).collect()
}

/// Requested worker counts in the order given, repeats dropped
fn distinct_ks(ks: &[usize]) -> Vec<usize> {
    let mut seen = Vec::with_capacity(ks.len());
    for &k in ks {
        if !seen.contains(&k) {
            seen.push(k);
        }
    }
    seen
}

/// Write one DDF block per requested worker count, then the runtime line
pub fn partition(config: &PartitionConfig) -> Result<()> {
    let start_time = Instant::now();
    if config.ks.is_empty() {
        anyhow::bail!("No worker counts given");
    }

    let (name, hypergraph) = load(&config.repeats_path, config.partition)?;
    let ks = distinct_ks(&config.ks);

    if !config.quiet {
        eprintln!(
            "Judicious v{}; mode: partition; strategy: {:?}; k={:?}",
            env!("CARGO_PKG_VERSION"),
            config.strategy,
            ks
        );
        eprintln!(
            "{}: {} sites, {} classes, max degree {}",
            name,
            hypergraph.num_sites(),
            hypergraph.num_classes(),
            hypergraph.max_degree()
        );
    }

    let partitions = match config.strategy {
        Strategy::Judicious => Judicious::new()
            .with_max_candidates(config.max_candidates)
            .with_progress(!config.quiet)
            .partition_many(&hypergraph, &ks),
        Strategy::Naive => partition_each(&Naive, &hypergraph, &ks),
        Strategy::MinMax => partition_each(&MinMax::new(config.capacity_slack), &hypergraph, &ks),
    }
    .with_context(|| format!("Failed to partition {name}"))?;

    let mut writer = get_writer(config.output_path.as_ref())?;
    for p in &partitions {
        if !config.quiet {
            eprintln!(
                "k={}: L={}, worst RCC {}, total RCC {}, {} worker(s) used",
                p.k,
                p.bound,
                p.worst_rcc(&hypergraph),
                p.total_rcc(&hypergraph),
                p.non_empty_blocks()
            );
        }
        write_ddf(&mut writer, p, &name).context("Failed to write data distribution")?;
    }
    writeln!(writer, "Runtime: {:.3}ms", start_time.elapsed().as_secs_f64() * 1000.0)?;
    writer.flush()?;

    Ok(())
}

/// Judicious partition into weighted groups, merged into one worker per proportion
pub fn split(config: &SplitConfig) -> Result<()> {
    let start_time = Instant::now();
    let (name, hypergraph) = load(&config.repeats_path, config.partition)?;

    let judicious = Judicious::new()
        .with_max_candidates(config.max_candidates)
        .with_progress(!config.quiet);
    let outcome = reassign::split(&hypergraph, &config.proportions, &judicious)
        .with_context(|| format!("Failed to split {name}"))?;

    if !config.quiet {
        eprintln!(
            "Judicious v{}; mode: split; proportions {:?} -> weights {:?}",
            env!("CARGO_PKG_VERSION"),
            config.proportions,
            outcome.weights
        );
        eprintln!(
            "{} groups at L={} (total RCC {}) merged into {} worker(s): costs {:?}, lower bound {}",
            outcome.groups.k,
            outcome.groups.bound,
            outcome.groups.total_rcc(&hypergraph),
            outcome.merged.k,
            outcome.merged.block_costs(&hypergraph),
            hypergraph.used_classes()
        );
    }

    let mut writer = get_writer(config.output_path.as_ref())?;
    write_ddf(&mut writer, &outcome.merged, &name).context("Failed to write data distribution")?;
    writeln!(writer, "Runtime: {:.3}ms", start_time.elapsed().as_secs_f64() * 1000.0)?;
    writer.flush()?;

    Ok(())
}
