use crate::StatsConfig;
use crate::baseline::Naive;
use crate::ddf::{DdfBlock, parse_ddf};
use crate::error::PartitionError;
use crate::hypergraph::Hypergraph;
use crate::partition::{Partition, Partitioner};
use crate::repeats::load_hypergraph;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerStats {
    /// 1-based, as in the DDF
    pub worker: usize,
    pub sites: usize,
    pub rcc: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionStats {
    pub k: usize,
    pub workers: Vec<WorkerStats>,
    pub worst_rcc: usize,
    pub total_rcc: usize,
    /// Every site hosted by exactly one worker
    pub exact_cover: bool,
    /// Worst RCC of contiguous slicing with the same k, when k is valid for this partition
    pub naive_worst_rcc: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsReport {
    pub version: String,
    pub partition: String,
    pub num_sites: usize,
    pub num_classes: usize,
    /// Largest number of classes at a single site; no worker hosting that site can do better
    pub max_degree: usize,
    /// Classes touched by any site; no distribution can cost less in total
    pub lower_bound: usize,
    pub distributions: Vec<DistributionStats>,
}

/// Per-worker repeat class counts for each distribution of the named partition
pub fn compute_stats(
    hypergraph: &Hypergraph,
    partition_name: &str,
    blocks: &[DdfBlock],
) -> crate::error::Result<StatsReport> {
    let num_sites = hypergraph.num_sites();
    let mut distributions = Vec::with_capacity(blocks.len());

    for block in blocks {
        let sites = block.blocks_for(partition_name);
        if let Some(&site) = sites.iter().flatten().find(|&&s| s as usize >= num_sites) {
            return Err(PartitionError::SiteOutOfRange {
                site,
                sites: num_sites,
            });
        }

        let partition = Partition::new(block.k, 0, sites);
        let costs = partition.block_costs(hypergraph);
        let workers = partition
            .blocks
            .iter()
            .zip(&costs)
            .enumerate()
            .map(|(i, (sites, &rcc))| WorkerStats {
                worker: i + 1,
                sites: sites.len(),
                rcc,
            })
            .collect();
        let naive_worst_rcc = Naive
            .partition(hypergraph, block.k)
            .ok()
            .map(|p| p.bound);

        distributions.push(DistributionStats {
            k: block.k,
            workers,
            worst_rcc: costs.iter().copied().max().unwrap_or(0),
            total_rcc: costs.iter().sum(),
            exact_cover: partition.is_exact_cover(num_sites),
            naive_worst_rcc,
        });
    }

    Ok(StatsReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        partition: partition_name.to_string(),
        num_sites,
        num_classes: hypergraph.num_classes(),
        max_degree: hypergraph.max_degree(),
        lower_bound: hypergraph.used_classes(),
        distributions,
    })
}

fn output_results(
    report: &StatsReport,
    output_path: Option<&PathBuf>,
    output_format: OutputFormat,
) -> Result<()> {
    let writer: Box<dyn Write> = if let Some(path) = output_path {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file {}", path.display()))?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };

    let mut writer = writer;
    write_report(&mut writer, report, output_format)?;
    writer.flush()?;
    Ok(())
}

fn write_report<W: Write>(writer: &mut W, report: &StatsReport, output_format: OutputFormat) -> Result<()> {
    match output_format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, report)?;
            writeln!(writer)?;
        }
        OutputFormat::Csv => {
            writeln!(writer, "k,worker,sites,rcc")?;
            for dist in &report.distributions {
                for w in &dist.workers {
                    writeln!(writer, "{},{},{},{}", dist.k, w.worker, w.sites, w.rcc)?;
                }
                // Summary row per distribution: total sites and total RCC
                let sites: usize = dist.workers.iter().map(|w| w.sites).sum();
                writeln!(writer, "{},ALL,{},{}", dist.k, sites, dist.total_rcc)?;
            }
        }
        OutputFormat::Table => {
            writeln!(
                writer,
                "{}: {} sites, {} classes, max degree {}, total RCC lower bound {}",
                report.partition,
                report.num_sites,
                report.num_classes,
                report.max_degree,
                report.lower_bound
            )?;

            for dist in &report.distributions {
                writeln!(writer)?;
                let naive = dist
                    .naive_worst_rcc
                    .map_or_else(|| "-".to_string(), |n| n.to_string());
                writeln!(
                    writer,
                    "k={}: worst RCC {}, total RCC {}, naive worst RCC {}{}",
                    dist.k,
                    dist.worst_rcc,
                    dist.total_rcc,
                    naive,
                    if dist.exact_cover { "" } else { " (incomplete cover)" }
                )?;
                writeln!(writer, "{:>8} | {:>10} | {:>8}", "Worker", "Sites", "RCC")?;
                writeln!(writer, "{}", "-".repeat(8 + 3 + 10 + 3 + 8))?;
                for w in &dist.workers {
                    writeln!(writer, "{:>8} | {:>10} | {:>8}", w.worker, w.sites, w.rcc)?;
                }
            }
        }
    }
    Ok(())
}

pub fn run(config: &StatsConfig) -> Result<()> {
    let start_time = Instant::now();

    let (name, hypergraph) = load_hypergraph(&config.repeats_path, config.partition)
        .with_context(|| format!("Failed to load repeats file {}", config.repeats_path.display()))?;
    let text = fs::read_to_string(&config.ddf_path)
        .with_context(|| format!("Failed to read DDF file {}", config.ddf_path.display()))?;
    let blocks = parse_ddf(&text).with_context(|| format!("Failed to parse {}", config.ddf_path.display()))?;

    if !config.quiet {
        eprintln!(
            "Judicious v{}; mode: stats; {}: {} sites, {} classes; {} distribution(s)",
            env!("CARGO_PKG_VERSION"),
            name,
            hypergraph.num_sites(),
            hypergraph.num_classes(),
            blocks.len()
        );
    }

    let report = compute_stats(&hypergraph, &name, &blocks)?;
    output_results(&report, config.output_path.as_ref(), config.output_format)?;

    if !config.quiet {
        eprintln!("Completed in {:.2?}", start_time.elapsed());
    }
    Ok(())
}
