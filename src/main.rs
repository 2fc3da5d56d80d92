use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use judicious::{
    DEFAULT_CAPACITY_SLACK, DEFAULT_MAX_CANDIDATES, OutputFormat, PartitionConfig, SplitConfig,
    StatsConfig, Strategy,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Judicious distribution of alignment sites to minimize per-worker repeat classes", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Distribute one partition's sites over one or more worker counts
    Partition {
        /// Path to repeats file
        repeats: PathBuf,

        /// Comma-separated worker counts; one data distribution is written for each
        #[arg(value_delimiter = ',', required = true)]
        ks: Vec<usize>,

        /// Id of the partition to distribute
        #[arg(short = 'p', long = "partition", default_value_t = 0)]
        partition: u32,

        /// Partitioning strategy
        #[arg(short = 's', long = "strategy", default_value = "judicious", value_parser = ["judicious", "naive", "minmax"])]
        strategy: String,

        /// Size slack between blocks for the minmax strategy
        #[arg(short = 'c', long = "capacity-slack", default_value_t = DEFAULT_CAPACITY_SLACK)]
        capacity_slack: usize,

        /// Exhaustive candidate combinations per refinement step before falling back to signature pairs
        #[arg(long = "max-candidates", default_value_t = DEFAULT_MAX_CANDIDATES)]
        max_candidates: u128,

        /// Number of execution threads (0 = auto)
        #[arg(short = 't', long = "threads", default_value_t = 0)]
        threads: usize,

        /// Path to output file (- for stdout)
        #[arg(short = 'o', long = "output", default_value = "-")]
        output: String,

        /// Suppress progress reporting
        #[arg(short = 'q', long = "quiet", default_value_t = false)]
        quiet: bool,
    },

    /// Distribute one partition's sites over workers of unequal size
    Split {
        /// Path to repeats file
        repeats: PathBuf,

        /// Comma-separated relative worker sizes (e.g. 0.25,0.75)
        #[arg(value_delimiter = ',', required = true)]
        proportions: Vec<f64>,

        /// Id of the partition to distribute
        #[arg(short = 'p', long = "partition", default_value_t = 0)]
        partition: u32,

        /// Exhaustive candidate combinations per refinement step before falling back to signature pairs
        #[arg(long = "max-candidates", default_value_t = DEFAULT_MAX_CANDIDATES)]
        max_candidates: u128,

        /// Number of execution threads (0 = auto)
        #[arg(short = 't', long = "threads", default_value_t = 0)]
        threads: usize,

        /// Path to output file (- for stdout)
        #[arg(short = 'o', long = "output", default_value = "-")]
        output: String,

        /// Suppress progress reporting
        #[arg(short = 'q', long = "quiet", default_value_t = false)]
        quiet: bool,
    },

    /// Report per-worker repeat class counts of existing data distributions
    Stats {
        /// Path to repeats file
        repeats: PathBuf,

        /// Path to data distribution file
        ddf: PathBuf,

        /// Id of the partition the distributions refer to
        #[arg(short = 'p', long = "partition", default_value_t = 0)]
        partition: u32,

        /// Output format
        #[arg(short = 'f', long = "format", default_value = "table", value_parser = ["table", "csv", "json"])]
        format: String,

        /// Path to output file (- for stdout)
        #[arg(short = 'o', long = "output", default_value = "-")]
        output: String,

        /// Suppress progress reporting
        #[arg(short = 'q', long = "quiet", default_value_t = false)]
        quiet: bool,
    },
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn init_threads(threads: usize) -> Result<()> {
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to initialize thread pool")?;
    }
    Ok(())
}

fn output_path(output: &str) -> Option<PathBuf> {
    if output == "-" {
        None
    } else {
        Some(PathBuf::from(output))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Partition {
            repeats,
            ks,
            partition,
            strategy,
            capacity_slack,
            max_candidates,
            threads,
            output,
            quiet,
        } => {
            init_threads(*threads)?;

            let strategy = match strategy.as_str() {
                "judicious" => Strategy::Judicious,
                "naive" => Strategy::Naive,
                "minmax" => Strategy::MinMax,
                _ => unreachable!("clap should have validated the strategy"),
            };

            let config = PartitionConfig {
                repeats_path: repeats.clone(),
                ks: ks.clone(),
                partition: *partition,
                strategy,
                capacity_slack: *capacity_slack,
                max_candidates: *max_candidates,
                output_path: output_path(output),
                quiet: *quiet,
            };

            config.execute().context("Failed to run partitioning")?;
        }
        Commands::Split {
            repeats,
            proportions,
            partition,
            max_candidates,
            threads,
            output,
            quiet,
        } => {
            init_threads(*threads)?;

            let config = SplitConfig {
                repeats_path: repeats.clone(),
                proportions: proportions.clone(),
                partition: *partition,
                max_candidates: *max_candidates,
                output_path: output_path(output),
                quiet: *quiet,
            };

            config.execute().context("Failed to run split")?;
        }
        Commands::Stats {
            repeats,
            ddf,
            partition,
            format,
            output,
            quiet,
        } => {
            let output_format = match format.as_str() {
                "table" => OutputFormat::Table,
                "csv" => OutputFormat::Csv,
                "json" => OutputFormat::Json,
                _ => unreachable!("clap should have validated the format"),
            };

            let config = StatsConfig {
                repeats_path: repeats.clone(),
                ddf_path: ddf.clone(),
                partition: *partition,
                output_path: output_path(output),
                output_format,
                quiet: *quiet,
            };

            config.execute().context("Failed to compute statistics")?;
        }
    }

    Ok(())
}
