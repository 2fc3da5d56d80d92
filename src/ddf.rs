//! Data distribution files (DDF): which worker hosts which sites of which partition.
//!
//! ```text
//! 2
//! CPU1 1
//! partition_0 3 0 2 3
//! CPU2 1
//! partition_0 2 1 4
//! ```

use crate::error::{PartitionError, Result};
use crate::partition::Partition;
use std::io::{self, Write};

/// Sites of one partition hosted by a worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub partition: String,
    pub sites: Vec<u32>,
}

/// One distribution over `k` workers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdfBlock {
    pub k: usize,
    pub workers: Vec<Vec<Assignment>>,
}

impl DdfBlock {
    /// Per-worker sites of the named partition
    pub fn blocks_for(&self, partition: &str) -> Vec<Vec<u32>> {
        self.workers
            .iter()
            .map(|assignments| {
                assignments
                    .iter()
                    .filter(|a| a.partition == partition)
                    .flat_map(|a| a.sites.iter().copied())
                    .collect()
            })
            .collect()
    }
}

/// Write a single-partition distribution. Workers without sites get no partition line.
pub fn write_ddf<W: Write>(writer: &mut W, partition: &Partition, name: &str) -> io::Result<()> {
    writeln!(writer, "{}", partition.k)?;
    for (i, block) in partition.blocks.iter().enumerate() {
        if block.is_empty() {
            writeln!(writer, "CPU{} 0", i + 1)?;
            continue;
        }
        writeln!(writer, "CPU{} 1", i + 1)?;
        write!(writer, "{} {}", name, block.len())?;
        for site in block {
            write!(writer, " {site}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn parse_count(token: Option<&str>, line: usize, what: &str) -> Result<usize> {
    let token = token.ok_or_else(|| PartitionError::ddf(line, format!("missing {what}")))?;
    token
        .parse()
        .map_err(|_| PartitionError::ddf(line, format!("{what} is not an integer: '{token}'")))
}

fn parse_site(token: &str, line: usize) -> Result<u32> {
    token
        .parse()
        .map_err(|_| PartitionError::ddf(line, format!("site is not a 32-bit nonnegative integer: '{token}'")))
}

/// Parse one or more concatenated DDF blocks. `Runtime:` lines are skipped.
pub fn parse_ddf(text: &str) -> Result<Vec<DdfBlock>> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with("Runtime:"));
    let mut blocks = Vec::new();

    while let Some((line_no, line)) = lines.next() {
        let k = parse_count(Some(line), line_no, "worker count")?;
        let mut workers = Vec::new();

        for expected in 1..=k {
            let (cpu_no, cpu_line) = lines
                .next()
                .ok_or_else(|| PartitionError::ddf(line_no, format!("expected {k} workers, found {}", expected - 1)))?;
            let mut tokens = cpu_line.split_whitespace();
            if !tokens.next().is_some_and(|t| t.starts_with("CPU")) {
                return Err(PartitionError::ddf(
                    cpu_no,
                    format!("expected 'CPU<i> <numPartitions>', got '{cpu_line}'"),
                ));
            }
            let count = parse_count(tokens.next(), cpu_no, "partition count")?;

            let mut assignments = Vec::new();
            for _ in 0..count {
                let (a_no, a_line) = lines
                    .next()
                    .ok_or_else(|| PartitionError::ddf(cpu_no, "missing partition line"))?;
                let mut tokens = a_line.split_whitespace();
                let name = tokens
                    .next()
                    .ok_or_else(|| PartitionError::ddf(a_no, "missing partition name"))?
                    .to_string();
                let num_sites = parse_count(tokens.next(), a_no, "site count")?;
                let sites = tokens
                    .map(|t| parse_site(t, a_no))
                    .collect::<Result<Vec<u32>>>()?;
                if sites.len() != num_sites {
                    return Err(PartitionError::ddf(
                        a_no,
                        format!("declares {num_sites} site(s) but lists {}", sites.len()),
                    ));
                }
                assignments.push(Assignment {
                    partition: name,
                    sites,
                });
            }
            workers.push(assignments);
        }

        blocks.push(DdfBlock { k, workers });
    }

    Ok(blocks)
}
