//! Reading repeats files and turning label matrices into hypergraphs.
//!
//! A repeats file looks like
//!
//! ```text
//! 2 3
//! partition_0 4
//! 0 1 0 2
//! 0 0 1 1
//! 0 1 2 3
//! partition_1 2
//! ...
//! ```
//!
//! The first line holds the partition count and the internal node count. Each partition has a
//! header followed by one row per internal node, one repeat class label per site.

use crate::error::{PartitionError, Result};
use crate::hypergraph::{Hypergraph, RepeatClass};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct RepeatsPartition {
    pub id: u32,
    pub name: String,
    pub num_sites: usize,
    /// One label row per internal node
    pub rows: Vec<Vec<u32>>,
}

#[derive(Debug, Clone)]
pub struct RepeatsFile {
    pub declared_partitions: usize,
    pub internal_nodes: usize,
    pub partitions: Vec<RepeatsPartition>,
}

impl RepeatsFile {
    pub fn partition(&self, id: u32) -> Result<&RepeatsPartition> {
        self.partitions
            .iter()
            .find(|p| p.id == id)
            .ok_or(PartitionError::MissingPartition {
                id,
                available: self.partitions.len(),
            })
    }
}

impl RepeatsPartition {
    pub fn hypergraph(&self) -> Result<Hypergraph> {
        build_hypergraph(self.num_sites, &self.rows)
    }
}

/// Read and validate a repeats file
pub fn read_repeats<P: AsRef<Path>>(path: P) -> Result<RepeatsFile> {
    let text = fs::read_to_string(path)?;
    parse_repeats(&text)
}

/// Read one partition of a repeats file as a hypergraph
pub fn load_hypergraph<P: AsRef<Path>>(path: P, partition: u32) -> Result<(String, Hypergraph)> {
    let file = read_repeats(path)?;
    let part = file.partition(partition)?;
    Ok((part.name.clone(), part.hypergraph()?))
}

fn parse_usize(token: &str, line: usize, what: &str) -> Result<usize> {
    token
        .parse()
        .map_err(|_| PartitionError::parse(line, format!("{what} is not a nonnegative integer: '{token}'")))
}

fn parse_label(token: &str, line: usize) -> Result<u32> {
    token
        .parse()
        .map_err(|_| PartitionError::parse(line, format!("repeat class label is not a 32-bit nonnegative integer: '{token}'")))
}

fn parse_header(line_no: usize, line: &str) -> Result<(u32, String, usize)> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 2 {
        return Err(PartitionError::parse(
            line_no,
            format!("expected 'partition_<id> <numSites>', got '{line}'"),
        ));
    }
    let name = tokens[0];
    let id = name
        .strip_prefix("partition_")
        .and_then(|id| id.parse::<u32>().ok())
        .ok_or_else(|| PartitionError::parse(line_no, format!("bad partition name '{name}'")))?;
    let num_sites = parse_usize(tokens[1], line_no, "site count")?;
    Ok((id, name.to_string(), num_sites))
}

fn finish_partition(
    current: Option<(usize, RepeatsPartition)>,
    internal_nodes: usize,
    partitions: &mut Vec<RepeatsPartition>,
) -> Result<()> {
    if let Some((header_line, part)) = current {
        if part.rows.len() != internal_nodes {
            return Err(PartitionError::parse(
                header_line,
                format!(
                    "{} has {} row(s), expected {} (one per internal node)",
                    part.name,
                    part.rows.len(),
                    internal_nodes
                ),
            ));
        }
        partitions.push(part);
    }
    Ok(())
}

/// Parse repeats file contents
pub fn parse_repeats(text: &str) -> Result<RepeatsFile> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let (first_no, first) = lines
        .next()
        .ok_or_else(|| PartitionError::parse(1, "empty input"))?;
    let header: Vec<&str> = first.split_whitespace().collect();
    if header.len() != 2 {
        return Err(PartitionError::parse(
            first_no,
            format!("expected '<numPartitions> <numInternalNodes>', got '{first}'"),
        ));
    }
    let declared_partitions = parse_usize(header[0], first_no, "partition count")?;
    let internal_nodes = parse_usize(header[1], first_no, "internal node count")?;

    // Header counts are untrusted, so nothing is preallocated from them
    let mut partitions = Vec::new();
    let mut current: Option<(usize, RepeatsPartition)> = None;

    for (line_no, line) in lines {
        if line.starts_with("partition") {
            finish_partition(current.take(), internal_nodes, &mut partitions)?;
            let (id, name, num_sites) = parse_header(line_no, line)?;
            current = Some((
                line_no,
                RepeatsPartition {
                    id,
                    name,
                    num_sites,
                    rows: Vec::new(),
                },
            ));
            continue;
        }

        let Some((_, part)) = current.as_mut() else {
            return Err(PartitionError::parse(
                line_no,
                "label row before any partition header",
            ));
        };

        let row = line
            .split_whitespace()
            .map(|t| parse_label(t, line_no))
            .collect::<Result<Vec<u32>>>()?;
        if row.len() != part.num_sites {
            return Err(PartitionError::parse(
                line_no,
                format!(
                    "row has {} label(s), {} declares {} site(s)",
                    row.len(),
                    part.name,
                    part.num_sites
                ),
            ));
        }
        check_contiguous(&row).map_err(|message| PartitionError::parse(line_no, message))?;
        part.rows.push(row);
    }
    finish_partition(current, internal_nodes, &mut partitions)?;

    if partitions.len() != declared_partitions {
        log::warn!(
            "Repeats header declares {} partition(s), found {}",
            declared_partitions,
            partitions.len()
        );
    }

    Ok(RepeatsFile {
        declared_partitions,
        internal_nodes,
        partitions,
    })
}

/// Labels in a row must be exactly `0..=max`
fn check_contiguous(row: &[u32]) -> std::result::Result<(), String> {
    let Some(&max) = row.iter().max() else {
        return Ok(());
    };
    if max as usize >= row.len() {
        return Err(format!(
            "labels are not contiguous from 0: {max} appears in a row of {} site(s)",
            row.len()
        ));
    }
    let mut seen = vec![false; max as usize + 1];
    for &label in row {
        seen[label as usize] = true;
    }
    match seen.iter().position(|&s| !s) {
        Some(missing) => Err(format!(
            "labels are not contiguous from 0: {missing} is unused but {max} appears"
        )),
        None => Ok(()),
    }
}

/// Build the hypergraph of a label matrix: one class per distinct (row, label) pair
pub fn build_hypergraph(num_sites: usize, rows: &[Vec<u32>]) -> Result<Hypergraph> {
    let mut classes = Vec::new();

    for (node, row) in rows.iter().enumerate() {
        if row.len() != num_sites {
            return Err(PartitionError::parse(
                0,
                format!("row {node} has {} label(s), expected {num_sites}", row.len()),
            ));
        }

        let mut members: Vec<Vec<u32>> = Vec::new();
        for (site, &label) in row.iter().enumerate() {
            let label = label as usize;
            if label >= num_sites {
                return Err(PartitionError::parse(
                    0,
                    format!("row {node} has label {label}, above the site count {num_sites}"),
                ));
            }
            if label >= members.len() {
                members.resize_with(label + 1, Vec::new);
            }
            members[label].push(site as u32);
        }

        // Labels past the first unused one are never read
        for (label, sites) in members.into_iter().enumerate() {
            if sites.is_empty() {
                break;
            }
            classes.push(RepeatClass {
                id: classes.len() as u32,
                node: node as u32,
                label: label as u32,
                sites,
            });
        }
    }

    Ok(Hypergraph::from_classes(num_sites, classes))
}
