use thiserror::Error;

/// Errors raised while reading inputs or partitioning a hypergraph.
///
/// Every variant describes a structural problem with the caller's input; nothing here is
/// transient, so callers should report and stop rather than retry.
#[derive(Debug, Error)]
pub enum PartitionError {
    #[error("Malformed repeats input at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Partition {id} not found in repeats input ({available} partition(s) present)")]
    MissingPartition { id: u32, available: usize },

    #[error("Invalid worker count k={k}: must be between 1 and the number of sites ({sites})")]
    InvalidWorkerCount { k: usize, sites: usize },

    #[error("Invalid split proportions: {0}")]
    InvalidProportions(String),

    #[error("No candidate block of size {bound} covers the remaining {remaining} signature(s)")]
    Uncoverable { bound: usize, remaining: usize },

    #[error("Malformed data distribution at line {line}: {message}")]
    MalformedDdf { line: usize, message: String },

    #[error("Site {site} is outside the partition's {sites} site(s)")]
    SiteOutOfRange { site: u32, sites: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PartitionError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        PartitionError::Parse {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn ddf(line: usize, message: impl Into<String>) -> Self {
        PartitionError::MalformedDdf {
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PartitionError>;
