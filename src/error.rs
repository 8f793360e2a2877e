//! Fatal error kinds raised by the sync pipeline.
//!
//! Every variant aborts the run before the target document is written, so the
//! document on disk always reflects either a full success or its pre-run state.
use std::path::PathBuf;

/// Domain errors; orchestration code wraps these in `anyhow` with context.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("registry CSV is missing required column {column:?}")]
    Schema { column: String },

    #[error("read registry CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("fetch {url} failed and no cache exists at {}: {detail}", .cache_path.display())]
    Fetch {
        url: String,
        cache_path: PathBuf,
        detail: String,
    },

    #[error("cannot parse {region}: {detail}")]
    Parse { region: String, detail: String },

    #[error("{region} is declared {count} times; refusing to pick one")]
    AmbiguousTarget { region: String, count: usize },

    #[error("identifier {identifier} is bound to both {first} and {second} in {type_name}")]
    DuplicateIdentifier {
        type_name: String,
        identifier: String,
        first: u64,
        second: u64,
    },
}

impl SyncError {
    pub(crate) fn parse(region: impl Into<String>, detail: impl Into<String>) -> Self {
        SyncError::Parse {
            region: region.into(),
            detail: detail.into(),
        }
    }
}
