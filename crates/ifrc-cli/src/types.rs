use std::path::PathBuf;

use chrono::{DateTime, Utc};

use ifrc_reference::DatasetType;

/// Outcome of one `run` invocation.
#[derive(Debug)]
pub struct RunResult {
    pub output_dir: PathBuf,
    pub watermark: DateTime<Utc>,
    pub now: DateTime<Utc>,
    /// Countries with changes since the watermark.
    pub countries: usize,
    pub datasets: Vec<DatasetSummary>,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct DatasetSummary {
    pub dataset_type: DatasetType,
    /// `global` or the ISO3 code.
    pub scope: String,
    pub name: String,
    pub rows: usize,
    pub resources: usize,
    pub showcase: bool,
    pub manifest: Option<PathBuf>,
}

impl RunResult {
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.datasets.iter().map(|dataset| dataset.rows).sum()
    }
}
