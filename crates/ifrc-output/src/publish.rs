//! Handing assembled datasets to the catalog.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use ifrc_model::AssembledDataset;

use crate::error::{AssembleError, Result};

/// What a publisher did with one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub dataset_name: String,
    pub title: String,
    pub manifest: PathBuf,
    pub showcase_manifest: Option<PathBuf>,
    pub resources: usize,
    pub rows: usize,
}

/// Destination for assembled datasets.
pub trait Publisher {
    fn publish(&self, assembled: &AssembledDataset) -> Result<PublishReceipt>;
}

/// Writes one JSON manifest per dataset (and per showcase) into a folder,
/// for a separate uploader to push to the catalog.
#[derive(Debug, Clone)]
pub struct LocalPublisher {
    folder: PathBuf,
}

impl LocalPublisher {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }
}

impl Publisher for LocalPublisher {
    fn publish(&self, assembled: &AssembledDataset) -> Result<PublishReceipt> {
        fs::create_dir_all(&self.folder).map_err(|e| AssembleError::io(&self.folder, e))?;
        let dataset = &assembled.dataset;

        let manifest = self.folder.join(format!("{}.json", dataset.name));
        write_json(&manifest, dataset)?;

        let showcase_manifest = match &assembled.showcase {
            Some(showcase) => {
                let path = self.folder.join(format!("{}.json", showcase.name));
                write_json(&path, showcase)?;
                Some(path)
            }
            None => None,
        };

        tracing::info!(
            dataset = %dataset.name,
            manifest = %manifest.display(),
            showcase = showcase_manifest.is_some(),
            "published dataset"
        );
        Ok(PublishReceipt {
            dataset_name: dataset.name.clone(),
            title: dataset.title.clone(),
            manifest,
            showcase_manifest,
            resources: dataset.resources.len(),
            rows: dataset.primary_resource().map_or(0, |r| r.row_count),
        })
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = fs::File::create(path).map_err(|e| AssembleError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| AssembleError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|e| AssembleError::io(path, e))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn manifest_is_complete_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        write_json(&path, &json!({"name": "global-ifrc-appeals-data"})).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&text).unwrap(),
            json!({"name": "global-ifrc-appeals-data"})
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn buffered_write_failure_is_reported() {
        let full = Path::new("/dev/full");
        if !full.exists() {
            return;
        }
        let err = write_json(full, &json!({"name": "small"})).unwrap_err();
        assert!(matches!(err, AssembleError::Io { .. }), "{err:?}");
    }
}
