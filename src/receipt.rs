use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::domain::RunId;
use crate::error::FetchError;

pub const RECEIPT_FILE: &str = "receipt.json";

/// Record written next to a converted run so `list` can report what an
/// output directory holds without re-running the toolkit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: String,
    pub fetched_at: String,
    pub archive: String,
    pub fastq_files: Vec<String>,
}

impl Receipt {
    pub fn new(id: &RunId, archive: &Utf8Path, fastq_files: &[Utf8PathBuf]) -> Self {
        Self {
            id: id.as_str().to_string(),
            fetched_at: chrono::Utc::now().to_rfc3339(),
            archive: archive.to_string(),
            fastq_files: fastq_files.iter().map(|path| path.to_string()).collect(),
        }
    }

    /// `{output_dir}/{id}/receipt.json`, alongside the archive.
    pub fn path_for(output_dir: &Utf8Path, id: &RunId) -> Utf8PathBuf {
        output_dir.join(id.as_str()).join(RECEIPT_FILE)
    }

    pub fn write(&self, path: &Utf8Path) -> Result<(), FetchError> {
        let parent = path
            .parent()
            .ok_or_else(|| FetchError::Filesystem("receipt path has no parent".to_string()))?;
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| FetchError::Filesystem(err.to_string()))?;
        let content = serde_json::to_vec_pretty(self)
            .map_err(|err| FetchError::Filesystem(err.to_string()))?;
        let temp = tempfile::Builder::new()
            .prefix(".receipt")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| FetchError::Filesystem(err.to_string()))?;
        fs::write(temp.path(), &content).map_err(|err| FetchError::Filesystem(err.to_string()))?;
        temp.persist(path.as_std_path())
            .map_err(|err| FetchError::Filesystem(err.to_string()))?;
        Ok(())
    }

    pub fn load(path: &Utf8Path) -> Result<Self, FetchError> {
        let content = fs::read_to_string(path.as_std_path())
            .map_err(|err| FetchError::Filesystem(err.to_string()))?;
        serde_json::from_str(&content).map_err(|err| FetchError::Filesystem(err.to_string()))
    }

    /// Collects receipts from the run subdirectories of `output_dir`,
    /// sorted by accession. A missing directory is an empty listing.
    pub fn scan(output_dir: &Utf8Path) -> Result<Vec<Receipt>, FetchError> {
        if !output_dir.as_std_path().exists() {
            return Ok(Vec::new());
        }
        let entries = output_dir
            .read_dir_utf8()
            .map_err(|err| FetchError::Filesystem(err.to_string()))?;
        let mut receipts = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| FetchError::Filesystem(err.to_string()))?;
            let candidate = entry.path().join(RECEIPT_FILE);
            if candidate.is_file() {
                receipts.push(Self::load(&candidate)?);
            }
        }
        receipts.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(receipts)
    }
}
