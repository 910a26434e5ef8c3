use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::domain::{self, RunId};
use crate::error::FetchError;
use crate::receipt::Receipt;
use crate::sra::{SraClient, ToolStatus};

#[derive(Debug, Clone, Serialize)]
pub struct FetchResult {
    pub items: Vec<FetchItemResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchItemResult {
    pub id: String,
    pub action: String,
    pub archive: String,
    pub fastq_files: Vec<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListResult {
    pub runs: Vec<ListEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListEntry {
    pub id: String,
    pub fetched_at: String,
    pub fastq_files: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolsResult {
    pub ready: bool,
    pub missing: Option<String>,
    pub prefetch: Option<String>,
    pub fastq_dump: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct App<S: SraClient> {
    client: S,
}

impl<S: SraClient> App<S> {
    pub fn new(client: S) -> Self {
        Self { client }
    }

    pub fn fetch(
        &self,
        runs: &[RunId],
        output_dir: &Utf8Path,
        sink: &dyn ProgressSink,
    ) -> Result<FetchResult, FetchError> {
        let mut items = Vec::new();
        for id in runs {
            items.push(self.fetch_run(id, output_dir, sink)?);
        }
        Ok(FetchResult { items })
    }

    pub fn list(
        &self,
        output_dir: &Utf8Path,
        sink: &dyn ProgressSink,
    ) -> Result<ListResult, FetchError> {
        sink.event(ProgressEvent {
            message: format!("Scanning {output_dir} for fetched runs"),
        });

        let receipts = Receipt::scan(output_dir)?;
        Ok(ListResult {
            runs: receipts
                .into_iter()
                .map(|receipt| ListEntry {
                    id: receipt.id,
                    fetched_at: receipt.fetched_at,
                    fastq_files: receipt.fastq_files,
                })
                .collect(),
        })
    }

    pub fn tools(&self, sink: &dyn ProgressSink) -> Result<ToolsResult, FetchError> {
        sink.event(ProgressEvent {
            message: "Probing SRA Toolkit binaries".to_string(),
        });

        let info = self.client.tool_info();
        let (ready, missing) = match self.client.tool_status() {
            ToolStatus::Ready => (true, None),
            ToolStatus::Missing { message } => (false, Some(message)),
        };
        Ok(ToolsResult {
            ready,
            missing,
            prefetch: info.prefetch,
            fastq_dump: info.fastq_dump,
        })
    }

    /// Downloads one run and converts it to split FASTQ.
    ///
    /// A subprocess failure from either step is reported through the sink
    /// and recorded on the returned item, never propagated; the
    /// intermediate archive is left in place either way. The output
    /// directory is used as given, never created or checked here.
    fn fetch_run(
        &self,
        id: &RunId,
        output_dir: &Utf8Path,
        sink: &dyn ProgressSink,
    ) -> Result<FetchItemResult, FetchError> {
        sink.event(ProgressEvent {
            message: format!("Downloading {id}..."),
        });

        let archive = domain::archive_path(output_dir, id);
        match self.run_pipeline(id, &archive, output_dir) {
            Ok(fastq_files) => {
                let receipt = Receipt::new(id, &archive, &fastq_files);
                receipt.write(&Receipt::path_for(output_dir, id))?;
                sink.event(ProgressEvent {
                    message: format!("Downloaded and converted {id} to FASTQ format."),
                });
                Ok(FetchItemResult {
                    id: id.to_string(),
                    action: "converted".to_string(),
                    archive: archive.into_string(),
                    fastq_files: fastq_files.iter().map(|path| path.to_string()).collect(),
                    error: None,
                })
            }
            Err(FetchError::Subprocess(detail)) => {
                sink.event(ProgressEvent {
                    message: format!("Error during dowload or conversion: {detail}"),
                });
                Ok(FetchItemResult {
                    id: id.to_string(),
                    action: "failed".to_string(),
                    archive: archive.into_string(),
                    fastq_files: Vec::new(),
                    error: Some(detail),
                })
            }
            Err(other) => Err(other),
        }
    }

    /// Prefetch, then convert the archive the prefetch step is expected to
    /// have produced. The conversion step must never run when prefetch
    /// fails; `?` on the first call enforces that.
    fn run_pipeline(
        &self,
        id: &RunId,
        archive: &Utf8Path,
        output_dir: &Utf8Path,
    ) -> Result<Vec<Utf8PathBuf>, FetchError> {
        self.client.prefetch(id, output_dir)?;
        let produced = self.client.dump_fastq(archive, output_dir)?;

        // fastq-dump names split files {id}.fastq or {id}_N.fastq; ignore
        // reads belonging to other runs sharing the output directory.
        let prefix = format!("{id}_");
        Ok(produced
            .into_iter()
            .filter(|path| {
                path.file_stem()
                    .map(|stem| stem == id.as_str() || stem.starts_with(&prefix))
                    .unwrap_or(false)
            })
            .collect())
    }
}
