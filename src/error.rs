use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum FetchError {
    #[error("invalid run accession: {0}")]
    InvalidRunId(String),

    #[error("missing config file sra-fetch.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("output directory required (pass --out-dir or set output_dir in the config)")]
    MissingOutputDir,

    #[error("required tool not found: {0}")]
    MissingTool(String),

    #[error("subprocess failed: {0}")]
    Subprocess(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
