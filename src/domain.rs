use std::fmt;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Accession of a deposited sequencing run, e.g. `SRR000001`.
///
/// The value is handed to the SRA Toolkit verbatim, so parsing only rejects
/// empty input. An accession that does not match the usual run shape is
/// accepted with a warning; the toolkit is the authority on what resolves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = FetchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(FetchError::InvalidRunId(value.to_string()));
        }
        let run_re = Regex::new(r"^[SED]RR\d+$").unwrap();
        if !run_re.is_match(trimmed) {
            tracing::warn!(accession = trimmed, "accession does not look like a run id");
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// Path where prefetch places the downloaded archive:
/// `{output_dir}/{id}/{id}.sra`. Constructed by convention; prefetch owns
/// the actual layout and nothing here verifies it.
pub fn archive_path(output_dir: &Utf8Path, id: &RunId) -> Utf8PathBuf {
    output_dir.join(id.as_str()).join(format!("{id}.sra"))
}
