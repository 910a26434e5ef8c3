use std::path::{Path, PathBuf};
use std::process::Command;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::domain::RunId;
use crate::error::FetchError;

/// `--version` output of the toolkit binaries, when resolvable.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub prefetch: Option<String>,
    pub fastq_dump: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ToolStatus {
    Ready,
    Missing { message: String },
}

pub trait SraClient: Send + Sync {
    fn prefetch(&self, id: &RunId, out_dir: &Utf8Path) -> Result<(), FetchError>;
    fn dump_fastq(
        &self,
        archive: &Utf8Path,
        out_dir: &Utf8Path,
    ) -> Result<Vec<Utf8PathBuf>, FetchError>;
    fn tool_status(&self) -> ToolStatus;
    fn tool_info(&self) -> ToolInfo;
}

/// Shells out to the SRA Toolkit binaries found on `PATH`.
#[derive(Clone)]
pub struct SystemSraClient {
    prefetch: Option<PathBuf>,
    fastq_dump: Option<PathBuf>,
}

impl SystemSraClient {
    pub fn new() -> Self {
        Self {
            prefetch: find_in_path("prefetch"),
            fastq_dump: find_in_path("fastq-dump"),
        }
    }

    fn require_prefetch(&self) -> Result<&PathBuf, FetchError> {
        self.prefetch
            .as_ref()
            .ok_or_else(|| FetchError::MissingTool("prefetch".to_string()))
    }

    fn require_fastq_dump(&self) -> Result<&PathBuf, FetchError> {
        self.fastq_dump
            .as_ref()
            .ok_or_else(|| FetchError::MissingTool("fastq-dump".to_string()))
    }

    fn run_cmd(&self, program: &Path, args: &[String]) -> Result<(), FetchError> {
        tracing::debug!(program = %program.display(), ?args, "spawning");
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|err| FetchError::Subprocess(err.to_string()))?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            format!("{} exited with {}", program.display(), output.status)
        } else {
            stderr
        };
        Err(FetchError::Subprocess(message))
    }
}

impl Default for SystemSraClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SraClient for SystemSraClient {
    fn prefetch(&self, id: &RunId, out_dir: &Utf8Path) -> Result<(), FetchError> {
        let prefetch = self.require_prefetch()?;
        self.run_cmd(prefetch, &prefetch_args(id, out_dir))
    }

    fn dump_fastq(
        &self,
        archive: &Utf8Path,
        out_dir: &Utf8Path,
    ) -> Result<Vec<Utf8PathBuf>, FetchError> {
        let fastq_dump = self.require_fastq_dump()?;
        self.run_cmd(fastq_dump, &dump_args(archive, out_dir))?;
        Ok(find_exts(out_dir, "fastq"))
    }

    fn tool_status(&self) -> ToolStatus {
        if self.prefetch.is_none() {
            return ToolStatus::Missing {
                message: "missing prefetch (SRA Toolkit)".to_string(),
            };
        }
        if self.fastq_dump.is_none() {
            return ToolStatus::Missing {
                message: "missing fastq-dump (SRA Toolkit)".to_string(),
            };
        }
        ToolStatus::Ready
    }

    fn tool_info(&self) -> ToolInfo {
        ToolInfo {
            prefetch: self
                .prefetch
                .as_ref()
                .and_then(|path| tool_version(path, &["--version"])),
            fastq_dump: self
                .fastq_dump
                .as_ref()
                .and_then(|path| tool_version(path, &["--version"])),
        }
    }
}

fn prefetch_args(id: &RunId, out_dir: &Utf8Path) -> Vec<String> {
    vec![
        id.as_str().to_string(),
        "-0".to_string(),
        out_dir.as_str().to_string(),
    ]
}

fn dump_args(archive: &Utf8Path, out_dir: &Utf8Path) -> Vec<String> {
    vec![
        "--split-files".to_string(),
        archive.as_str().to_string(),
        "-0".to_string(),
        out_dir.as_str().to_string(),
    ]
}

fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var).find_map(|dir| {
        let exe = dir.join(format!("{name}.exe"));
        if exe.exists() {
            return Some(exe);
        }
        let plain = dir.join(name);
        plain.exists().then_some(plain)
    })
}

fn tool_version(path: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new(path).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() { None } else { Some(stdout) }
}

fn find_exts(root: &Utf8Path, ext: &str) -> Vec<Utf8PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        if let Ok(entries) = dir.read_dir_utf8() {
            for entry in entries.flatten() {
                let path = entry.into_path();
                if path.is_dir() {
                    stack.push(path);
                } else if path
                    .extension()
                    .map(|value| value.eq_ignore_ascii_case(ext))
                    .unwrap_or(false)
                {
                    out.push(path);
                }
            }
        }
    }
    out.sort();
    out
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn prefetch_invocation() {
        let id: RunId = "SRR000001".parse().unwrap();
        let args = prefetch_args(&id, Utf8Path::new("/data/out"));
        assert_eq!(args, vec!["SRR000001", "-0", "/data/out"]);
    }

    #[test]
    fn dump_invocation() {
        let args = dump_args(
            Utf8Path::new("/data/out/SRR000001/SRR000001.sra"),
            Utf8Path::new("/data/out"),
        );
        assert_eq!(
            args,
            vec![
                "--split-files",
                "/data/out/SRR000001/SRR000001.sra",
                "-0",
                "/data/out",
            ]
        );
    }

    #[test]
    fn find_exts_scans_recursively() {
        let temp = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(temp.path()).unwrap();
        fs::create_dir_all(root.join("SRR1").as_std_path()).unwrap();
        fs::write(root.join("SRR1_1.fastq").as_std_path(), b"@").unwrap();
        fs::write(root.join("SRR1/SRR1.sra").as_std_path(), b"x").unwrap();
        fs::write(root.join("SRR1/extra.FASTQ").as_std_path(), b"@").unwrap();

        let found = find_exts(root, "fastq");
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("fastq"))
                .unwrap_or(false)
        }));
    }
}
