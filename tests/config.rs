use assert_matches::assert_matches;
use camino::Utf8Path;

use sra_fetch::config::{Config, ConfigLoader};
use sra_fetch::error::FetchError;

#[test]
fn resolve_config_applies_defaults() {
    let config = Config {
        schema_version: None,
        output_dir: None,
        runs: vec!["SRR000001".to_string(), "ERR000002".to_string()],
    };

    let resolved = ConfigLoader::resolve_config(config).unwrap();
    assert_eq!(resolved.schema_version, 1);
    assert_eq!(resolved.runs.len(), 2);
    assert!(resolved.output_dir.is_none());
}

#[test]
fn resolve_config_rejects_blank_run() {
    let config = Config {
        schema_version: Some(1),
        output_dir: None,
        runs: vec!["  ".to_string()],
    };

    let err = ConfigLoader::resolve_config(config).unwrap_err();
    assert_matches!(err, FetchError::InvalidRunId(_));
}

#[test]
fn resolve_reads_manifest_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("sra-fetch.json");
    std::fs::write(
        &path,
        r#"{"output_dir": "data/raw", "runs": ["SRR000001", "SRR000002"]}"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(Some(path.to_str().unwrap())).unwrap();
    assert_eq!(resolved.runs.len(), 2);
    assert_eq!(resolved.output_dir.as_deref(), Some(Utf8Path::new("data/raw")));
}

#[test]
fn resolve_rejects_malformed_json() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("sra-fetch.json");
    std::fs::write(&path, "runs: [SRR000001]").unwrap();

    let err = ConfigLoader::resolve(Some(path.to_str().unwrap())).unwrap_err();
    assert_matches!(err, FetchError::ConfigParse(_));
}

#[test]
fn resolve_reports_unreadable_explicit_path() {
    let err = ConfigLoader::resolve(Some("/nonexistent/sra-fetch.json")).unwrap_err();
    assert_matches!(err, FetchError::ConfigRead(_));
}
