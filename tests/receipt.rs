use camino::{Utf8Path, Utf8PathBuf};

use sra_fetch::domain::RunId;
use sra_fetch::receipt::Receipt;

fn temp_out_dir() -> (tempfile::TempDir, Utf8PathBuf) {
    let temp = tempfile::tempdir().unwrap();
    let out = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    (temp, out)
}

#[test]
fn receipt_round_trip() {
    let (_temp, out) = temp_out_dir();
    let id: RunId = "SRR000001".parse().unwrap();
    let archive = out.join("SRR000001").join("SRR000001.sra");
    let fastq_files = vec![out.join("SRR000001_1.fastq"), out.join("SRR000001_2.fastq")];

    let receipt = Receipt::new(&id, &archive, &fastq_files);
    let path = Receipt::path_for(&out, &id);
    receipt.write(&path).unwrap();

    let loaded = Receipt::load(&path).unwrap();
    assert_eq!(loaded, receipt);
    assert_eq!(loaded.fastq_files.len(), 2);
    assert!(!loaded.fetched_at.is_empty());
}

#[test]
fn scan_collects_receipts_sorted() {
    let (_temp, out) = temp_out_dir();
    for accession in ["SRR000002", "SRR000001"] {
        let id: RunId = accession.parse().unwrap();
        let archive = out.join(accession).join(format!("{accession}.sra"));
        Receipt::new(&id, &archive, &[])
            .write(&Receipt::path_for(&out, &id))
            .unwrap();
    }
    // a run directory without a receipt is skipped
    std::fs::create_dir_all(out.join("SRR000003").as_std_path()).unwrap();

    let receipts = Receipt::scan(&out).unwrap();
    let ids: Vec<&str> = receipts.iter().map(|receipt| receipt.id.as_str()).collect();
    assert_eq!(ids, vec!["SRR000001", "SRR000002"]);
}

#[test]
fn scan_of_missing_directory_is_empty() {
    let receipts = Receipt::scan(Utf8Path::new("/nonexistent/sra-fetch-out")).unwrap();
    assert!(receipts.is_empty());
}
