//! Batch imports into JSON lines output directories.

mod common;

use common::{collection, importer, MarcXml};
use mrrc_ingest::sink::{self, JsonLinesSink, DELETES_FILE, FAILURES_FILE, INDEX_FILE, MISSING_RULES_FILE, UPSERTS_FILE};
use mrrc_ingest::{Config, ErrorKind, ImportMode, Importer, MemorySink};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn lines(path: &Path) -> Vec<Value> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn write_input(dir: &Path, name: &str, records: &[MarcXml]) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, collection(records)).unwrap();
    path
}

fn safari(recid: &str, leader: &str) -> MarcXml {
    MarcXml::new(leader)
        .control("001", recid)
        .control("003", "CaSebORM")
        .datafield("245", '1', '0', &[('a', "Programming Rust.")])
}

#[test]
fn test_import_file_writes_logs() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let path = write_input(
        input.path(),
        "cds.xml",
        &[
            MarcXml::cds_book("1", "Gauge theories"),
            MarcXml::cds_book("2", "Broken").datafield("999", ' ', ' ', &[('a', "unmapped")]),
            MarcXml::cds_book("3", "Lattice QCD"),
        ],
    );

    let importer = importer();
    let report = {
        let mut sink = JsonLinesSink::create(output.path()).unwrap();
        importer
            .import_file(&path, "cds", ImportMode::Create, &mut sink)
            .unwrap()
    };
    assert_eq!(report.total, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);

    let upserts = lines(&output.path().join(UPSERTS_FILE));
    assert_eq!(upserts.len(), 2);
    assert_eq!(upserts[0]["title"], "Gauge theories");
    assert_eq!(upserts[1]["provider"], "cds");

    let failures = lines(&output.path().join(FAILURES_FILE));
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0]["recid"], "2");
    assert_eq!(failures[0]["kind"], "LOSSY_CONVERSION");
    assert!(failures[0]["raw_snippet"].is_object());
    assert!(lines(&output.path().join(DELETES_FILE)).is_empty());
}

#[test]
fn test_lenient_import_counts_missing_rules() {
    let output = TempDir::new().unwrap();
    let importer = Importer::new(Config::default().with_strict_mode(false)).unwrap();
    let records = mrrc_ingest::marcxml::read_records_lenient(&collection(&[
        MarcXml::cds_book("2", "Partly mapped").datafield("999", ' ', ' ', &[('a', "unmapped")]),
    ]));
    {
        let mut sink = JsonLinesSink::create(output.path()).unwrap();
        importer
            .import_records(records, "cds", ImportMode::Create, &mut sink)
            .unwrap();
    }
    let missing = lines(&output.path().join(MISSING_RULES_FILE));
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0]["model"], "cds.book");
    assert_eq!(missing[0]["key"], "999__");
    assert_eq!(lines(&output.path().join(UPSERTS_FILE)).len(), 1);
}

#[test]
fn test_reindex_keeps_latest_upsert() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let importer = importer();
    for (name, title) in [("first.xml", "Draft title"), ("second.xml", "Final title")] {
        let path = write_input(input.path(), name, &[MarcXml::cds_book("1", title), MarcXml::cds_book("2", "Other")]);
        let mut sink = JsonLinesSink::create(output.path()).unwrap();
        importer
            .import_file(&path, "cds", ImportMode::Create, &mut sink)
            .unwrap();
    }

    assert_eq!(lines(&output.path().join(UPSERTS_FILE)).len(), 4);
    assert_eq!(sink::reindex(output.path()).unwrap(), 2);
    let index: Vec<Value> =
        serde_json::from_str(&fs::read_to_string(output.path().join(INDEX_FILE)).unwrap()).unwrap();
    assert_eq!(index[0]["title"], "Final title");
    assert_eq!(index[1]["provider_recid"], "2");
}

#[test]
fn test_delete_batch() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let path = write_input(
        input.path(),
        "safari-deletes.xml",
        &[
            safari("9781492052586", "00000dam a2200000 i 4500"),
            safari("9781492052587", "00000nam a2200000 i 4500"),
        ],
    );
    let report = {
        let mut sink = JsonLinesSink::create(output.path()).unwrap();
        importer()
            .import_file(&path, "safari", ImportMode::Delete, &mut sink)
            .unwrap()
    };
    assert_eq!(report.deleted, 1);
    assert_eq!(report.failed, 1);

    let deletes = lines(&output.path().join(DELETES_FILE));
    assert_eq!(deletes[0]["provider"], "safari");
    assert_eq!(deletes[0]["provider_recid"], "9781492052586");
    let failures = lines(&output.path().join(FAILURES_FILE));
    assert_eq!(failures[0]["kind"], "RECORD_NOT_DELETABLE");
}

#[test]
fn test_deleted_record_in_create_mode() {
    let xml = collection(&[
        safari("9781492052586", "00000dam a2200000 i 4500"),
        MarcXml::new("00000dam a2200000 i 4500")
            .control("001", "2654497")
            .control("003", "SzGeCERN"),
    ]);
    let records = || mrrc_ingest::marcxml::read_records_lenient(&xml);

    let mut sink = MemorySink::new();
    let report = importer()
        .import_records(records(), "safari", ImportMode::Create, &mut sink)
        .unwrap();
    assert_eq!(report.deleted, 1);
    // the CDS record belongs to another provider
    assert_eq!(sink.failures[0].kind, ErrorKind::InvalidProvider);

    let mut sink = MemorySink::new();
    importer()
        .import_records(records(), "cds", ImportMode::Create, &mut sink)
        .unwrap();
    assert_eq!(sink.failures[0].kind, ErrorKind::InvalidProvider);
    assert_eq!(sink.failures[1].kind, ErrorKind::ProviderNotAllowedDeletion);
}

#[test]
fn test_batch_level_errors() {
    let input = TempDir::new().unwrap();
    let mut sink = MemorySink::new();
    let importer = importer();

    let marc = input.path().join("records.mrc");
    fs::write(&marc, "").unwrap();
    let err = importer
        .import_file(&marc, "cds", ImportMode::Create, &mut sink)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let missing = input.path().join("absent.xml");
    let err = importer
        .import_file(&missing, "cds", ImportMode::Create, &mut sink)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);

    let path = write_input(input.path(), "cds.xml", &[MarcXml::cds_book("1", "Gauge theories")]);
    let err = importer
        .import_file(&path, "cds", ImportMode::Delete, &mut sink)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProviderNotAllowedDeletion);
    let err = importer
        .import_file(&path, "inspire", ImportMode::Create, &mut sink)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownProvider);
    assert!(sink.upserts.is_empty());
}

#[test]
fn test_malformed_record_does_not_stop_the_batch() {
    let xml = format!(
        r#"<collection>{}<record><datafield tag="24" ind1=" " ind2=" "></datafield></record>{}</collection>"#,
        MarcXml::cds_book("1", "First").record_xml(),
        MarcXml::cds_book("3", "Third").record_xml(),
    );
    let mut sink = MemorySink::new();
    let report = importer()
        .import_records(
            mrrc_ingest::marcxml::read_records_lenient(&xml),
            "cds",
            ImportMode::Create,
            &mut sink,
        )
        .unwrap();
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(sink.failures[0].recid, None);
    assert_eq!(sink.upserts[1].title.as_deref(), Some("Third"));
}
