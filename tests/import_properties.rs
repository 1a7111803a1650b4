//! Properties every import must keep, whatever the input.

mod common;

use common::{import, import_collection, importer, MarcXml};
use mrrc_ingest::document::{Document, Identifier, IdentifierScheme, RecordType};
use mrrc_ingest::fragment::{Fragment, Merge, Property};
use mrrc_ingest::{Config, Importer, Query, RawField, RawRecord};
use proptest::prelude::*;

fn varied_records() -> Vec<MarcXml> {
    vec![
        MarcXml::cds_book("1", "Gauge theories")
            .datafield("020", ' ', ' ', &[('a', "9781630814434"), ('u', "print version")])
            .datafield("041", ' ', ' ', &[('a', "fre")]),
        MarcXml::cds("2")
            .datafield("245", ' ', ' ', &[('a', "Fisica")])
            .datafield("246", ' ', ' ', &[('n', "v.1"), ('p', "Meccanica")])
            .datafield("596", ' ', ' ', &[('a', "MULTIVOLUMES1")]),
        MarcXml::cds("3")
            .datafield("111", ' ', ' ', &[('a', "Workshop on Y"), ('c', "Geneva"), ('9', "20100101"), ('z', "20100103")])
            .datafield("980", ' ', ' ', &[('a', "PROCEEDINGS")]),
        MarcXml::cds_book("4", "Broken").datafield("999", ' ', ' ', &[('a', "unmapped")]),
        MarcXml::cds_book("5", "Linked")
            .datafield("856", '4', ' ', &[('u', "https://learning.oreilly.com/library/view/-/9781492052586/")])
            .datafield("775", ' ', ' ', &[('w', "12"), ('x', "edition")]),
    ]
}

fn as_json(sink: &mrrc_ingest::MemorySink) -> String {
    serde_json::to_string(&sink.upserts).unwrap()
}

#[test]
fn test_translation_is_deterministic() {
    let record = MarcXml::cds_book("2654497", "Gauge theories")
        .datafield("020", ' ', ' ', &[('a', "9781630814434"), ('u', "electronic version")]);
    let importer = importer();
    let first = serde_json::to_string(&import(&importer, &record.clone(), "cds")).unwrap();
    let second = serde_json::to_string(&import(&importer, &record, "cds")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_output_does_not_depend_on_thread_count() {
    let single = Importer::new(Config::default().with_threads(1)).unwrap();
    let many = Importer::new(Config::default().with_threads(4)).unwrap();
    let records = varied_records();

    let a = import_collection(&single, &records, "cds");
    let b = import_collection(&many, &records, "cds");
    assert_eq!(as_json(&a), as_json(&b));
    assert_eq!(a.failures, b.failures);
}

#[test]
fn test_defaults_do_not_leak_between_records() {
    let records = varied_records();
    let together = import_collection(&importer(), &records, "cds");
    let alone: Vec<Document> = records
        .iter()
        .flat_map(|r| import_collection(&importer(), std::slice::from_ref(r), "cds").upserts)
        .collect();
    assert_eq!(serde_json::to_string(&together.upserts).unwrap(), serde_json::to_string(&alone).unwrap());
}

#[test]
fn test_successful_documents_are_complete() {
    let sink = import_collection(&importer(), &varied_records(), "cds");
    assert_eq!(sink.upserts.len(), 4);
    assert_eq!(sink.failures.len(), 1);
    for doc in &sink.upserts {
        assert!(doc.title.is_some(), "{:?} has no title", doc.legacy_recid);
        assert!(!doc.languages.is_empty());
        if doc.migration.record_type == RecordType::Document {
            assert!(doc.document_type.is_some());
        }
    }
    assert_eq!(sink.upserts[0].languages, vec!["FRA"]);
}

fn channel_count(doc: &Document) -> usize {
    let volumes: usize = doc
        .migration
        .volumes_urls
        .iter()
        .map(|v| v.eitems.len() + v.urls.len())
        .sum();
    doc.migration.eitems.len() + doc.urls.len() + volumes
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_url_lands_in_exactly_one_channel(
        url in prop::sample::select(vec![
            "https://cds.cern.ch/auth.py?r=EBC7654",
            "https://ezproxy.cern.ch/login?url=https://link.springer.com/book/10.1007/1",
            "https://learning.oreilly.com/library/view/-/9781492052586/",
            "https://cds.cern.ch/record/2654497/files/thesis.pdf",
            "https://link.springer.com/book/10.1007/978-1-4613-0247-6",
            "http://www.example.org/toc.html",
        ]),
        label in prop::sample::select(vec!["", "e-book", "Open Access", "Table of contents", "e-proceedings"]),
    ) {
        let record = MarcXml::cds_book("7", "Links").datafield("856", '4', ' ', &[('u', url), ('y', label)]);
        let doc = import(&importer(), &record, "cds");
        prop_assert_eq!(channel_count(&doc), 1);
        let channels = &doc.migration.eitems;
        prop_assert_eq!(channels.eitems_has_proxy, !channels.eitems_proxy.is_empty());
        prop_assert_eq!(channels.eitems_has_external, !channels.eitems_external.is_empty());
    }

    #[test]
    fn prop_query_parsing_is_total(source in "[ -~]{0,40}", value in "[A-Z0-9 ]{0,12}") {
        let record = RawRecord::builder()
            .control("003", "SzGeCERN")
            .field(RawField::data("980", ' ', ' ').subfield('a', value))
            .build();
        if let Ok(query) = Query::parse(&source) {
            let negated = Query::Not(Box::new(query.clone()));
            prop_assert_ne!(query.matches(&record), negated.matches(&record));
        }
    }

    #[test]
    fn prop_identifier_appends_are_idempotent(values in prop::collection::vec("[0-9]{10,13}", 1..8)) {
        let identifiers: Vec<Identifier> = values
            .iter()
            .map(|v| Identifier::new(v.clone(), IdentifierScheme::Isbn))
            .collect();
        let mut once = Document::default();
        once.apply(Fragment::new(Property::Identifiers(identifiers.clone())), Merge::Append);
        let mut twice = once.clone();
        twice.apply(Fragment::new(Property::Identifiers(identifiers)), Merge::Append);

        prop_assert_eq!(&once.identifiers, &twice.identifiers);
        let mut distinct = values.clone();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(once.identifiers.len(), distinct.len());
    }
}
