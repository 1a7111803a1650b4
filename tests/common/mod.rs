//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use mrrc_ingest::{Config, Document, ImportMode, Importer, IngestError, MemorySink, Outcome, RawRecord};

/// Leader of a printed monograph.
pub const BOOK_LEADER: &str = "00000nam a2200000 i 4500";

/// Builder of MARCXML fixtures.
#[derive(Debug, Clone)]
pub struct MarcXml {
    leader: String,
    fields: Vec<String>,
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl MarcXml {
    pub fn new(leader: &str) -> Self {
        MarcXml {
            leader: leader.to_string(),
            fields: Vec::new(),
        }
    }

    /// CDS record with a recid and agency code.
    pub fn cds(recid: &str) -> Self {
        MarcXml::new(BOOK_LEADER)
            .control("001", recid)
            .control("003", "SzGeCERN")
    }

    /// CDS book with a title.
    pub fn cds_book(recid: &str, title: &str) -> Self {
        MarcXml::cds(recid)
            .datafield("245", ' ', ' ', &[('a', title)])
            .datafield("980", ' ', ' ', &[('a', "BOOK")])
    }

    pub fn control(mut self, tag: &str, value: &str) -> Self {
        self.fields.push(format!(
            r#"<controlfield tag="{tag}">{}</controlfield>"#,
            escape(value)
        ));
        self
    }

    pub fn datafield(mut self, tag: &str, ind1: char, ind2: char, subfields: &[(char, &str)]) -> Self {
        let body: String = subfields
            .iter()
            .map(|(code, value)| format!(r#"<subfield code="{code}">{}</subfield>"#, escape(value)))
            .collect();
        self.fields.push(format!(
            r#"<datafield tag="{tag}" ind1="{ind1}" ind2="{ind2}">{body}</datafield>"#
        ));
        self
    }

    /// The `<record>` element.
    pub fn record_xml(&self) -> String {
        format!(
            "<record><leader>{}</leader>{}</record>",
            self.leader,
            self.fields.concat()
        )
    }

    pub fn parse(&self) -> RawRecord {
        mrrc_ingest::marcxml::parse_record(&self.record_xml()).unwrap()
    }
}

/// A MARC21 slim collection of records.
pub fn collection(records: &[MarcXml]) -> String {
    let body: String = records.iter().map(MarcXml::record_xml).collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<collection xmlns="http://www.loc.gov/MARC21/slim">{body}</collection>"#
    )
}

pub fn importer() -> Importer {
    Importer::new(Config::default()).unwrap()
}

pub fn lenient_importer() -> Importer {
    Importer::new(Config::default().with_strict_mode(false)).unwrap()
}

/// Import one record, expecting a document.
pub fn import(importer: &Importer, record: &MarcXml, provider: &str) -> Document {
    match importer.import_record(&record.parse(), provider, ImportMode::Create) {
        Ok(Outcome::Upserted { document, .. }) => *document,
        other => panic!("expected an upsert, got {other:?}"),
    }
}

/// Import one record, expecting an error.
pub fn import_err(importer: &Importer, record: &MarcXml, provider: &str) -> IngestError {
    match importer.import_record(&record.parse(), provider, ImportMode::Create) {
        Err(err) => err,
        Ok(outcome) => panic!("expected an error, got {outcome:?}"),
    }
}

/// Run a whole collection through a memory sink.
pub fn import_collection(importer: &Importer, records: &[MarcXml], provider: &str) -> MemorySink {
    let parsed = mrrc_ingest::marcxml::read_records_lenient(&collection(records));
    let mut sink = MemorySink::new();
    importer
        .import_records(parsed, provider, ImportMode::Create, &mut sink)
        .unwrap();
    sink
}
