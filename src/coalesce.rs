//! Cross-field reconciliation after the rule pass.
//!
//! Rules see one field at a time, so data that belongs together but arrives
//! through different tags (a volume's barcode in `088`, its title in `246`,
//! its link in `856`) is parked in [`Document::pending`] or in the sidecar
//! lists. [`Coalescer::run`] resolves it, in this order:
//!
//! 1. volume correlation by token
//! 2. barcodes into items
//! 3. multipart upgrade
//! 4. electronic item classification
//! 5. conference title fallback
//! 6. relation typing
//! 7. deletable flag
//!
//! Errors raised here go through the same [`HandlerTable`] as rule errors.

use crate::document::{
    Document, EItem, EItemChannels, Item, ModeOfIssuance, RecordType, Related, RelationType,
    SequenceOrder, Url, Volume, VolumeUrls,
};
use crate::error::{Result, RuleError};
use crate::handlers::{Diagnostic, HandlerTable, RELATION_OVERLAP};
use crate::parsers::{classify_url, UrlClass};
use crate::record::RawRecord;
use crate::vocabulary::{Lookup, RELATION_TYPES};
use indexmap::IndexMap;
use log::warn;

/// Post-processing settings of one batch.
#[derive(Debug, Clone)]
pub struct Coalescer {
    doi_resolver_prefix: String,
    proxy_prefix: String,
}

/// Fill `slot` from `value`; two different values for one volume need a
/// cataloguer.
fn merge_slot(
    slot: &mut Option<String>,
    value: Option<String>,
    token: &str,
    what: &str,
    subfield: &str,
) -> std::result::Result<(), RuleError> {
    let Some(value) = value else {
        return Ok(());
    };
    if let Some(existing) = slot.as_deref() {
        if existing != value {
            return Err(RuleError::manual(subfield).with_message(format!(
                "volume {token} has two {what}s: '{existing}' and '{value}'"
            )));
        }
        return Ok(());
    }
    *slot = Some(value);
    Ok(())
}

/// Record one more physical copy of a volume.
fn add_copy(volume: &mut Volume, barcode: String) {
    match &volume.barcode {
        None => volume.barcode = Some(barcode),
        Some(first) if *first == barcode || volume.copies.contains(&barcode) => {},
        Some(_) => volume.copies.push(barcode),
    }
}

fn merge_volume(into: &mut Volume, other: Volume) -> std::result::Result<(), RuleError> {
    let token = into.volume.clone();
    merge_slot(&mut into.title, other.title, &token, "title", "p")?;
    merge_slot(
        &mut into.physical_description,
        other.physical_description,
        &token,
        "physical description",
        "u",
    )?;
    for barcode in other.barcode.into_iter().chain(other.copies) {
        add_copy(into, barcode);
    }
    if into.publication_year.is_none() {
        into.publication_year = other.publication_year;
    }
    for identifier in other.identifiers {
        if !into.identifiers.contains(&identifier) {
            into.identifiers.push(identifier);
        }
    }
    Ok(())
}

fn push_unique(list: &mut Vec<EItem>, item: EItem) {
    if !list.iter().any(|e| e.url.value == item.url.value) {
        list.push(item);
    }
}

/// Put one URL into its channel, or into `urls` when it is a plain link.
fn dispatch_url(
    channels: &mut EItemChannels,
    urls: &mut Vec<Url>,
    class: UrlClass,
    url: Url,
    open_access: bool,
) {
    let (list, open_access) = match class {
        UrlClass::Ebl => (&mut channels.eitems_ebl, None),
        UrlClass::Safari => (&mut channels.eitems_safari, None),
        UrlClass::LocalFile => (&mut channels.eitems_file_links, None),
        UrlClass::Proxy => (&mut channels.eitems_proxy, Some(open_access)),
        UrlClass::External => (&mut channels.eitems_external, Some(open_access)),
        UrlClass::Plain => {
            if !urls.contains(&url) {
                urls.push(url);
            }
            return;
        },
    };
    push_unique(list, EItem { url, open_access });
}

impl Coalescer {
    /// Coalescer resolving DOIs with `doi_resolver_prefix` (containing
    /// `{doi}`) and stripping `proxy_prefix` from proxied links.
    #[must_use]
    pub fn new(doi_resolver_prefix: impl Into<String>, proxy_prefix: impl Into<String>) -> Self {
        Coalescer {
            doi_resolver_prefix: doi_resolver_prefix.into(),
            proxy_prefix: proxy_prefix.into(),
        }
    }

    /// Run every step on a translated document.
    ///
    /// `proceedings` enables the conference title fallback.
    ///
    /// # Errors
    ///
    /// Errors escalated by `handlers`: conflicting volume data
    /// (`ManualImportRequired`), relations without `$w`
    /// (`MissingRequiredField`) and, in strict mode, unknown relation types.
    pub fn run(
        &self,
        doc: &mut Document,
        record: &RawRecord,
        proceedings: bool,
        handlers: &HandlerTable,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<()> {
        if let Err(err) = correlate_volumes(doc) {
            handlers.handle(err.at("246__"), diagnostics)?;
        }
        if let Err(err) = attach_barcodes(doc) {
            handlers.handle(err.at("088__"), diagnostics)?;
        }
        upgrade_multipart(doc);
        self.classify_eitems(doc);
        if proceedings {
            conference_title_fallback(doc);
        }
        type_relations(doc, handlers, diagnostics)?;
        doc.is_deletable = record.is_deletable();
        Ok(())
    }

    fn classify_eitems(&self, doc: &mut Document) {
        let record_open_access = doc.migration.eitems_open_access.unwrap_or(false);
        let mut per_volume: IndexMap<String, VolumeUrls> = doc
            .migration
            .volumes_urls
            .drain(..)
            .map(|v| (v.volume.clone(), v))
            .collect();

        for pending in std::mem::take(&mut doc.pending.urls) {
            let label = pending.label.unwrap_or_default();
            let classified = classify_url(&pending.url, &label, &self.proxy_prefix);
            let url = Url {
                value: classified.value,
                description: Some(label).filter(|l| !l.is_empty()),
            };
            let open_access = record_open_access || classified.open_access;
            match pending.volume {
                Some(token) => {
                    let entry = per_volume.entry(token.clone()).or_insert_with(|| VolumeUrls {
                        volume: token,
                        ..VolumeUrls::default()
                    });
                    dispatch_url(&mut entry.eitems, &mut entry.urls, classified.class, url, open_access);
                },
                None => dispatch_url(
                    &mut doc.migration.eitems,
                    &mut doc.urls,
                    classified.class,
                    url,
                    open_access,
                ),
            }
        }

        for pending in std::mem::take(&mut doc.pending.dois) {
            let item = EItem {
                url: Url {
                    value: self.doi_resolver_prefix.replace("{doi}", &pending.doi),
                    description: pending.label,
                },
                open_access: Some(record_open_access),
            };
            push_unique(&mut doc.migration.eitems.eitems_external, item);
        }

        doc.migration.volumes_urls = per_volume
            .into_values()
            .map(|mut v| {
                v.eitems.sync_flags();
                v
            })
            .collect();
        doc.migration.eitems.sync_flags();
    }
}

/// Merge volume contributions so each token appears once.
fn correlate_volumes(doc: &mut Document) -> std::result::Result<(), RuleError> {
    let mut merged: IndexMap<String, Volume> = IndexMap::new();
    for volume in doc.migration.volumes.drain(..) {
        match merged.get_mut(&volume.volume) {
            Some(existing) => merge_volume(existing, volume)?,
            None => {
                merged.insert(volume.volume.clone(), volume);
            },
        }
    }
    for ids in &doc.migration.volumes_identifiers {
        let contribution = Volume {
            physical_description: ids.physical_description.clone(),
            identifiers: ids.identifiers.clone(),
            ..Volume::new(ids.volume.clone())
        };
        let entry = merged
            .entry(ids.volume.clone())
            .or_insert_with(|| Volume::new(ids.volume.clone()));
        merge_volume(entry, contribution)?;
    }
    doc.migration.volumes = merged.into_values().collect();
    Ok(())
}

/// Turn pending `088` barcodes into items and volume barcodes.
fn attach_barcodes(doc: &mut Document) -> std::result::Result<(), RuleError> {
    for pending in std::mem::take(&mut doc.pending.barcodes) {
        let item = Item {
            volume: pending.volume.clone(),
            barcode: pending.barcode.clone(),
        };
        if !doc.migration.items.contains(&item) {
            doc.migration.items.push(item);
        }
        let Some(token) = pending.volume else {
            continue;
        };
        let contribution = Volume {
            barcode: Some(pending.barcode),
            ..Volume::new(token.clone())
        };
        match doc.migration.volumes.iter_mut().find(|v| v.volume == token) {
            Some(existing) => merge_volume(existing, contribution)?,
            None => doc.migration.volumes.push(contribution),
        }
    }
    Ok(())
}

fn upgrade_multipart(doc: &mut Document) {
    let titled = doc.migration.volumes.iter().any(|v| v.title.is_some());
    if doc.migration.is_multipart && titled {
        doc.mode_of_issuance = Some(ModeOfIssuance::MultipartMonograph);
        doc.migration.record_type = RecordType::Multipart;
    }
}

fn conference_title_fallback(doc: &mut Document) {
    if doc.title.is_some() {
        return;
    }
    let title = doc
        .conference_title()
        .map(str::to_string)
        .or_else(|| doc.migration.conference_title.clone());
    if let Some(title) = title {
        doc.title = Some(title);
    }
}

fn related(recid: String, relation_type: RelationType) -> Related {
    Related {
        related_recid: recid,
        relation_type,
        relation_description: None,
        sequence_order: None,
    }
}

/// Type every pending relation by its tag and `$x`.
fn type_relations(
    doc: &mut Document,
    handlers: &HandlerTable,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<()> {
    let mut from_775 = false;
    let mut from_787 = false;
    for pending in std::mem::take(&mut doc.pending.relations) {
        let tag: String = pending.tag.chars().take(3).collect();
        let Some(recid) = pending.recid else {
            handlers.handle(RuleError::missing("w").at(&pending.tag), diagnostics)?;
            continue;
        };
        let entry = match tag.as_str() {
            "775" | "787" => {
                let relation_type = match pending.relation.as_deref() {
                    None => Some(RelationType::Other),
                    Some(x) => RELATION_TYPES.lookup(x),
                };
                let Some(relation_type) = relation_type else {
                    let value = pending.relation.unwrap_or_default();
                    let err = RuleError::unexpected("x")
                        .with_message(format!("unknown relation type '{value}'"))
                        .at(&pending.tag);
                    handlers.handle(err, diagnostics)?;
                    continue;
                };
                let mut entry = related(recid, relation_type);
                if relation_type == RelationType::Other {
                    entry.relation_description = pending.description;
                }
                if tag == "775" {
                    from_775 = true;
                } else {
                    from_787 = true;
                }
                entry
            },
            "780" | "785" => {
                let mut entry = related(recid, RelationType::Sequence);
                entry.sequence_order = Some(if tag == "780" {
                    SequenceOrder::Previous
                } else {
                    SequenceOrder::Next
                });
                entry
            },
            "770" | "772" => {
                let mut entry = related(recid, RelationType::Other);
                entry.relation_description = pending.description;
                entry
            },
            _ => {
                let err = RuleError::unexpected_field()
                    .with_message(format!("no relation for tag {tag}"))
                    .at(&pending.tag);
                handlers.handle(err, diagnostics)?;
                continue;
            },
        };
        if !doc.migration.related.contains(&entry) {
            doc.migration.related.push(entry);
        }
    }
    doc.migration.has_related = !doc.migration.related.is_empty();
    if from_775 && from_787 {
        let recid = doc.provider_recid.as_deref().unwrap_or("?");
        warn!("record {recid}: 775 and 787 both produced relations");
        diagnostics.push(Diagnostic::new(
            RELATION_OVERLAP,
            "775 and 787 both produced related records; review their precedence",
        ));
    }
    Ok(())
}
