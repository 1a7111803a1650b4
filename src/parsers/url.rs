//! URL classification into electronic access channels.

use serde::{Deserialize, Serialize};

/// Prefix of O'Reilly learning platform book pages.
pub const SAFARI_PREFIX: &str = "https://learning.oreilly.com/library/view/";

const EXTERNAL_LABELS: &[&str] = &["ebook", "e-book", "e-proceedings"];

/// Access channel an URL belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlClass {
    /// Publisher platform behind the catalogue's EBL login.
    Ebl,
    /// Link through the institutional proxy.
    Proxy,
    /// O'Reilly learning platform.
    Safari,
    /// File attached to the catalogue record.
    LocalFile,
    /// Publisher-hosted electronic item.
    External,
    /// Anything else: a plain related link.
    Plain,
}

/// Classification result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedUrl {
    /// Channel.
    pub class: UrlClass,
    /// URL to store, with the proxy prefix removed for proxy links.
    pub value: String,
    /// Label mentions open access.
    pub open_access: bool,
}

/// Split an URL into lowercase host and path.
fn host_and_path(url: &str) -> (String, &str) {
    let rest = url.split_once("://").map_or(url, |(_, r)| r);
    let (host, path) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, ""),
    };
    (host.to_lowercase(), path)
}

/// Whether a label flags the link as open access.
#[must_use]
pub fn is_open_access(label: &str) -> bool {
    label.to_lowercase().contains("open access")
}

/// Whether a label designates a publisher-hosted electronic item. Labels
/// match exactly, case included.
#[must_use]
pub fn is_external_label(label: &str) -> bool {
    EXTERNAL_LABELS.contains(&label)
}

/// Classify an URL and its label into exactly one channel.
///
/// Rules are tried in order: EBL, proxy, Safari, local file, external,
/// plain.
#[must_use]
pub fn classify_url(url: &str, label: &str, proxy_prefix: &str) -> ClassifiedUrl {
    let url = url.trim();
    let (host, path) = host_and_path(url);
    let open_access = is_open_access(label);

    let (class, value) = if host.contains("cds") && path.contains("/auth.py") {
        (UrlClass::Ebl, url.to_string())
    } else if host.contains("ezproxy") {
        let stripped = url.strip_prefix(proxy_prefix).map_or_else(
            || {
                url.split_once("url=")
                    .map_or(url, |(_, target)| target)
                    .to_string()
            },
            str::to_string,
        );
        (UrlClass::Proxy, stripped)
    } else if url.starts_with(SAFARI_PREFIX) {
        (UrlClass::Safari, url.to_string())
    } else if host.contains("cds") && path.starts_with("/record/") && path.contains("/files") {
        (UrlClass::LocalFile, url.to_string())
    } else if is_external_label(label) {
        (UrlClass::External, url.to_string())
    } else {
        (UrlClass::Plain, url.to_string())
    };

    ClassifiedUrl {
        class,
        value,
        open_access,
    }
}
