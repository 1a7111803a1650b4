//! MARC record leader inspection.
//!
//! The leader is a 24-byte fixed-length string at the start of every record.
//! Ingestion only needs a handful of positions:
//!
//! - Position 5: Record status (`d` = deleted)
//! - Position 6: Type of record (`a` = language material, `i`/`j` = sound
//!   recording, `g` = projected medium, ...)
//! - Position 7: Bibliographic level (`m` = monograph, `s` = serial, ...)
//!
//! MARCXML exports are frequently sloppy about the leader (short, padded,
//! placeholder characters), so [`Leader`] keeps the raw string and reads
//! positions defensively instead of rejecting the record.

use serde::{Deserialize, Serialize};

/// Supported import media, derived from leader bytes 6-7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaType {
    /// `am`: language material, monograph.
    EBook,
    /// `im` or `jm`: sound recording.
    Audiobook,
    /// `gm`: projected medium.
    Video,
}

impl MediaType {
    /// Name used in the eitem block of the output document.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::EBook => "e-book",
            MediaType::Audiobook => "audiobook",
            MediaType::Video => "video",
        }
    }
}

/// MARC leader as found in the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leader(String);

impl Leader {
    /// Wrap a leader string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Leader(raw.into())
    }

    /// Raw leader text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the record carried a leader at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    fn byte(&self, position: usize) -> Option<char> {
        self.0.as_bytes().get(position).map(|b| char::from(*b))
    }

    /// Record status (position 5).
    #[must_use]
    pub fn record_status(&self) -> Option<char> {
        self.byte(5)
    }

    /// Type of record (position 6).
    #[must_use]
    pub fn record_type(&self) -> Option<char> {
        self.byte(6)
    }

    /// Bibliographic level (position 7).
    #[must_use]
    pub fn bibliographic_level(&self) -> Option<char> {
        self.byte(7)
    }

    /// True when the record status marks the record as deleted.
    ///
    /// Leaders shorter than six bytes are treated as deleted when they
    /// contain a `d` anywhere, which is how truncated provider exports
    /// flag deletions.
    #[must_use]
    pub fn is_deletable(&self) -> bool {
        match self.record_status() {
            Some(status) => status == 'd',
            None => self.0.contains('d'),
        }
    }

    /// Medium described by bytes 6-7, if it is one we can import.
    #[must_use]
    pub fn media_type(&self) -> Option<MediaType> {
        match (self.record_type(), self.bibliographic_level()) {
            (Some('a'), Some('m')) => Some(MediaType::EBook),
            (Some('i' | 'j'), Some('m')) => Some(MediaType::Audiobook),
            (Some('g'), Some('m')) => Some(MediaType::Video),
            _ => None,
        }
    }
}

impl std::fmt::Display for Leader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
