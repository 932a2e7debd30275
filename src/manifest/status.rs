//! Document status lattice
//!
//! Statuses are totally ordered by rank and merges may only move a
//! document's status upward, so an `indexed` document is never
//! downgraded by a later `duplicate` observation of the same hash.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Indexing status of a document in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DocStatus {
    /// Status missing or written by a newer version of the ledger format
    #[default]
    Unknown,
    /// Downloaded but not yet written to the search engine
    NotIndexed,
    /// Extraction produced no text; known but unsearchable
    NoText,
    /// Identical content already present in the search engine
    Duplicate,
    /// Written to the search engine
    Indexed,
}

impl DocStatus {
    /// Lattice rank; merges keep the higher-ranked status
    pub fn rank(&self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::NotIndexed => 10,
            Self::NoText => 20,
            Self::Duplicate => 30,
            Self::Indexed => 40,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::NotIndexed => "not_indexed",
            Self::NoText => "no_text",
            Self::Duplicate => "duplicate",
            Self::Indexed => "indexed",
        }
    }

    /// Parses a ledger status string; unrecognized values map to
    /// `Unknown` so older code can read ledgers written by newer code
    pub fn parse(s: &str) -> Self {
        match s {
            "not_indexed" => Self::NotIndexed,
            "no_text" => Self::NoText,
            "duplicate" => Self::Duplicate,
            "indexed" => Self::Indexed,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for DocStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DocStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DocStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_is_strictly_increasing_along_the_lattice() {
        let order = [
            DocStatus::Unknown,
            DocStatus::NotIndexed,
            DocStatus::NoText,
            DocStatus::Duplicate,
            DocStatus::Indexed,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
        }
    }

    #[test]
    fn string_roundtrip() {
        for status in [
            DocStatus::Unknown,
            DocStatus::NotIndexed,
            DocStatus::NoText,
            DocStatus::Duplicate,
            DocStatus::Indexed,
        ] {
            assert_eq!(DocStatus::parse(status.as_str()), status);
        }
    }

    #[test]
    fn unrecognized_status_maps_to_unknown() {
        assert_eq!(DocStatus::parse("archived"), DocStatus::Unknown);
        assert_eq!(DocStatus::parse(""), DocStatus::Unknown);
    }

    #[test]
    fn serde_uses_ledger_strings() {
        let json = serde_json::to_string(&DocStatus::NotIndexed).unwrap();
        assert_eq!(json, "\"not_indexed\"");

        let parsed: DocStatus = serde_json::from_str("\"no_such_status\"").unwrap();
        assert_eq!(parsed, DocStatus::Unknown);
    }
}
