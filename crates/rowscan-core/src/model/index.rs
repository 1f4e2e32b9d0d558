use crate::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// IndexName
///
/// Closed set of secondary indexes a record store maintains. Every sortable
/// column maps to exactly one of these.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IndexName {
    Name,
    Email,
    Phone,
    Score,
    LastActivityAt,
}

impl IndexName {
    pub const ALL: [Self; 5] = [
        Self::Name,
        Self::Email,
        Self::Phone,
        Self::Score,
        Self::LastActivityAt,
    ];

    /// Record field the index is built over.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Score => "score",
            Self::LastActivityAt => "lastActivityAt",
        }
    }

    /// Unique indexes reject a second record with the same key value.
    #[must_use]
    pub const fn is_unique(self) -> bool {
        matches!(self, Self::Email)
    }

    /// Resolve a field name (case-insensitive, `_` and `-` ignored).
    #[must_use]
    pub fn parse(field: &str) -> Option<Self> {
        let folded: String = field
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        match folded.as_str() {
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "phone" => Some(Self::Phone),
            "score" => Some(Self::Score),
            "lastactivityat" | "lastactivity" | "activity" => Some(Self::LastActivityAt),
            _ => None,
        }
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

///
/// IndexValue
///
/// Key component stored in a secondary index. Values of one index are all of
/// the same variant, so the derived ordering is the index order.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum IndexValue {
    Text(String),
    Uint(u64),
}

impl From<&str> for IndexValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<u8> for IndexValue {
    fn from(value: u8) -> Self {
        Self::Uint(u64::from(value))
    }
}

impl From<Timestamp> for IndexValue {
    fn from(value: Timestamp) -> Self {
        Self::Uint(value.as_millis())
    }
}
