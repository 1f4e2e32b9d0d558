use crate::{
    model::{IndexName, IndexValue},
    types::{RecordId, Timestamp},
};
use serde::{Deserialize, Serialize};

///
/// Record
///
/// One customer row. `id` is immutable and unique; `email` is unique across
/// the store (enforced by its index).
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub score: u8,
    pub last_activity_at: Timestamp,
    pub added_by: String,
    #[serde(default)]
    pub avatar: String,
}

impl Record {
    /// Case-insensitive substring match over name, email and phone.
    ///
    /// `needle` must already be normalized (trimmed, lower-cased); an empty
    /// needle matches every record.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }

        [&self.name, &self.email, &self.phone]
            .into_iter()
            .any(|field| contains_folded(field, needle))
    }

    /// Key this record contributes to `index`.
    #[must_use]
    pub fn index_value(&self, index: IndexName) -> IndexValue {
        match index {
            IndexName::Name => IndexValue::from(self.name.as_str()),
            IndexName::Email => IndexValue::from(self.email.as_str()),
            IndexName::Phone => IndexValue::from(self.phone.as_str()),
            IndexName::Score => IndexValue::from(self.score),
            IndexName::LastActivityAt => IndexValue::from(self.last_activity_at),
        }
    }
}

// Avoid allocating for the common all-ascii haystack.
pub(crate) fn contains_folded(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    if haystack.is_ascii() {
        let needle = needle.as_bytes();
        if needle.len() > haystack.len() {
            return false;
        }

        return haystack
            .as_bytes()
            .windows(needle.len())
            .any(|window| window.eq_ignore_ascii_case(needle));
    }

    haystack.to_lowercase().contains(needle)
}
