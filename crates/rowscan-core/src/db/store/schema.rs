use crate::model::IndexName;

///
/// SchemaStep
///
/// Indexes introduced at one schema version. Upgrading from version `v`
/// applies every step with `v < step.version <= requested`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SchemaStep {
    pub version: u32,
    pub indexes: &'static [IndexName],
}

pub const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        indexes: &[IndexName::Name, IndexName::Email, IndexName::Phone],
    },
    SchemaStep {
        version: 2,
        indexes: &[IndexName::Score, IndexName::LastActivityAt],
    },
];

/// Latest schema version this build knows how to create.
pub const SCHEMA_VERSION: u32 = 2;

/// Steps needed to move a store from `current` to `requested`.
pub(crate) fn pending_steps(current: u32, requested: u32) -> impl Iterator<Item = &'static SchemaStep> {
    SCHEMA_STEPS
        .iter()
        .filter(move |step| step.version > current && step.version <= requested)
}
