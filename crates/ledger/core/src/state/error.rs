//! Errors raised while applying patches to in-memory state.

use crate::error::{ErrorSeverity, LedgerError};

use super::{ActivityId, ItemId};

/// A patch referenced something the state model does not have.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PatchError {
    #[error("actor has no attribute at `{0}`")]
    UnknownAttribute(String),

    #[error("actor has no spell slot pool `{0}`")]
    UnknownSpellSlot(String),

    #[error("actor owns no item `{0}`")]
    UnknownItem(ItemId),

    #[error("item `{item}` has no activity `{activity}`")]
    UnknownActivity { item: ItemId, activity: ActivityId },

    /// The patch touched a field the item does not carry (e.g. hit dice on a non-class item).
    #[error("item `{item}` has no {field} data")]
    MissingField { item: ItemId, field: &'static str },

    #[error("`{path}` cannot hold negative value {value}")]
    NegativeValue { path: String, value: i64 },
}

impl LedgerError for PatchError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownItem(_) => ErrorSeverity::Validation,
            _ => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownAttribute(_) => "PATCH_UNKNOWN_ATTRIBUTE",
            Self::UnknownSpellSlot(_) => "PATCH_UNKNOWN_SPELL_SLOT",
            Self::UnknownItem(_) => "PATCH_UNKNOWN_ITEM",
            Self::UnknownActivity { .. } => "PATCH_UNKNOWN_ACTIVITY",
            Self::MissingField { .. } => "PATCH_MISSING_FIELD",
            Self::NegativeValue { .. } => "PATCH_NEGATIVE_VALUE",
        }
    }
}
