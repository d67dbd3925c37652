//! Consumption failures.

use std::fmt;

use crate::dice::FormulaError;
use crate::error::{ErrorSeverity, LedgerError};

use super::ConsumptionType;

/// What kind of referenced resource is missing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MissingResource {
    Attribute,
    Item,
    HitDice,
    SpellSlot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConsumptionErrorKind {
    /// Referenced item, attribute, class, or slot pool does not exist.
    MissingResource(MissingResource),
    /// No target is configured at all.
    ResourceUnset,
    /// Nothing left but a positive cost was requested.
    NoneAvailable,
    /// Something left, but less than the cost.
    NotEnough,
}

impl fmt::Display for ConsumptionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingResource(MissingResource::Attribute) => f.write_str("missing attribute"),
            Self::MissingResource(MissingResource::Item) => f.write_str("missing item"),
            Self::MissingResource(MissingResource::HitDice) => f.write_str("missing hit dice"),
            Self::MissingResource(MissingResource::SpellSlot) => f.write_str("missing spell slot"),
            Self::ResourceUnset => f.write_str("resource unset"),
            Self::NoneAvailable => f.write_str("none available"),
            Self::NotEnough => f.write_str("not enough"),
        }
    }
}

/// A resource could not cover its cost.
///
/// Carries structured parameters only; notification sinks format the message.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("{consumption} `{target}`: {kind} (cost {cost}, available {available})")]
pub struct ConsumptionError {
    pub kind: ConsumptionErrorKind,
    pub consumption: ConsumptionType,
    pub target: String,
    pub cost: i64,
    pub available: i64,
}

impl ConsumptionError {
    pub fn new(
        kind: ConsumptionErrorKind,
        consumption: ConsumptionType,
        target: impl Into<String>,
        cost: i64,
        available: i64,
    ) -> Self {
        Self {
            kind,
            consumption,
            target: target.into(),
            cost,
            available,
        }
    }

    /// A positive cost against nothing is `NoneAvailable`; more than what is
    /// left is `NotEnough`.
    pub fn check(
        consumption: ConsumptionType,
        target: &str,
        cost: i64,
        available: i64,
    ) -> Result<(), Self> {
        let kind = if cost > 0 && available <= 0 {
            ConsumptionErrorKind::NoneAvailable
        } else if available < cost {
            ConsumptionErrorKind::NotEnough
        } else {
            return Ok(());
        };
        Err(Self::new(kind, consumption, target, cost, available))
    }
}

impl LedgerError for ConsumptionError {
    fn severity(&self) -> ErrorSeverity {
        match self.kind {
            ConsumptionErrorKind::NoneAvailable | ConsumptionErrorKind::NotEnough => {
                ErrorSeverity::Recoverable
            }
            ConsumptionErrorKind::MissingResource(_) | ConsumptionErrorKind::ResourceUnset => {
                ErrorSeverity::Validation
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self.kind {
            ConsumptionErrorKind::MissingResource(MissingResource::Attribute) => {
                "CONSUMPTION_MISSING_ATTRIBUTE"
            }
            ConsumptionErrorKind::MissingResource(MissingResource::Item) => {
                "CONSUMPTION_MISSING_ITEM"
            }
            ConsumptionErrorKind::MissingResource(MissingResource::HitDice) => {
                "CONSUMPTION_MISSING_HIT_DICE"
            }
            ConsumptionErrorKind::MissingResource(MissingResource::SpellSlot) => {
                "CONSUMPTION_MISSING_SPELL_SLOT"
            }
            ConsumptionErrorKind::ResourceUnset => "CONSUMPTION_RESOURCE_UNSET",
            ConsumptionErrorKind::NoneAvailable => "CONSUMPTION_NONE_AVAILABLE",
            ConsumptionErrorKind::NotEnough => "CONSUMPTION_NOT_ENOUGH",
        }
    }
}

/// Failure while resolving one target.
///
/// Only the `Consumption` arm is downgraded to a warning during a dry run.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Consumption(#[from] ConsumptionError),

    #[error(transparent)]
    Formula(#[from] FormulaError),
}

impl LedgerError for ResolveError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Consumption(err) => err.severity(),
            Self::Formula(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Consumption(err) => err.error_code(),
            Self::Formula(err) => err.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_distinguishes_none_from_not_enough() {
        let none = ConsumptionError::check(ConsumptionType::Material, "arrows", 1, 0).unwrap_err();
        assert_eq!(none.kind, ConsumptionErrorKind::NoneAvailable);

        let short = ConsumptionError::check(ConsumptionType::Material, "arrows", 3, 2).unwrap_err();
        assert_eq!(short.kind, ConsumptionErrorKind::NotEnough);
        assert_eq!(short.available, 2);

        assert!(ConsumptionError::check(ConsumptionType::Material, "arrows", 2, 2).is_ok());
        assert!(ConsumptionError::check(ConsumptionType::Material, "arrows", 0, 0).is_ok());
        assert!(ConsumptionError::check(ConsumptionType::Material, "arrows", -2, 0).is_ok());
    }

    #[test]
    fn severity_follows_kind() {
        let err = ConsumptionError::new(
            ConsumptionErrorKind::MissingResource(MissingResource::Item),
            ConsumptionType::ItemUses,
            "wand",
            1,
            0,
        );
        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert_eq!(err.error_code(), "CONSUMPTION_MISSING_ITEM");
        assert_eq!(err.to_string(), "itemUses `wand`: missing item (cost 1, available 0)");
    }
}
