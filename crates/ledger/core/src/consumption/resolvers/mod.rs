//! Per-type consumption resolvers.
//!
//! Every resolver reads current values through pending `updates` first, so two
//! targets touching the same resource in one use stack instead of overwriting
//! each other.

pub(super) mod attribute;
pub(super) mod hit_dice;
pub(super) mod material;
pub(super) mod spell_slots;
pub(super) mod uses;

use super::{ConsumptionError, ConsumptionErrorKind, ConsumptionType, MissingResource};

pub(super) fn missing(
    resource: MissingResource,
    consumption: ConsumptionType,
    target: &str,
    cost: i64,
) -> ConsumptionError {
    ConsumptionError::new(
        ConsumptionErrorKind::MissingResource(resource),
        consumption,
        target,
        cost,
        0,
    )
}

pub(super) fn unset(consumption: ConsumptionType) -> ConsumptionError {
    ConsumptionError::new(ConsumptionErrorKind::ResourceUnset, consumption, "", 0, 0)
}
