//! Resource consumption: what a use debits and how each resource type is resolved.
//!
//! A [`ConsumptionTarget`] names one resource. Resolution is dispatched by
//! [`ConsumptionType`] through [`ConsumptionRegistry`], a closed `match` over the
//! resolver modules, and every resolver either records its delta in a
//! [`UsageUpdates`] batch or fails with a [`ConsumptionError`] before touching it.

mod context;
mod error;
mod hint;
mod recharge;
mod registry;
mod resolvers;
mod target;
mod updates;

pub use context::ConsumptionContext;
pub use error::{ConsumptionError, ConsumptionErrorKind, MissingResource, ResolveError};
pub use hint::ConsumptionHint;
pub use recharge::{RechargeOutcome, roll_recharge};
pub use registry::{ConsumptionRegistry, TargetOption};
pub use target::{ConsumptionTarget, TargetScaling};
pub use updates::{UsageUpdates, UsageWrite};

pub use crate::state::{ActorPatch, ItemPatch};

/// Kind of resource a consumption target debits.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[strum(serialize_all = "camelCase")]
pub enum ConsumptionType {
    /// Numeric value at an actor attribute path.
    Attribute,
    /// Quantity of an ammunition item.
    Ammo,
    /// Quantity of a material or consumable item.
    Material,
    /// Hit dice from the actor's classes.
    HitDice,
    /// Limited uses of an item.
    ItemUses,
    /// Limited uses of the activity itself.
    #[default]
    ActivityUses,
    /// Spell slots at a level.
    SpellSlots,
}

/// How the scaling step count of a use affects a target.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[strum(serialize_all = "lowercase")]
pub enum ScalingMode {
    #[default]
    None,
    /// Scale the amount consumed.
    Amount,
    /// Scale the spell slot level consumed.
    Level,
}
