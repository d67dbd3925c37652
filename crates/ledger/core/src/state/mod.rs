//! Entity state the engine reads from and writes patches against.
//!
//! Actors own their items (embedded documents), items own their activities.
//! The engine never mutates these directly during a use: resolvers read the
//! state and record changes in a [`crate::consumption::UsageUpdates`] batch, and
//! callers apply that batch with [`ActorState::apply_changes`] /
//! [`ItemState::apply_patch`] or through a repository.

mod activity;
mod actor;
mod error;
mod item;
mod patch;
mod spells;

pub use activity::{ActivityId, ActivityState, ConsumptionSettings, ScalingSettings, TemplateSettings};
pub use actor::{ActorId, ActorKind, ActorState, CurrencyBag};
pub use error::PatchError;
pub use item::{ClassData, ItemId, ItemKind, ItemState, RechargeData, UsesData, UsesRecovery};
pub(crate) use item::remaining_after;
pub use patch::{ActorPatch, ItemPatch};
pub use spells::{PreparationMode, SlotPool, SpellData, SpellScroll, SpellSlots};

/// Clamp a signed counter into the unsigned range stored on entities.
pub(crate) fn to_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
