//! Notification sinks for consumption failures.
//!
//! The engine reports failures as structured [`ConsumptionError`]s; sinks turn
//! them into whatever the host shows to a user.
use async_trait::async_trait;
use ledger_core::{
    ActorState, ConsumptionError, ConsumptionErrorKind, ConsumptionType, ConsumptionWarning,
    ItemState, LedgerError, MissingResource, WarningSource,
};
use tracing::warn;

/// Receives consumption failures for display.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// A commit pass failed; the use was aborted.
    async fn consumption_failed(
        &self,
        actor: &ActorState,
        item: &ItemState,
        error: &ConsumptionError,
    );

    /// A dry run found a problem the invoker may still resolve.
    async fn consumption_warning(
        &self,
        _actor: &ActorState,
        _item: &ItemState,
        _warning: &ConsumptionWarning,
    ) {
    }
}

/// Default sink: logs every failure at `warn` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl NotificationSink for TracingNotifier {
    async fn consumption_failed(
        &self,
        actor: &ActorState,
        item: &ItemState,
        error: &ConsumptionError,
    ) {
        warn!(
            target: "runtime::notify",
            actor = %actor.id,
            item = %item.id,
            code = error.error_code(),
            "{}",
            describe(error, item)
        );
    }

    async fn consumption_warning(
        &self,
        actor: &ActorState,
        item: &ItemState,
        warning: &ConsumptionWarning,
    ) {
        let source = match warning.source {
            WarningSource::Target { index, .. } => format!("target {index}"),
            WarningSource::SpellSlot => "spell slot".to_string(),
        };
        warn!(
            target: "runtime::notify",
            actor = %actor.id,
            item = %item.id,
            source = %source,
            code = warning.error.error_code(),
            "{}",
            describe(&warning.error, item)
        );
    }
}

/// Human-readable message for a consumption failure on `item`.
pub fn describe(error: &ConsumptionError, item: &ItemState) -> String {
    let resource = resource_label(error, item);
    match error.kind {
        ConsumptionErrorKind::MissingResource(MissingResource::Item) => {
            format!("{} needs {}, which is not in the inventory", item.name, resource)
        }
        ConsumptionErrorKind::MissingResource(_) => {
            format!("{} has no {} to draw from", item.name, resource)
        }
        ConsumptionErrorKind::ResourceUnset => {
            format!("{} consumes {} but no target is set", item.name, resource)
        }
        ConsumptionErrorKind::NoneAvailable => {
            format!("{} cannot be used: no {} remaining", item.name, resource)
        }
        ConsumptionErrorKind::NotEnough => format!(
            "{} needs {} {} but only {} remain",
            item.name, error.cost, resource, error.available
        ),
    }
}

fn resource_label(error: &ConsumptionError, item: &ItemState) -> String {
    let target = error.target.as_str();
    match error.consumption {
        ConsumptionType::ActivityUses => "uses".to_string(),
        ConsumptionType::ItemUses if target.is_empty() || target == item.id.as_str() => {
            "uses".to_string()
        }
        ConsumptionType::ItemUses => format!("uses of {target}"),
        ConsumptionType::Ammo | ConsumptionType::Material => target.to_string(),
        ConsumptionType::HitDice => format!("{target} hit dice"),
        ConsumptionType::SpellSlots => format!("{target} spell slots"),
        ConsumptionType::Attribute => target.to_string(),
    }
}
