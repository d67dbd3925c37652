use crate::consumption::{
    ConsumptionContext, ConsumptionError, ConsumptionTarget, MissingResource, ResolveError,
    UsageUpdates,
};
use crate::state::{ItemState, remaining_after};
use crate::usage::UsageConfiguration;

use super::missing;

/// Ammunition and material components: spend item quantity.
pub(in crate::consumption) fn consume(
    target: &ConsumptionTarget,
    config: &UsageConfiguration,
    ctx: &mut ConsumptionContext<'_>,
    updates: &mut UsageUpdates,
) -> Result<(), ResolveError> {
    let Some(item) = ctx.target_item(&target.target) else {
        return Err(missing(MissingResource::Item, target.kind, &target.target, 0).into());
    };
    let cost = target.resolve_cost(config, ctx, &mut updates.rolls)?.total;

    let quantity = pending_quantity(item, updates);
    ConsumptionError::check(target.kind, &target.target, cost, i64::from(quantity))?;
    if updates.is_deleted(&item.id) {
        return Err(missing(MissingResource::Item, target.kind, &target.target, cost).into());
    }

    let remaining = remaining_after(quantity, cost);
    if remaining == 0 && item.auto_destroys() {
        updates.delete_item(item.id.clone());
    } else {
        updates.item_patch_mut(&item.id).quantity = Some(remaining);
    }
    Ok(())
}

/// Quantity left after pending changes; zero once the item is queued for deletion.
pub(in crate::consumption) fn pending_quantity(item: &ItemState, updates: &UsageUpdates) -> u32 {
    if updates.is_deleted(&item.id) {
        return 0;
    }
    updates
        .item_patch(&item.id)
        .and_then(|patch| patch.quantity)
        .unwrap_or(item.quantity)
}
