use crate::consumption::{
    ConsumptionContext, ConsumptionError, ConsumptionTarget, ConsumptionType, MissingResource,
    ResolveError, UsageUpdates,
};
use crate::state::{ItemState, UsesData, to_count};
use crate::usage::UsageConfiguration;

use super::material::pending_quantity;
use super::missing;

/// Limited uses of an item, the acting one when the target is blank.
///
/// Exhausting the uses of an auto-destroying item spends one unit of quantity
/// and resets the counter; the last unit deletes the item instead.
pub(in crate::consumption) fn item_uses(
    target: &ConsumptionTarget,
    config: &UsageConfiguration,
    ctx: &mut ConsumptionContext<'_>,
    updates: &mut UsageUpdates,
) -> Result<(), ResolveError> {
    let Some(item) = ctx.target_item(&target.target) else {
        return Err(missing(MissingResource::Item, target.kind, &target.target, 0).into());
    };
    let cost = target.resolve_cost(config, ctx, &mut updates.rolls)?.total;
    let uses = item.uses.clone().unwrap_or_default();
    let deleted = updates.is_deleted(&item.id);
    let spent = if deleted {
        uses.max
    } else {
        pending_uses_spent(item, updates)
    };
    let spent = spend(target, &uses, spent, cost)?;
    // Nothing to write the counter to.
    if deleted || item.uses.is_none() {
        return Err(missing(MissingResource::Item, target.kind, &target.target, cost).into());
    }

    if uses.auto_destroy && spent == uses.max {
        let quantity = pending_quantity(item, updates).saturating_sub(1);
        if quantity == 0 {
            updates.delete_item(item.id.clone());
            return Ok(());
        }
        let patch = updates.item_patch_mut(&item.id);
        patch.uses_spent = Some(0);
        patch.quantity = Some(quantity);
    } else {
        updates.item_patch_mut(&item.id).uses_spent = Some(spent);
    }
    Ok(())
}

/// Limited uses of the acting activity.
pub(in crate::consumption) fn activity_uses(
    target: &ConsumptionTarget,
    config: &UsageConfiguration,
    ctx: &mut ConsumptionContext<'_>,
    updates: &mut UsageUpdates,
) -> Result<(), ResolveError> {
    let cost = target.resolve_cost(config, ctx, &mut updates.rolls)?.total;
    let uses = ctx.activity.uses.clone().unwrap_or_default();
    let spent = updates.activity_uses_spent.unwrap_or(uses.spent);
    let spent = spend(target, &uses, spent, cost)?;
    if ctx.activity.uses.is_some() {
        updates.activity_uses_spent = Some(spent);
    }
    Ok(())
}

/// Check `cost` against the remaining uses and return the new spent counter.
fn spend(
    target: &ConsumptionTarget,
    uses: &UsesData,
    spent: u32,
    cost: i64,
) -> Result<u32, ConsumptionError> {
    let available = i64::from(uses.max.saturating_sub(spent));
    ConsumptionError::check(target.kind, &target.target, cost, available)?;
    Ok(to_count(i64::from(spent) + cost))
}

pub(in crate::consumption) fn pending_uses_spent(item: &ItemState, updates: &UsageUpdates) -> u32 {
    updates
        .item_patch(&item.id)
        .and_then(|patch| patch.uses_spent)
        .or_else(|| item.uses.as_ref().map(|uses| uses.spent))
        .unwrap_or(0)
}

/// Uses data a uses target reads from, for display.
pub(in crate::consumption) fn target_uses(
    kind: ConsumptionType,
    ctx: &ConsumptionContext<'_>,
    target: &str,
) -> Option<UsesData> {
    match kind {
        ConsumptionType::ActivityUses => ctx.activity.uses.clone(),
        ConsumptionType::ItemUses => ctx.target_item(target)?.uses.clone(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::consumption::ConsumptionErrorKind;
    use crate::dice::{EvaluationMode, ScriptedDice};
    use crate::state::{ActivityState, ActorKind, ActorState, ItemId, ItemKind, UsesRecovery};

    fn run(
        actor: &ActorState,
        item: &ItemId,
        activity: &ActivityState,
        target: &ConsumptionTarget,
        updates: &mut UsageUpdates,
    ) -> Result<(), ResolveError> {
        let rules = RulesConfig::default();
        let mut dice = ScriptedDice::default();
        let item = actor.item(item).unwrap();
        let mut ctx = ConsumptionContext::new(
            &rules,
            actor,
            item,
            activity,
            EvaluationMode::Stochastic,
            &mut dice,
        );
        target.consume(&UsageConfiguration::default(), &mut ctx, updates)
    }

    #[test]
    fn last_daily_use_leaves_nothing_remaining() {
        let wand = ItemState::new("wand", "Wand", ItemKind::Equipment)
            .with_uses(UsesData::new(2, 3).with_recovery(UsesRecovery::all("day")));
        let actor = ActorState::new("a", "A", ActorKind::Character).with_item(wand);
        let target = ConsumptionTarget::new(ConsumptionType::ItemUses, "", "1");
        let mut updates = UsageUpdates::new();
        run(
            &actor,
            &ItemId::new("wand"),
            &ActivityState::new("zap", "Zap"),
            &target,
            &mut updates,
        )
        .unwrap();

        let mut after = actor.clone();
        for patch in &updates.items {
            after.apply_item_patch(patch).unwrap();
        }
        let uses = after.item(&ItemId::new("wand")).and_then(|i| i.uses.clone());
        assert_eq!(uses.map(|u| u.value()), Some(0));
        assert!(updates.delete.is_empty());
    }

    #[test]
    fn exhausted_auto_destroy_stack_loses_one_unit() {
        let potions = ItemState::new("potion", "Potion", ItemKind::Consumable)
            .with_quantity(3)
            .with_uses(UsesData::new(0, 1).auto_destroy());
        let actor = ActorState::new("a", "A", ActorKind::Character).with_item(potions);
        let id = ItemId::new("potion");
        let target = ConsumptionTarget::new(ConsumptionType::ItemUses, "", "1");
        let mut updates = UsageUpdates::new();
        run(&actor, &id, &ActivityState::new("drink", "Drink"), &target, &mut updates).unwrap();

        let patch = updates.item_patch(&id).unwrap();
        assert_eq!(patch.uses_spent, Some(0));
        assert_eq!(patch.quantity, Some(2));
    }

    #[test]
    fn exhausted_last_unit_is_deleted() {
        let potion = ItemState::new("potion", "Potion", ItemKind::Consumable)
            .with_uses(UsesData::new(0, 1).auto_destroy());
        let actor = ActorState::new("a", "A", ActorKind::Character).with_item(potion);
        let id = ItemId::new("potion");
        let target = ConsumptionTarget::new(ConsumptionType::ItemUses, "", "1");
        let mut updates = UsageUpdates::new();
        run(&actor, &id, &ActivityState::new("drink", "Drink"), &target, &mut updates).unwrap();

        assert!(updates.is_deleted(&id));
        assert!(updates.item_patch(&id).is_none());
    }

    #[test]
    fn activity_uses_accumulate_and_run_out() {
        let actor = ActorState::new("a", "A", ActorKind::Character)
            .with_item(ItemState::new("cloak", "Cloak", ItemKind::Equipment));
        let activity = ActivityState::new("blink", "Blink").with_uses(UsesData::new(1, 2));
        let target = ConsumptionTarget::new(ConsumptionType::ActivityUses, "", "1");
        let id = ItemId::new("cloak");
        let mut updates = UsageUpdates::new();

        run(&actor, &id, &activity, &target, &mut updates).unwrap();
        assert_eq!(updates.activity_uses_spent, Some(2));

        let err = run(&actor, &id, &activity, &target, &mut updates).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Consumption(ConsumptionError {
                kind: ConsumptionErrorKind::NoneAvailable,
                available: 0,
                ..
            })
        ));
        assert_eq!(updates.activity_uses_spent, Some(2));
    }

    #[test]
    fn items_without_uses_are_never_patched() {
        let rope = ItemState::new("rope", "Rope", ItemKind::Loot);
        let actor = ActorState::new("a", "A", ActorKind::Character).with_item(rope);
        let id = ItemId::new("rope");
        let activity = ActivityState::new("climb", "Climb");

        for cost in ["1", "0", "-2"] {
            let target = ConsumptionTarget::new(ConsumptionType::ItemUses, "", cost);
            let mut updates = UsageUpdates::new();
            let err = run(&actor, &id, &activity, &target, &mut updates).unwrap_err();
            assert!(matches!(err, ResolveError::Consumption(_)), "cost {cost}");
            assert!(updates.item_patch(&id).is_none(), "cost {cost}");
        }
    }

    #[test]
    fn deleted_item_has_no_uses_left() {
        let potion = ItemState::new("potion", "Potion", ItemKind::Consumable)
            .with_uses(UsesData::new(0, 1).auto_destroy());
        let actor = ActorState::new("a", "A", ActorKind::Character).with_item(potion);
        let id = ItemId::new("potion");
        let activity = ActivityState::new("drink", "Drink");
        let target = ConsumptionTarget::new(ConsumptionType::ItemUses, "", "1");
        let mut updates = UsageUpdates::new();
        run(&actor, &id, &activity, &target, &mut updates).unwrap();
        assert!(updates.is_deleted(&id));

        let err = run(&actor, &id, &activity, &target, &mut updates).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Consumption(ConsumptionError {
                kind: ConsumptionErrorKind::NoneAvailable,
                available: 0,
                ..
            })
        ));

        let material = ConsumptionTarget::new(ConsumptionType::Material, "potion", "1");
        assert!(run(&actor, &id, &activity, &material, &mut updates).is_err());
        assert_eq!(updates.delete, vec![id.clone()]);
        assert!(updates.item_patch(&id).is_none());
    }

    #[test]
    fn activity_without_uses_only_accepts_free_uses() {
        let actor = ActorState::new("a", "A", ActorKind::Character)
            .with_item(ItemState::new("cloak", "Cloak", ItemKind::Equipment));
        let activity = ActivityState::new("blink", "Blink");
        let id = ItemId::new("cloak");
        let mut updates = UsageUpdates::new();

        let refund = ConsumptionTarget::new(ConsumptionType::ActivityUses, "", "-1");
        run(&actor, &id, &activity, &refund, &mut updates).unwrap();
        assert_eq!(updates.activity_uses_spent, None);

        let cost = ConsumptionTarget::new(ConsumptionType::ActivityUses, "", "1");
        assert!(run(&actor, &id, &activity, &cost, &mut updates).is_err());
    }

    #[test]
    fn negative_cost_recovers_uses() {
        let wand = ItemState::new("wand", "Wand", ItemKind::Equipment).with_uses(UsesData::new(2, 3));
        let actor = ActorState::new("a", "A", ActorKind::Character).with_item(wand);
        let target = ConsumptionTarget::new(ConsumptionType::ItemUses, "wand", "-5");
        let mut updates = UsageUpdates::new();
        run(
            &actor,
            &ItemId::new("wand"),
            &ActivityState::new("zap", "Zap"),
            &target,
            &mut updates,
        )
        .unwrap();
        assert_eq!(
            updates.item_patch(&ItemId::new("wand")).and_then(|p| p.uses_spent),
            Some(0)
        );
    }
}
