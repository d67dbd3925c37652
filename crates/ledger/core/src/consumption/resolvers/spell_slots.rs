use crate::consumption::{
    ConsumptionContext, ConsumptionError, ConsumptionTarget, ConsumptionType, MissingResource,
    ResolveError, UsageUpdates,
};
use crate::state::SpellSlots;
use crate::usage::UsageConfiguration;

use super::{missing, unset};

pub(in crate::consumption) fn consume(
    target: &ConsumptionTarget,
    config: &UsageConfiguration,
    ctx: &mut ConsumptionContext<'_>,
    updates: &mut UsageUpdates,
) -> Result<(), ResolveError> {
    if target.target.trim().is_empty() {
        return Err(unset(ConsumptionType::SpellSlots).into());
    }
    let level = ctx.rules.clamp_spell_level(target.resolve_level(config, ctx)?);
    let key = SpellSlots::level_key(level);
    let path = slot_value_path(&key);
    let cost = target.resolve_cost(config, ctx, &mut updates.rolls)?.total;

    let Some(pool) = ctx.actor.spells.get(&key).filter(|pool| pool.max > 0) else {
        return Err(missing(MissingResource::SpellSlot, ConsumptionType::SpellSlots, &key, cost).into());
    };
    let value = updates.actor.get(&path).unwrap_or(i64::from(pool.value));
    ConsumptionError::check(ConsumptionType::SpellSlots, &key, cost, value)?;

    updates.actor.set(path, (value - cost).max(0));
    Ok(())
}

/// Actor attribute path of a slot pool's remaining count.
fn slot_value_path(key: &str) -> String {
    format!("spells.{key}.value")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::consumption::{ConsumptionErrorKind, ScalingMode};
    use crate::dice::{EvaluationMode, ScriptedDice};
    use crate::state::{ActivityState, ActorKind, ActorState, ItemKind, ItemState, SlotPool};

    fn actor() -> ActorState {
        let mut actor = ActorState::new("a", "A", ActorKind::Character);
        actor.spells.insert("spell1", SlotPool::new(1, 2, 4));
        actor.spells.insert("spell2", SlotPool::new(2, 1, 3));
        actor.spells.insert("spell3", SlotPool::new(3, 0, 2));
        actor
    }

    fn run(
        actor: &ActorState,
        target: &ConsumptionTarget,
        config: &UsageConfiguration,
        updates: &mut UsageUpdates,
    ) -> Result<(), ResolveError> {
        let rules = RulesConfig::default();
        let item = ItemState::new("wand", "Wand", ItemKind::Equipment);
        let activity = ActivityState::new("cast", "Cast");
        let mut dice = ScriptedDice::default();
        let mut ctx = ConsumptionContext::new(
            &rules,
            actor,
            &item,
            &activity,
            EvaluationMode::Stochastic,
            &mut dice,
        );
        target.consume(config, &mut ctx, updates)
    }

    #[test]
    fn debits_the_resolved_level() {
        let target = ConsumptionTarget::new(ConsumptionType::SpellSlots, "1", "1");
        let mut updates = UsageUpdates::new();
        run(&actor(), &target, &UsageConfiguration::default(), &mut updates).unwrap();
        assert_eq!(updates.actor.get("spells.spell1.value"), Some(1));
    }

    #[test]
    fn level_scaling_moves_to_a_higher_pool() {
        let target = ConsumptionTarget::new(ConsumptionType::SpellSlots, "1", "1")
            .scaled(ScalingMode::Level, None);
        let config = UsageConfiguration {
            scaling: Some(1),
            ..UsageConfiguration::default()
        };
        let mut updates = UsageUpdates::new();
        run(&actor(), &target, &config, &mut updates).unwrap();
        assert_eq!(updates.actor.get("spells.spell2.value"), Some(0));
        assert_eq!(updates.actor.get("spells.spell1.value"), None);
    }

    #[test]
    fn empty_level_fails_without_touching_the_pool() {
        let target = ConsumptionTarget::new(ConsumptionType::SpellSlots, "3", "1");
        let mut updates = UsageUpdates::new();
        let err = run(&actor(), &target, &UsageConfiguration::default(), &mut updates).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Consumption(ConsumptionError {
                kind: ConsumptionErrorKind::NoneAvailable,
                cost: 1,
                available: 0,
                ..
            })
        ));
        assert!(updates.is_empty());
    }

    #[test]
    fn pool_without_maximum_is_missing() {
        let target = ConsumptionTarget::new(ConsumptionType::SpellSlots, "5", "1");
        let err = run(&actor(), &target, &UsageConfiguration::default(), &mut UsageUpdates::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Consumption(ConsumptionError {
                kind: ConsumptionErrorKind::MissingResource(MissingResource::SpellSlot),
                ..
            })
        ));
    }
}
