use crate::config::RulesConfig;
use crate::consumption::{
    ConsumptionContext, ConsumptionError, ConsumptionErrorKind, ConsumptionType, ResolveError,
    UsageUpdates,
};
use crate::dice::{DiceRoller, EvaluationMode, ScriptedDice};
use crate::state::{ActivityState, ActorState, ItemState};

use super::{UsageConfiguration, consumed_slot, requires_spell_slot};

/// Where a dry-run warning came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WarningSource {
    /// A consumption target, by index into the activity's target list.
    Target { index: usize, kind: ConsumptionType },
    /// The activity's own spell slot.
    SpellSlot,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConsumptionWarning {
    pub source: WarningSource,
    pub error: ConsumptionError,
}

/// Outcome of a dry run: the would-be changes and every consumption failure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DryRun {
    pub updates: UsageUpdates,
    pub warnings: Vec<ConsumptionWarning>,
}

impl DryRun {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Turns a usage configuration into an update batch.
#[derive(Clone, Copy, Debug)]
pub struct UsagePlanner<'a> {
    rules: &'a RulesConfig,
}

impl<'a> UsagePlanner<'a> {
    pub fn new(rules: &'a RulesConfig) -> Self {
        Self { rules }
    }

    /// Resolve every active target deterministically, collecting consumption
    /// failures as warnings. Formula errors still propagate.
    pub fn dry_run(
        &self,
        actor: &ActorState,
        item: &ItemState,
        activity: &ActivityState,
        config: &UsageConfiguration,
    ) -> Result<DryRun, ResolveError> {
        let mut warnings = Vec::new();
        let mut dice = ScriptedDice::default();
        let updates = self.plan(
            actor,
            item,
            activity,
            config,
            EvaluationMode::Deterministic,
            &mut dice,
            |source, error| {
                warnings.push(ConsumptionWarning { source, error });
                Ok(())
            },
        )?;
        Ok(DryRun { updates, warnings })
    }

    /// Resolve every active target with real rolls. The first failure aborts.
    pub fn compute_updates(
        &self,
        actor: &ActorState,
        item: &ItemState,
        activity: &ActivityState,
        config: &UsageConfiguration,
        roller: &mut dyn DiceRoller,
    ) -> Result<UsageUpdates, ResolveError> {
        self.plan(
            actor,
            item,
            activity,
            config,
            EvaluationMode::Stochastic,
            roller,
            |_, error| Err(error),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn plan(
        &self,
        actor: &ActorState,
        item: &ItemState,
        activity: &ActivityState,
        config: &UsageConfiguration,
        mode: EvaluationMode,
        roller: &mut dyn DiceRoller,
        mut on_error: impl FnMut(WarningSource, ConsumptionError) -> Result<(), ConsumptionError>,
    ) -> Result<UsageUpdates, ResolveError> {
        let mut updates = UsageUpdates::new();
        let mut ctx = ConsumptionContext::new(self.rules, actor, item, activity, mode, roller);

        let targets = &activity.consumption.targets;
        for index in config.consume.resources.indices(targets.len()) {
            let target = &targets[index];
            match target.consume(config, &mut ctx, &mut updates) {
                Ok(()) => {}
                Err(ResolveError::Consumption(error)) => on_error(
                    WarningSource::Target {
                        index,
                        kind: target.kind,
                    },
                    error,
                )?,
                Err(error) => return Err(error),
            }
        }

        if config.consume.spell_slot && requires_spell_slot(self.rules, actor, item) {
            if let Err(error) = self.consume_spell_slot(config, actor, item, &mut updates) {
                on_error(WarningSource::SpellSlot, error)?;
            }
        }

        updates.fold_activity(&item.id, &activity.id);
        Ok(updates)
    }

    /// One slot from the configured pool. Unknown pools are ignored.
    fn consume_spell_slot(
        &self,
        config: &UsageConfiguration,
        actor: &ActorState,
        item: &ItemState,
        updates: &mut UsageUpdates,
    ) -> Result<(), ConsumptionError> {
        let Some(slot) = consumed_slot(config, item) else {
            return Ok(());
        };
        let Some(pool) = actor.spells.get(&slot) else {
            return Ok(());
        };
        let path = format!("spells.{slot}.value");
        let value = updates.actor.get(&path).unwrap_or(i64::from(pool.value));
        if value <= 0 {
            return Err(ConsumptionError::new(
                ConsumptionErrorKind::NoneAvailable,
                ConsumptionType::SpellSlots,
                slot,
                1,
                0,
            ));
        }
        updates.actor.set(path, value - 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumption::{ConsumptionTarget, MissingResource, UsageWrite};
    use crate::state::{
        ActivityId, ActorKind, ItemId, ItemKind, PreparationMode, SlotPool, SpellData, UsesData,
    };
    use crate::usage::{ResourceSelection, UsageRequest, prepare_usage_config};

    fn actor() -> ActorState {
        let mut actor = ActorState::new("a", "A", ActorKind::Character)
            .with_attribute("resources.ki.value", 1)
            .with_item(ItemState::new("arrows", "Arrows", ItemKind::Consumable).with_quantity(3));
        actor.spells.insert("spell2", SlotPool::new(2, 1, 3));
        actor.spells.insert("spell3", SlotPool::new(3, 0, 2));
        actor
    }

    fn staff() -> ItemState {
        ItemState::new("staff", "Staff", ItemKind::Weapon)
            .with_uses(UsesData::new(0, 5))
            .with_activity(
                ActivityState::new("strike", "Strike")
                    .with_uses(UsesData::new(0, 2))
                    .with_target(ConsumptionTarget::new(ConsumptionType::ActivityUses, "", "1"))
                    .with_target(ConsumptionTarget::new(ConsumptionType::Attribute, "resources.ki.value", "2"))
                    .with_target(ConsumptionTarget::new(ConsumptionType::Ammo, "arrows", "1")),
            )
    }

    fn config_for(actor: &ActorState, item: &ItemState) -> UsageConfiguration {
        let rules = RulesConfig::default();
        prepare_usage_config(&rules, actor, item, &item.activities[0], &UsageRequest::new()).unwrap()
    }

    #[test]
    fn dry_run_collects_every_failure() {
        let rules = RulesConfig::default();
        let actor = actor();
        let item = staff();
        let config = config_for(&actor, &item);

        let dry = UsagePlanner::new(&rules)
            .dry_run(&actor, &item, &item.activities[0], &config)
            .unwrap();
        assert_eq!(dry.warnings.len(), 1);
        assert_eq!(
            dry.warnings[0].source,
            WarningSource::Target {
                index: 1,
                kind: ConsumptionType::Attribute
            }
        );
        assert_eq!(dry.warnings[0].error.kind, ConsumptionErrorKind::NotEnough);

        // Activity uses are folded into the acting item's patch.
        let patch = dry.updates.item_patch(&item.id).unwrap();
        assert_eq!(
            patch.activity_uses_spent.get(&ActivityId::from("strike")),
            Some(&1)
        );
        assert_eq!(
            dry.updates.item_patch(&ItemId::new("arrows")).and_then(|p| p.quantity),
            Some(2)
        );
    }

    #[test]
    fn commit_stops_at_first_failure() {
        let rules = RulesConfig::default();
        let actor = actor();
        let item = staff();
        let config = config_for(&actor, &item);

        let err = UsagePlanner::new(&rules)
            .compute_updates(
                &actor,
                &item,
                &item.activities[0],
                &config,
                &mut ScriptedDice::default(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Consumption(ConsumptionError {
                kind: ConsumptionErrorKind::NotEnough,
                consumption: ConsumptionType::Attribute,
                ..
            })
        ));
    }

    #[test]
    fn commit_with_selected_targets_produces_write_plan() {
        let rules = RulesConfig::default();
        let actor = actor();
        let item = staff();
        let mut config = config_for(&actor, &item);
        config.consume.resources = ResourceSelection::Only(vec![0, 2]);

        let updates = UsagePlanner::new(&rules)
            .compute_updates(
                &actor,
                &item,
                &item.activities[0],
                &config,
                &mut ScriptedDice::default(),
            )
            .unwrap();
        let plan = updates.write_plan(&item.id);
        assert!(matches!(&plan[0], UsageWrite::ActingItem(p) if p.id == item.id));
        assert!(matches!(&plan[1], UsageWrite::OtherItems(ps) if ps[0].quantity == Some(2)));
    }

    #[test]
    fn spell_slot_consumption_uses_the_configured_pool() {
        let rules = RulesConfig::default();
        let actor = actor();
        let spell = ItemState::new("web", "Web", ItemKind::Spell)
            .with_spell(SpellData::new(2, PreparationMode::Prepared))
            .with_activity(ActivityState::new("cast", "Cast"));
        let activity = &spell.activities[0];

        let config = config_for(&actor, &spell);
        let updates = UsagePlanner::new(&rules)
            .compute_updates(&actor, &spell, activity, &config, &mut ScriptedDice::default())
            .unwrap();
        assert_eq!(updates.actor.get("spells.spell2.value"), Some(0));

        let mut upcast = config.clone();
        upcast.spell_slot = Some("spell3".to_string());
        let dry = UsagePlanner::new(&rules)
            .dry_run(&actor, &spell, activity, &upcast)
            .unwrap();
        assert_eq!(dry.warnings.len(), 1);
        assert_eq!(dry.warnings[0].source, WarningSource::SpellSlot);
        assert_eq!(dry.warnings[0].error.kind, ConsumptionErrorKind::NoneAvailable);
        assert!(dry.updates.actor.is_empty());

        let mut unknown = config;
        unknown.spell_slot = Some("spell7".to_string());
        let updates = UsagePlanner::new(&rules)
            .compute_updates(&actor, &spell, activity, &unknown, &mut ScriptedDice::default())
            .unwrap();
        assert!(updates.is_empty());
    }

    #[test]
    fn formula_errors_propagate_from_dry_runs() {
        let rules = RulesConfig::default();
        let actor = actor();
        let item = ItemState::new("rod", "Rod", ItemKind::Equipment).with_activity(
            ActivityState::new("zap", "Zap")
                .with_target(ConsumptionTarget::new(ConsumptionType::Attribute, "resources.ki.value", "1 +"))
                .with_target(ConsumptionTarget::new(ConsumptionType::Material, "chalk", "1")),
        );
        let config = config_for(&actor, &item);
        let err = UsagePlanner::new(&rules)
            .dry_run(&actor, &item, &item.activities[0], &config)
            .unwrap_err();
        assert!(matches!(err, ResolveError::Formula(_)));

        let item = ItemState::new("rod", "Rod", ItemKind::Equipment).with_activity(
            ActivityState::new("zap", "Zap")
                .with_target(ConsumptionTarget::new(ConsumptionType::Material, "chalk", "1")),
        );
        let config = config_for(&actor, &item);
        let dry = UsagePlanner::new(&rules)
            .dry_run(&actor, &item, &item.activities[0], &config)
            .unwrap();
        assert_eq!(
            dry.warnings[0].error.kind,
            ConsumptionErrorKind::MissingResource(MissingResource::Item)
        );
    }
}
