//! Read-only view resolvers consume against.

use crate::config::RulesConfig;
use crate::dice::{DiceRoller, EvaluationMode, FormulaError, RollData, RolledValue};
use crate::scaling::ScalingResolver;
use crate::state::{ActivityState, ActorState, ItemId, ItemState};

/// Everything a resolver reads while consuming: the rules catalogue, the
/// acting actor, item, and activity, plus the dice used for costs.
pub struct ConsumptionContext<'a> {
    pub rules: &'a RulesConfig,
    pub actor: &'a ActorState,
    pub item: &'a ItemState,
    pub activity: &'a ActivityState,
    /// Dry runs resolve deterministically; commits roll.
    pub mode: EvaluationMode,
    roll_data: RollData,
    roller: &'a mut dyn DiceRoller,
}

impl<'a> ConsumptionContext<'a> {
    pub fn new(
        rules: &'a RulesConfig,
        actor: &'a ActorState,
        item: &'a ItemState,
        activity: &'a ActivityState,
        mode: EvaluationMode,
        roller: &'a mut dyn DiceRoller,
    ) -> Self {
        Self {
            rules,
            actor,
            item,
            activity,
            mode,
            roll_data: Self::build_roll_data(actor, item, activity),
            roller,
        }
    }

    /// Actor roll data plus `item.*` and `activity.*` entries.
    fn build_roll_data(actor: &ActorState, item: &ItemState, activity: &ActivityState) -> RollData {
        let mut data = actor.roll_data();
        data.insert("item.quantity", i64::from(item.quantity));
        data.insert("item.level", i64::from(item.spell_level()));
        if let Some(uses) = &item.uses {
            data.insert("item.uses.value", i64::from(uses.value()));
            data.insert("item.uses.max", i64::from(uses.max));
        }
        if let Some(uses) = &activity.uses {
            data.insert("activity.uses.value", i64::from(uses.value()));
            data.insert("activity.uses.max", i64::from(uses.max));
        }
        data
    }

    pub fn roll_data(&self) -> &RollData {
        &self.roll_data
    }

    /// Item a target string refers to: blank means the acting item.
    pub fn target_item(&self, target: &str) -> Option<&'a ItemState> {
        let target = target.trim();
        if target.is_empty() {
            Some(self.item)
        } else {
            self.actor.item(&ItemId::new(target))
        }
    }

    /// Resolve a scaled formula in this context's evaluation mode.
    pub(crate) fn resolve(
        &mut self,
        base: &str,
        steps: u32,
        scaling: Option<&str>,
        rolls: &mut Vec<RolledValue>,
    ) -> Result<RolledValue, FormulaError> {
        ScalingResolver::new(&self.roll_data).resolve(
            base,
            steps,
            scaling,
            self.mode,
            &mut *self.roller,
            Some(rolls),
        )
    }
}
