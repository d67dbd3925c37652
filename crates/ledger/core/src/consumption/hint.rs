//! Display data for configuration prompts.

use crate::dice::{EvaluationMode, FormulaError, ScriptedDice};
use crate::usage::UsageConfiguration;

use super::{ConsumptionContext, ConsumptionTarget};

/// What one target will consume, shown before the use is confirmed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConsumptionHint {
    /// Unsigned cost: the total when deterministic, otherwise the formula.
    pub cost: String,
    /// Signed cost with dice at their minimum.
    pub simplified_cost: i64,
    /// Negative cost: the resource is recovered rather than spent.
    pub increase: bool,
    pub available: i64,
    /// The cost exceeds what is available.
    pub warn: bool,
    /// Spending the cost exhausts an auto-destroying item.
    pub will_destroy: bool,
}

impl ConsumptionHint {
    /// Resolve the displayed cost of `target` without rolling.
    pub(super) fn for_cost(
        target: &ConsumptionTarget,
        config: &UsageConfiguration,
        ctx: &ConsumptionContext<'_>,
    ) -> Result<Self, FormulaError> {
        let formula = target.cost_formula(config, ctx.roll_data())?;
        let simplified_cost = formula
            .evaluate(EvaluationMode::Deterministic, &mut ScriptedDice::default())?
            .total;
        let cost = match formula.deterministic_total() {
            Some(total) => total.to_string(),
            None => formula.to_string(),
        };
        let (cost, increase) = match cost.strip_prefix('-') {
            Some(rest) => (rest.to_string(), true),
            None => (cost, false),
        };
        Ok(Self {
            cost,
            simplified_cost,
            increase,
            ..Self::default()
        })
    }

    /// Fill in availability and derive the warning flag.
    #[must_use]
    pub(super) fn with_available(mut self, available: i64) -> Self {
        self.available = available;
        self.warn = self.simplified_cost > available;
        self
    }

    #[must_use]
    pub(super) fn destroys_when(mut self, auto_destroy: bool) -> Self {
        self.will_destroy = auto_destroy
            && !self.warn
            && self.simplified_cost > 0
            && self.available == self.simplified_cost;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::consumption::{ConsumptionType, ScalingMode};
    use crate::state::{ActivityState, ActorKind, ActorState, ItemKind, ItemState, UsesData};

    fn hint(target: &ConsumptionTarget, scaling: Option<u32>) -> ConsumptionHint {
        let rules = RulesConfig::default();
        let actor = ActorState::new("a", "A", ActorKind::Character)
            .with_attribute("resources.ki.value", 3);
        let item = ItemState::new("staff", "Staff", ItemKind::Weapon).with_uses(
            UsesData::new(5, 6).auto_destroy(),
        );
        let activity = ActivityState::new("act", "Act");
        let mut dice = ScriptedDice::default();
        let ctx = ConsumptionContext::new(
            &rules,
            &actor,
            &item,
            &activity,
            EvaluationMode::Deterministic,
            &mut dice,
        );
        let config = UsageConfiguration {
            scaling,
            ..UsageConfiguration::default()
        };
        target.hint(&config, &ctx).unwrap()
    }

    #[test]
    fn deterministic_cost_is_simplified() {
        let target = ConsumptionTarget::new(ConsumptionType::Attribute, "resources.ki.value", "1 + 1")
            .scaled(ScalingMode::Amount, Some("1"));
        let hint = hint(&target, Some(2));
        assert_eq!(hint.cost, "4");
        assert_eq!(hint.simplified_cost, 4);
        assert_eq!(hint.available, 3);
        assert!(hint.warn);
        assert!(!hint.increase);
    }

    #[test]
    fn dice_cost_shows_formula_and_direction() {
        let target = ConsumptionTarget::new(ConsumptionType::Attribute, "resources.ki.value", "-1d4");
        let hint = hint(&target, None);
        assert_eq!(hint.cost, "1d4");
        assert_eq!(hint.simplified_cost, -1);
        assert!(hint.increase);
        assert!(!hint.warn);
    }

    #[test]
    fn last_use_of_auto_destroy_item_is_flagged() {
        let target = ConsumptionTarget::new(ConsumptionType::ItemUses, "", "1");
        let hint = hint(&target, None);
        assert_eq!(hint.available, 1);
        assert!(hint.will_destroy);
    }
}
