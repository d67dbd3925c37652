//! Recharge rolls for items whose uses come back on a die result.

use crate::config::RulesConfig;
use crate::dice::{DiceRoller, EvaluationMode, Formula, FormulaError, RollData, RolledValue};
use crate::state::{ItemPatch, ItemState};

/// Result of one recharge roll.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RechargeOutcome {
    pub roll: RolledValue,
    pub charged: bool,
    /// Present when the item recharged: `recharge.charged` set and uses restored.
    pub patch: Option<ItemPatch>,
}

/// Roll recharge for `item`.
///
/// Returns `None` without rolling when the item has no recharge threshold or
/// is already charged.
pub fn roll_recharge(
    item: &ItemState,
    rules: &RulesConfig,
    roller: &mut dyn DiceRoller,
) -> Result<Option<RechargeOutcome>, FormulaError> {
    let Some(recharge) = item.recharge.filter(|r| r.value > 0 && !r.charged) else {
        return Ok(None);
    };

    let formula = Formula::parse(&format!("1d{}", rules.recharge_die), &RollData::new())?;
    let roll = formula.evaluate(EvaluationMode::Stochastic, roller)?;
    let charged = roll.total >= i64::from(recharge.value);

    let patch = charged.then(|| {
        let mut patch = ItemPatch::new(item.id.clone());
        patch.recharge_charged = Some(true);
        if item.uses.is_some() {
            patch.uses_spent = Some(0);
        }
        patch
    });
    Ok(Some(RechargeOutcome {
        roll,
        charged,
        patch,
    }))
}
