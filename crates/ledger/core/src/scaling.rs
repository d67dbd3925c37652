//! Scaled formula resolution.
//!
//! A consumption cost or spell level is a base formula plus a number of
//! scaling steps chosen at use time. With an explicit scaling formula, that
//! formula is multiplied by the step count (dice and flat terms alike) and
//! appended to the base; without one, the base formula itself grows by one die
//! per dice term and one point per flat term for every step.

use crate::dice::{DiceRoller, EvaluationMode, Formula, FormulaError, RollData, RolledValue};

/// Resolves formulas against fixed roll data, applying scaling steps.
#[derive(Clone, Copy, Debug)]
pub struct ScalingResolver<'a> {
    data: &'a RollData,
}

impl<'a> ScalingResolver<'a> {
    pub fn new(data: &'a RollData) -> Self {
        Self { data }
    }

    /// Build the scaled formula without evaluating it.
    pub fn scaled_formula(
        &self,
        base: &str,
        steps: u32,
        scaling: Option<&str>,
    ) -> Result<Formula, FormulaError> {
        let mut formula = Formula::parse(base, self.data)?;
        if steps == 0 {
            return Ok(formula);
        }

        match scaling.filter(|s| !s.trim().is_empty()) {
            Some(source) => {
                let mut addend = Formula::parse(source, self.data)?;
                addend.alter(steps, 0, true);
                formula.append_sum(addend);
            }
            None => formula.grow(steps),
        }
        Ok(formula)
    }

    /// Resolve `base` scaled by `steps` and evaluate it.
    ///
    /// Non-deterministic results are pushed onto `rolls` so they remain
    /// available for audit.
    pub fn resolve(
        &self,
        base: &str,
        steps: u32,
        scaling: Option<&str>,
        mode: EvaluationMode,
        roller: &mut dyn DiceRoller,
        rolls: Option<&mut Vec<RolledValue>>,
    ) -> Result<RolledValue, FormulaError> {
        let rolled = self
            .scaled_formula(base, steps, scaling)?
            .evaluate(mode, roller)?;
        if let Some(rolls) = rolls {
            if rolled.is_tracked_roll() {
                rolls.push(rolled.clone());
            }
        }
        Ok(rolled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;

    fn deterministic(base: &str, steps: u32, scaling: Option<&str>) -> i64 {
        let data = RollData::new().with("prof", 2);
        ScalingResolver::new(&data)
            .resolve(
                base,
                steps,
                scaling,
                EvaluationMode::Deterministic,
                &mut ScriptedDice::default(),
                None,
            )
            .unwrap()
            .total
    }

    #[test]
    fn zero_steps_evaluates_the_base_formula() {
        assert_eq!(deterministic("@prof + 1", 0, Some("5")), 3);
    }

    #[test]
    fn implicit_scaling_grows_dice_and_flat_terms() {
        let data = RollData::new();
        let formula = ScalingResolver::new(&data)
            .scaled_formula("2d6", 2, None)
            .unwrap();
        assert_eq!(formula.to_string(), "4d6");

        let formula = ScalingResolver::new(&data)
            .scaled_formula("1d8 + 1", 1, None)
            .unwrap();
        assert_eq!(formula.to_string(), "2d8 + 2");
    }

    #[test]
    fn explicit_scaling_formula_is_multiplied_and_appended() {
        assert_eq!(deterministic("1", 3, Some("1")), 4);

        let data = RollData::new();
        let formula = ScalingResolver::new(&data)
            .scaled_formula("1d6", 2, Some("1d4"))
            .unwrap();
        assert_eq!(formula.to_string(), "1d6 + 2d4");
    }

    #[test]
    fn stochastic_rolls_are_recorded() {
        let data = RollData::new();
        let mut rolls = Vec::new();
        let mut dice = ScriptedDice::new([2, 5, 6, 1]);
        let rolled = ScalingResolver::new(&data)
            .resolve(
                "2d6",
                2,
                None,
                EvaluationMode::Stochastic,
                &mut dice,
                Some(&mut rolls),
            )
            .unwrap();
        assert_eq!(rolled.total, 14);
        assert_eq!(rolls.len(), 1);
        assert_eq!(rolls[0].formula, "4d6");
    }

    #[test]
    fn flat_results_are_not_recorded() {
        let data = RollData::new();
        let mut rolls = Vec::new();
        ScalingResolver::new(&data)
            .resolve(
                "3",
                1,
                None,
                EvaluationMode::Stochastic,
                &mut ScriptedDice::default(),
                Some(&mut rolls),
            )
            .unwrap();
        assert!(rolls.is_empty());
    }
}
