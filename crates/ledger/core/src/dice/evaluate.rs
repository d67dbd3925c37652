//! Two-pass precedence evaluation of parsed formulas.

use super::{DiceRoller, DieTerm, Formula, FormulaError, Operator, Term};

/// How dice terms are resolved while evaluating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EvaluationMode {
    /// Every die counts as its minimum face; no roller is consulted.
    ///
    /// Used when validating costs and slot levels.
    #[default]
    Deterministic,
    /// Dice are rolled through the supplied [`DiceRoller`].
    Stochastic,
}

/// Faces rolled for one dice term.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DieResult {
    pub faces: u32,
    pub results: Vec<u32>,
}

impl DieResult {
    pub fn total(&self) -> u64 {
        self.results.iter().map(|&r| u64::from(r)).sum()
    }
}

/// Outcome of evaluating a formula.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RolledValue {
    /// The formula as evaluated, after any alteration.
    pub formula: String,
    pub total: i64,
    /// Individual dice, in formula order. Empty for deterministic evaluation.
    pub dice: Vec<DieResult>,
    /// True if the formula contained no dice.
    pub is_deterministic: bool,
}

impl RolledValue {
    /// True if dice were actually rolled and the result should be kept for audit.
    pub fn is_tracked_roll(&self) -> bool {
        !self.is_deterministic && !self.dice.is_empty()
    }
}

pub(super) fn evaluate(
    formula: &Formula,
    mode: EvaluationMode,
    roller: &mut dyn DiceRoller,
) -> Result<RolledValue, FormulaError> {
    let mut dice = Vec::new();
    let total = Evaluator {
        mode,
        roller,
        dice: &mut dice,
    }
    .total(formula)?;

    Ok(RolledValue {
        formula: formula.to_string(),
        total,
        dice,
        is_deterministic: formula.is_deterministic(),
    })
}

struct Evaluator<'a> {
    mode: EvaluationMode,
    roller: &'a mut dyn DiceRoller,
    dice: &'a mut Vec<DieResult>,
}

impl Evaluator<'_> {
    fn total(&mut self, formula: &Formula) -> Result<i64, FormulaError> {
        let mut terms = formula.terms().iter();

        // A leading operator applies to an implicit zero.
        let (mut sign, mut product) = match terms.next() {
            None => return Ok(0),
            Some(Term::Operator(op)) => (Operator::Add, self.leading(*op, &mut terms, formula)?),
            Some(term) => (Operator::Add, self.operand(term, formula)?),
        };
        let mut sum = 0i64;

        while let Some(term) = terms.next() {
            let Term::Operator(op) = term else {
                return Err(FormulaError::UnexpectedEnd(formula.to_string()));
            };
            let value = match terms.next() {
                Some(next) => self.operand(next, formula)?,
                None => return Err(FormulaError::UnexpectedEnd(formula.to_string())),
            };
            match op {
                Operator::Multiply => {
                    product = product.checked_mul(value).ok_or(FormulaError::Overflow)?;
                }
                Operator::Divide => product = floor_div(product, value)?,
                Operator::Add | Operator::Subtract => {
                    sum = accumulate(sum, sign, product)?;
                    sign = *op;
                    product = value;
                }
            }
        }

        accumulate(sum, sign, product)
    }

    fn leading<'t>(
        &mut self,
        op: Operator,
        terms: &mut impl Iterator<Item = &'t Term>,
        formula: &Formula,
    ) -> Result<i64, FormulaError> {
        let value = match terms.next() {
            Some(term) => self.operand(term, formula)?,
            None => return Err(FormulaError::UnexpectedEnd(formula.to_string())),
        };
        match op {
            Operator::Add => Ok(value),
            Operator::Subtract => value.checked_neg().ok_or(FormulaError::Overflow),
            Operator::Multiply => Ok(0),
            Operator::Divide => floor_div(0, value),
        }
    }

    fn operand(&mut self, term: &Term, formula: &Formula) -> Result<i64, FormulaError> {
        match term {
            Term::Number(n) => Ok(*n),
            Term::Dice(die) => self.roll(*die),
            Term::Group(inner) => self.total(inner),
            Term::Operator(_) => Err(FormulaError::UnexpectedEnd(formula.to_string())),
        }
    }

    fn roll(&mut self, die: DieTerm) -> Result<i64, FormulaError> {
        match self.mode {
            EvaluationMode::Deterministic => Ok(i64::from(die.number)),
            EvaluationMode::Stochastic => {
                let results: Vec<u32> = (0..die.number)
                    .map(|_| self.roller.roll_die(die.faces).clamp(1, die.faces))
                    .collect();
                let rolled = DieResult {
                    faces: die.faces,
                    results,
                };
                let total = i64::try_from(rolled.total()).map_err(|_| FormulaError::Overflow)?;
                self.dice.push(rolled);
                Ok(total)
            }
        }
    }
}

fn accumulate(sum: i64, sign: Operator, value: i64) -> Result<i64, FormulaError> {
    let next = if sign == Operator::Subtract {
        sum.checked_sub(value)
    } else {
        sum.checked_add(value)
    };
    next.ok_or(FormulaError::Overflow)
}

fn floor_div(lhs: i64, rhs: i64) -> Result<i64, FormulaError> {
    if rhs == 0 {
        return Err(FormulaError::DivisionByZero);
    }
    let quotient = lhs.checked_div(rhs).ok_or(FormulaError::Overflow)?;
    if lhs % rhs != 0 && ((lhs < 0) != (rhs < 0)) {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}
