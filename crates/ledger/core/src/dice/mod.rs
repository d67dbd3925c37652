//! Dice formulas: parsing, term alteration, and evaluation.
//!
//! A [`Formula`] keeps its parsed terms so that scaling can grow dice and flat
//! terms in place (`2d6 + 1` scaled by two steps becomes `4d6 + 3`) and then
//! re-emit the altered formula through `Display` without re-parsing.
//!
//! ## Grammar
//!
//! ```text
//! formula  := operand (operator operand)*
//! operand  := number | dice | "@" path | "(" formula ")" | "-" operand
//! dice     := number? "d" number
//! operator := "+" | "-" | "*" | "/"
//! ```
//!
//! `@` references are replaced with numbers from [`RollData`] while parsing, so
//! they behave like flat terms afterwards.

mod evaluate;
mod parse;
mod rng;

pub use evaluate::{DieResult, EvaluationMode, RolledValue};
pub use rng::{DiceRoller, PcgDice, PcgRng, RngOracle, ScriptedDice, compute_seed};

use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Roll Data
// ============================================================================

/// Numeric values formulas may reference with `@path` syntax.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollData {
    values: BTreeMap<String, i64>,
}

impl RollData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<i64> {
        self.values.get(path).copied()
    }

    pub fn insert(&mut self, path: impl Into<String>, value: i64) {
        self.values.insert(path.into(), value);
    }

    /// Builder variant of [`RollData::insert`].
    #[must_use]
    pub fn with(mut self, path: impl Into<String>, value: i64) -> Self {
        self.insert(path, value);
        self
    }

    /// Copy every entry of `other` under `prefix.`.
    pub fn extend_prefixed(&mut self, prefix: &str, other: &RollData) {
        for (path, value) in &other.values {
            self.values.insert(format!("{prefix}.{path}"), *value);
        }
    }
}

impl FromIterator<(String, i64)> for RollData {
    fn from_iter<I: IntoIterator<Item = (String, i64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while parsing or evaluating a formula.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,

    #[error("unexpected character '{found}' at position {position} in \"{formula}\"")]
    UnexpectedCharacter {
        formula: String,
        found: char,
        position: usize,
    },

    #[error("formula \"{0}\" ends unexpectedly")]
    UnexpectedEnd(String),

    #[error("unbalanced parentheses in \"{0}\"")]
    UnbalancedParenthesis(String),

    #[error("unknown reference @{0}")]
    UnknownReference(String),

    #[error("invalid die \"{0}\"")]
    InvalidDie(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("arithmetic overflow")]
    Overflow,
}

impl crate::error::LedgerError for FormulaError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        crate::error::ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "FORMULA_EMPTY",
            Self::UnexpectedCharacter { .. } => "FORMULA_UNEXPECTED_CHARACTER",
            Self::UnexpectedEnd(_) => "FORMULA_UNEXPECTED_END",
            Self::UnbalancedParenthesis(_) => "FORMULA_UNBALANCED_PARENTHESIS",
            Self::UnknownReference(_) => "FORMULA_UNKNOWN_REFERENCE",
            Self::InvalidDie(_) => "FORMULA_INVALID_DIE",
            Self::DivisionByZero => "FORMULA_DIVISION_BY_ZERO",
            Self::Overflow => "FORMULA_OVERFLOW",
        }
    }
}

// ============================================================================
// Terms
// ============================================================================

/// Arithmetic operator between two operands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
        }
    }

    const fn is_additive(self) -> bool {
        matches!(self, Self::Add | Self::Subtract)
    }
}

/// `NdF`: roll `number` dice with `faces` sides each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DieTerm {
    pub number: u32,
    pub faces: u32,
}

impl DieTerm {
    pub const fn new(number: u32, faces: u32) -> Self {
        Self { number, faces }
    }
}

/// One parsed formula term.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Term {
    Number(i64),
    Dice(DieTerm),
    Operator(Operator),
    /// Parenthesised sub-formula; alteration never reaches inside.
    Group(Formula),
}

// ============================================================================
// Formula
// ============================================================================

/// A parsed formula whose top-level terms can be altered before evaluation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Formula {
    terms: Vec<Term>,
}

impl Formula {
    /// Parse `source`, resolving `@` references against `data`.
    pub fn parse(source: &str, data: &RollData) -> Result<Self, FormulaError> {
        parse::parse(source, data)
    }

    /// A formula consisting of a single constant.
    pub fn constant(value: i64) -> Self {
        Self {
            terms: vec![Term::Number(value)],
        }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// True if evaluating this formula never consults a dice roller.
    pub fn is_deterministic(&self) -> bool {
        self.terms.iter().all(|term| match term {
            Term::Dice(die) => die.number == 0,
            Term::Group(inner) => inner.is_deterministic(),
            Term::Number(_) | Term::Operator(_) => true,
        })
    }

    /// Alter the top-level dice and flat terms.
    ///
    /// Every die term becomes `number * multiply + add`; when `multiply_numeric`
    /// is set, flat numbers are multiplied as well.
    pub fn alter(&mut self, multiply: u32, add: u32, multiply_numeric: bool) {
        for term in &mut self.terms {
            match term {
                Term::Dice(die) => {
                    die.number = die.number.saturating_mul(multiply).saturating_add(add);
                }
                Term::Number(n) if multiply_numeric => {
                    *n = n.saturating_mul(i64::from(multiply));
                }
                _ => {}
            }
        }
    }

    /// Grow each top-level die term by `steps` dice and each flat term by `steps`.
    pub fn grow(&mut self, steps: u32) {
        for term in &mut self.terms {
            match term {
                Term::Dice(die) => die.number = die.number.saturating_add(steps),
                Term::Number(n) => *n = n.saturating_add(i64::from(steps)),
                _ => {}
            }
        }
    }

    /// Append `other` as an additional addend.
    pub fn append_sum(&mut self, other: Formula) {
        if other.terms.is_empty() {
            return;
        }
        if self.terms.is_empty() {
            *self = other;
            return;
        }
        self.terms.push(Term::Operator(Operator::Add));
        match <[Term; 1]>::try_from(other.terms) {
            Ok([single]) => self.terms.push(single),
            Err(terms) => self.terms.push(Term::Group(Formula { terms })),
        }
    }

    /// Evaluate this formula.
    pub fn evaluate(
        &self,
        mode: EvaluationMode,
        roller: &mut dyn DiceRoller,
    ) -> Result<RolledValue, FormulaError> {
        evaluate::evaluate(self, mode, roller)
    }

    /// Total when evaluation needs no dice, otherwise `None`.
    pub fn deterministic_total(&self) -> Option<i64> {
        if !self.is_deterministic() {
            return None;
        }
        let mut roller = ScriptedDice::default();
        self.evaluate(EvaluationMode::Deterministic, &mut roller)
            .ok()
            .map(|rolled| rolled.total)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, term) in self.terms.iter().enumerate() {
            match term {
                Term::Operator(op) if index == 0 => write!(f, "{}", op.symbol())?,
                Term::Operator(op) => write!(f, " {} ", op.symbol())?,
                Term::Number(n) => write!(f, "{n}")?,
                Term::Dice(die) => write!(f, "{}d{}", die.number, die.faces)?,
                Term::Group(inner) => write!(f, "({inner})")?,
            }
        }
        Ok(())
    }
}
