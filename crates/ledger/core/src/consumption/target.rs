//! Consumption targets and cost resolution.

use crate::dice::{EvaluationMode, Formula, FormulaError, RollData, RolledValue, ScriptedDice};
use crate::scaling::ScalingResolver;
use crate::usage::UsageConfiguration;

use super::{
    ConsumptionContext, ConsumptionHint, ConsumptionRegistry, ConsumptionType, ResolveError,
    ScalingMode, UsageUpdates,
};
use crate::config::PeriodKind;

/// Scaling behaviour of one target.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TargetScaling {
    pub mode: ScalingMode,
    /// Per-step formula; without it the base formula itself grows.
    pub formula: Option<String>,
}

/// One resource debited when an activity is used.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConsumptionTarget {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: ConsumptionType,
    /// Type-dependent reference: attribute path, item id (blank for the acting
    /// item), hit die (`d8`, `smallest`, `largest`), or spell level formula.
    pub target: String,
    /// Cost formula; negative results recover the resource.
    pub value: String,
    pub scaling: TargetScaling,
}

impl Default for ConsumptionTarget {
    fn default() -> Self {
        Self {
            kind: ConsumptionType::ActivityUses,
            target: String::new(),
            value: "1".to_string(),
            scaling: TargetScaling::default(),
        }
    }
}

impl ConsumptionTarget {
    pub fn new(kind: ConsumptionType, target: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            value: value.into(),
            scaling: TargetScaling::default(),
        }
    }

    #[must_use]
    pub fn scaled(mut self, mode: ScalingMode, formula: Option<&str>) -> Self {
        self.scaling = TargetScaling {
            mode,
            formula: formula.map(str::to_string),
        };
        self
    }

    fn steps_for(&self, mode: ScalingMode, config: &UsageConfiguration) -> u32 {
        if self.scaling.mode == mode {
            config.scaling.unwrap_or(0)
        } else {
            0
        }
    }

    fn scaling_formula(&self) -> Option<&str> {
        self.scaling.formula.as_deref()
    }

    /// Resolve the amount to consume, recording non-deterministic rolls.
    pub fn resolve_cost(
        &self,
        config: &UsageConfiguration,
        ctx: &mut ConsumptionContext<'_>,
        rolls: &mut Vec<RolledValue>,
    ) -> Result<RolledValue, FormulaError> {
        let steps = self.steps_for(ScalingMode::Amount, config);
        ctx.resolve(&self.value, steps, self.scaling_formula(), rolls)
    }

    /// Scaled cost formula, unevaluated.
    pub fn cost_formula(
        &self,
        config: &UsageConfiguration,
        data: &RollData,
    ) -> Result<Formula, FormulaError> {
        let steps = self.steps_for(ScalingMode::Amount, config);
        ScalingResolver::new(data).scaled_formula(&self.value, steps, self.scaling_formula())
    }

    /// Resolve the spell level to consume. Always deterministic.
    pub fn resolve_level(
        &self,
        config: &UsageConfiguration,
        ctx: &ConsumptionContext<'_>,
    ) -> Result<i64, FormulaError> {
        let steps = self.steps_for(ScalingMode::Level, config);
        ScalingResolver::new(ctx.roll_data())
            .resolve(
                &self.target,
                steps,
                self.scaling_formula(),
                EvaluationMode::Deterministic,
                &mut ScriptedDice::default(),
                None,
            )
            .map(|rolled| rolled.total)
    }

    /// Validate availability and record this target's delta in `updates`.
    pub fn consume(
        &self,
        config: &UsageConfiguration,
        ctx: &mut ConsumptionContext<'_>,
        updates: &mut UsageUpdates,
    ) -> Result<(), ResolveError> {
        ConsumptionRegistry::consume(self, config, ctx, updates)
    }

    /// Display data for a configuration prompt.
    pub fn hint(
        &self,
        config: &UsageConfiguration,
        ctx: &ConsumptionContext<'_>,
    ) -> Result<ConsumptionHint, FormulaError> {
        ConsumptionRegistry::hint(self, config, ctx)
    }

    /// True if the consumed uses only recover on combat periods, so the
    /// consumption only matters during initiative.
    pub fn combat_only(&self, ctx: &ConsumptionContext<'_>) -> bool {
        let uses = match self.kind {
            ConsumptionType::ActivityUses => ctx.activity.uses.as_ref(),
            ConsumptionType::ItemUses => ctx
                .target_item(&self.target)
                .and_then(|item| item.uses.as_ref()),
            _ => return false,
        };
        let Some(uses) = uses.filter(|uses| !uses.recovery.is_empty()) else {
            return false;
        };
        uses.recovery.iter().all(|recovery| {
            ctx.rules
                .use_period(&recovery.period)
                .is_some_and(|period| period.kind == PeriodKind::Combat)
        })
    }
}
