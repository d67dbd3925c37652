//! Deterministic resource ledger for tabletop activity uses.
//!
//! `ledger-core` resolves what using an activity costs (limited uses, item
//! quantities, hit dice, spell slots, attribute values), validates that the
//! acting actor can pay, and describes the resulting changes as an
//! [`UsageUpdates`] batch. It also splits currency and experience awards
//! across recipients. Nothing here performs I/O: rules arrive as an injected
//! [`RulesConfig`], state is read from [`ActorState`], and writes are left to
//! the caller.
pub mod award;
pub mod config;
pub mod consumption;
pub mod dice;
pub mod error;
pub mod scaling;
pub mod state;
pub mod usage;

pub use award::{
    CurrencyAward, CurrencyHolder, ExperienceHolder, XpAward, award_currency, award_xp,
    convert_currency, transfer_currency,
};
pub use config::{ConsumptionTypeInfo, CurrencyDenomination, PeriodKind, RulesConfig, UsePeriod};
pub use consumption::{
    ConsumptionContext, ConsumptionError, ConsumptionErrorKind, ConsumptionHint,
    ConsumptionRegistry, ConsumptionTarget, ConsumptionType, MissingResource, RechargeOutcome,
    ResolveError, ScalingMode, TargetOption, TargetScaling, UsageUpdates, UsageWrite,
    roll_recharge,
};
pub use dice::{
    DiceRoller, DieResult, DieTerm, EvaluationMode, Formula, FormulaError, Operator, PcgDice,
    RollData, RolledValue, ScriptedDice, Term, compute_seed,
};
pub use error::{ErrorSeverity, LedgerError};
pub use scaling::ScalingResolver;
pub use state::{
    ActivityId, ActivityState, ActorId, ActorKind, ActorPatch, ActorState, ClassData,
    ConsumptionSettings, CurrencyBag, ItemId, ItemKind, ItemPatch, ItemState, PatchError,
    PreparationMode, RechargeData, ScalingSettings, SlotPool, SpellData, SpellScroll, SpellSlots,
    TemplateSettings, UsesData, UsesRecovery,
};
pub use usage::{
    ConsumeSelection, ConsumptionWarning, DryRun, ResourceSelection, UsagePlanner, UsageRequest,
    UsageConfiguration, WarningSource, bound_usage_scaling, can_scale, max_scaling, prepare_usage_config,
    prepare_usage_scaling, requires_configuration, requires_spell_slot,
};
