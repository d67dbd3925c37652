//! Per-use configuration and the planning of a use's changes.
//!
//! [`prepare_usage_config`] derives the default choices for a use from the
//! item and activity, [`prepare_usage_scaling`] settles the scaling step count
//! once a slot is chosen, and [`UsagePlanner`] turns a configuration into a
//! [`crate::consumption::UsageUpdates`] batch, either as a dry run that collects
//! warnings or as a commit that stops at the first failure.

mod planner;

pub use planner::{ConsumptionWarning, DryRun, UsagePlanner, WarningSource};

use crate::config::RulesConfig;
use crate::dice::{EvaluationMode, Formula, FormulaError, ScriptedDice};
use crate::state::{ActivityState, ActorState, ItemState, PreparationMode, SpellSlots};

// ============================================================================
// Configuration
// ============================================================================

/// Which consumption targets of the activity are active.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ResourceSelection {
    #[default]
    None,
    All,
    /// Indices into the activity's target list.
    Only(Vec<usize>),
}

impl ResourceSelection {
    /// Selected indices for a target list of length `len`, in order.
    pub fn indices(&self, len: usize) -> Vec<usize> {
        match self {
            Self::None => Vec::new(),
            Self::All => (0..len).collect(),
            Self::Only(indices) => indices.iter().copied().filter(|&i| i < len).collect(),
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Self::None => false,
            Self::All => true,
            Self::Only(indices) => !indices.is_empty(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConsumeSelection {
    pub resources: ResourceSelection,
    pub spell_slot: bool,
}

/// Choices for a single use.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UsageConfiguration {
    pub consume: ConsumeSelection,
    /// Scaling steps; `None` when the use cannot scale.
    pub scaling: Option<u32>,
    /// Slot pool key (`spell3`, `pact`, ...).
    pub spell_slot: Option<String>,
    pub create_template: bool,
}

/// Caller overrides applied on top of the derived defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UsageRequest {
    /// Disable all consumption for this use.
    pub skip_consumption: bool,
    pub consume_resources: Option<ResourceSelection>,
    pub consume_spell_slot: Option<bool>,
    pub scaling: Option<u32>,
    pub spell_slot: Option<String>,
    pub create_template: Option<bool>,
}

impl UsageRequest {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn without_consumption(mut self) -> Self {
        self.skip_consumption = true;
        self
    }

    #[must_use]
    pub fn with_resources(mut self, selection: ResourceSelection) -> Self {
        self.consume_resources = Some(selection);
        self
    }

    #[must_use]
    pub fn with_spell_slot(mut self, slot: impl Into<String>) -> Self {
        self.spell_slot = Some(slot.into());
        self
    }

    #[must_use]
    pub fn with_scaling(mut self, steps: u32) -> Self {
        self.scaling = Some(steps);
        self
    }
}

// ============================================================================
// Defaults
// ============================================================================

/// A levelled spell whose preparation mode draws from a slot pool, owned by an
/// actor that has slot pools at all.
pub fn requires_spell_slot(rules: &RulesConfig, actor: &ActorState, item: &ItemState) -> bool {
    let Some(spell) = item.spell else {
        return false;
    };
    spell.level > 0 && !rules.slotless_modes.contains(&spell.preparation) && !actor.spells.is_empty()
}

/// Whether a use may carry scaling steps.
pub fn can_scale(rules: &RulesConfig, item: &ItemState, activity: &ActivityState) -> bool {
    if activity.consumption.scaling.allowed {
        return true;
    }
    item.spell
        .is_some_and(|spell| spell.level > 0 && !rules.slotless_modes.contains(&spell.preparation))
}

/// Upper bound on scaling steps from the activity's scaling formula.
pub fn max_scaling(
    actor: &ActorState,
    activity: &ActivityState,
) -> Result<Option<u32>, FormulaError> {
    let Some(source) = activity
        .consumption
        .scaling
        .max
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    else {
        return Ok(None);
    };
    let total = Formula::parse(source, &actor.roll_data())?
        .evaluate(EvaluationMode::Deterministic, &mut ScriptedDice::default())?
        .total;
    Ok(Some(crate::state::to_count(total)))
}

/// Default configuration for using `activity` on `item`, with `request`
/// overrides applied.
pub fn prepare_usage_config(
    rules: &RulesConfig,
    actor: &ActorState,
    item: &ItemState,
    activity: &ActivityState,
    request: &UsageRequest,
) -> Result<UsageConfiguration, FormulaError> {
    let mut config = UsageConfiguration {
        create_template: request.create_template.unwrap_or_else(|| {
            activity
                .template
                .as_ref()
                .is_some_and(|t| !t.kind.is_empty() && t.prompt)
        }),
        ..UsageConfiguration::default()
    };

    let needs_slot = requires_spell_slot(rules, actor, item);
    if !request.skip_consumption {
        config.consume.resources = request.consume_resources.clone().unwrap_or(
            if activity.consumption.targets.is_empty() {
                ResourceSelection::None
            } else {
                ResourceSelection::All
            },
        );
        config.consume.spell_slot = request
            .consume_spell_slot
            .unwrap_or(needs_slot && activity.consumption.spell_slot);
    }

    if let Some(scroll) = item.scroll {
        config.scaling = None;
        config.spell_slot = Some(SpellSlots::level_key(scroll.value));
        if request.consume_spell_slot.is_none() {
            config.consume.spell_slot = false;
        }
        return Ok(config);
    }

    if can_scale(rules, item, activity) {
        config.scaling = Some(request.scaling.unwrap_or(0));
        bound_usage_scaling(rules, actor, item, activity, &mut config)?;
    }

    if needs_slot {
        config.spell_slot = request
            .spell_slot
            .clone()
            .or_else(|| default_slot(actor, item));
    }
    Ok(config)
}

/// Clamp `config.scaling` to what the activity allows.
///
/// Uses that cannot scale carry no steps; spell scrolls settle theirs later in
/// [`prepare_usage_scaling`].
pub fn bound_usage_scaling(
    rules: &RulesConfig,
    actor: &ActorState,
    item: &ItemState,
    activity: &ActivityState,
    config: &mut UsageConfiguration,
) -> Result<(), FormulaError> {
    if item.scroll.is_some() || !can_scale(rules, item, activity) {
        config.scaling = None;
        return Ok(());
    }
    if let (Some(steps), Some(max)) = (config.scaling, max_scaling(actor, activity)?) {
        config.scaling = Some(steps.min(max));
    }
    Ok(())
}

/// Preparation-mode pool when the actor has one, otherwise the spell's level.
fn default_slot(actor: &ActorState, item: &ItemState) -> Option<String> {
    let spell = item.spell?;
    let mode = spell.preparation.as_ref();
    if actor.spells.contains(mode) {
        Some(mode.to_string())
    } else {
        Some(SpellSlots::level_key(spell.level))
    }
}

/// Slot an activity's own spell slot consumption draws from.
pub(crate) fn consumed_slot(config: &UsageConfiguration, item: &ItemState) -> Option<String> {
    if let Some(slot) = &config.spell_slot {
        return Some(slot.clone());
    }
    let spell = item.spell?;
    Some(match spell.preparation {
        PreparationMode::Prepared | PreparationMode::Always => SpellSlots::level_key(spell.level),
        mode => mode.as_ref().to_string(),
    })
}

/// Settle the scaling step count once the slot is known.
///
/// Spell scrolls scale by their fixed level over the base spell; spells scale
/// by the chosen slot's level over their own.
pub fn prepare_usage_scaling(config: &mut UsageConfiguration, actor: &ActorState, item: &ItemState) {
    if let Some(scroll) = item.scroll {
        config.scaling = Some(scroll.scaling());
        return;
    }
    let Some(spell) = item.spell else {
        return;
    };
    let slot_level = config
        .spell_slot
        .as_deref()
        .and_then(|slot| actor.spells.get(slot))
        .map(|pool| pool.level)
        .filter(|&level| level > 0);
    if let Some(level) = slot_level {
        config.scaling = Some(u32::from(level.saturating_sub(spell.level)));
    }
}

/// True when the use has anything to configure.
pub fn requires_configuration(config: &UsageConfiguration) -> bool {
    config.consume.resources.is_active()
        || config.consume.spell_slot
        || config.create_template
        || config.scaling.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumption::{ConsumptionTarget, ConsumptionType};
    use crate::state::{ActorKind, ItemKind, SlotPool, SpellData, SpellScroll};

    fn caster() -> ActorState {
        let mut actor = ActorState::new("a", "A", ActorKind::Character);
        actor.spells.insert("spell1", SlotPool::new(1, 2, 4));
        actor.spells.insert("spell3", SlotPool::new(3, 1, 3));
        actor.spells.insert("pact", SlotPool::new(3, 2, 2));
        actor
    }

    fn spell(level: u8, preparation: PreparationMode) -> ItemState {
        ItemState::new("spell", "Spell", ItemKind::Spell).with_spell(SpellData::new(level, preparation))
    }

    #[test]
    fn levelled_spell_defaults_to_its_level_slot() {
        let rules = RulesConfig::default();
        let actor = caster();
        let item = spell(1, PreparationMode::Prepared);
        let activity = ActivityState::new("cast", "Cast");
        let config =
            prepare_usage_config(&rules, &actor, &item, &activity, &UsageRequest::new()).unwrap();

        assert!(config.consume.spell_slot);
        assert_eq!(config.consume.resources, ResourceSelection::None);
        assert_eq!(config.spell_slot.as_deref(), Some("spell1"));
        assert_eq!(config.scaling, Some(0));
        assert!(requires_configuration(&config));
    }

    #[test]
    fn pact_spells_use_the_pact_pool() {
        let rules = RulesConfig::default();
        let actor = caster();
        let item = spell(1, PreparationMode::Pact);
        let activity = ActivityState::new("cast", "Cast");
        let mut config =
            prepare_usage_config(&rules, &actor, &item, &activity, &UsageRequest::new()).unwrap();
        assert_eq!(config.spell_slot.as_deref(), Some("pact"));

        prepare_usage_scaling(&mut config, &actor, &item);
        assert_eq!(config.scaling, Some(2));
    }

    #[test]
    fn at_will_spells_need_no_slot_and_no_dialog() {
        let rules = RulesConfig::default();
        let actor = caster();
        let item = spell(2, PreparationMode::AtWill);
        let activity = ActivityState::new("cast", "Cast");
        let config =
            prepare_usage_config(&rules, &actor, &item, &activity, &UsageRequest::new()).unwrap();

        assert!(!config.consume.spell_slot);
        assert_eq!(config.spell_slot, None);
        assert_eq!(config.scaling, None);
        assert!(!requires_configuration(&config));
    }

    #[test]
    fn scrolls_cast_at_a_fixed_level() {
        let rules = RulesConfig::default();
        let actor = caster();
        let item = spell(1, PreparationMode::Prepared).with_scroll(SpellScroll { value: 3, base: 1 });
        let activity = ActivityState::new("cast", "Cast");
        let mut config =
            prepare_usage_config(&rules, &actor, &item, &activity, &UsageRequest::new()).unwrap();

        assert_eq!(config.scaling, None);
        assert_eq!(config.spell_slot.as_deref(), Some("spell3"));
        assert!(!config.consume.spell_slot);

        prepare_usage_scaling(&mut config, &actor, &item);
        assert_eq!(config.scaling, Some(2));
    }

    #[test]
    fn targets_and_templates_drive_defaults() {
        let rules = RulesConfig::default();
        let actor = caster();
        let item = ItemState::new("wand", "Wand", ItemKind::Equipment);
        let activity = ActivityState::new("burst", "Burst")
            .with_target(ConsumptionTarget::new(ConsumptionType::ItemUses, "", "1"))
            .with_template("sphere", true);

        let config =
            prepare_usage_config(&rules, &actor, &item, &activity, &UsageRequest::new()).unwrap();
        assert_eq!(config.consume.resources, ResourceSelection::All);
        assert!(config.create_template);

        let config = prepare_usage_config(
            &rules,
            &actor,
            &item,
            &activity,
            &UsageRequest::new().without_consumption(),
        )
        .unwrap();
        assert_eq!(config.consume, ConsumeSelection::default());
    }

    #[test]
    fn scaling_is_bounded_by_the_activity_maximum() {
        let rules = RulesConfig::default();
        let actor = caster().with_attribute("resources.ki.max", 2);
        let item = ItemState::new("feat", "Flurry", ItemKind::Feat);
        let mut activity = ActivityState::new("flurry", "Flurry").with_scaling(true);
        activity.consumption.scaling.max = Some("@resources.ki.max".to_string());

        let config = prepare_usage_config(
            &rules,
            &actor,
            &item,
            &activity,
            &UsageRequest::new().with_scaling(5),
        )
        .unwrap();
        assert_eq!(config.scaling, Some(2));
    }

    #[test]
    fn invoker_scaling_is_clamped_after_the_fact() {
        let rules = RulesConfig::default();
        let actor = caster().with_attribute("resources.ki.max", 2);
        let feat = ItemState::new("feat", "Flurry", ItemKind::Feat);
        let mut activity = ActivityState::new("flurry", "Flurry").with_scaling(true);
        activity.consumption.scaling.max = Some("@resources.ki.max".to_string());

        let mut config = UsageConfiguration {
            scaling: Some(9),
            ..UsageConfiguration::default()
        };
        bound_usage_scaling(&rules, &actor, &feat, &activity, &mut config).unwrap();
        assert_eq!(config.scaling, Some(2));

        let fixed = ActivityState::new("punch", "Punch");
        config.scaling = Some(4);
        bound_usage_scaling(&rules, &actor, &feat, &fixed, &mut config).unwrap();
        assert_eq!(config.scaling, None);
    }

    #[test]
    fn selection_indices_ignore_out_of_range() {
        assert_eq!(ResourceSelection::All.indices(3), vec![0, 1, 2]);
        assert_eq!(ResourceSelection::Only(vec![2, 7, 0]).indices(3), vec![2, 0]);
        assert!(ResourceSelection::None.indices(3).is_empty());
        assert!(!ResourceSelection::Only(Vec::new()).is_active());
    }
}
