//! Dispatch from [`ConsumptionType`] to its resolver.

use crate::config::RulesConfig;
use crate::dice::FormulaError;
use crate::state::{ActorState, ItemState, SpellSlots};
use crate::usage::UsageConfiguration;

use super::resolvers::hit_dice::HitDieSelector;
use super::resolvers::{attribute, hit_dice, material, spell_slots, uses};
use super::{
    ConsumptionContext, ConsumptionHint, ConsumptionTarget, ConsumptionType, ResolveError,
    UsageUpdates,
};

/// A selectable target for one consumption type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetOption {
    pub value: String,
    pub label: String,
    pub group: Option<String>,
}

impl TargetOption {
    fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            group: None,
        }
    }

    fn grouped(mut self, group: Option<&str>) -> Self {
        self.group = group.map(str::to_string);
        self
    }
}

/// Closed resolver table keyed by [`ConsumptionType`].
pub struct ConsumptionRegistry;

impl ConsumptionRegistry {
    /// Validate `target` and record its delta in `updates`.
    ///
    /// On error `updates` is left as it was before the call, apart from rolls
    /// already made for the cost.
    pub fn consume(
        target: &ConsumptionTarget,
        config: &UsageConfiguration,
        ctx: &mut ConsumptionContext<'_>,
        updates: &mut UsageUpdates,
    ) -> Result<(), ResolveError> {
        match target.kind {
            ConsumptionType::Attribute => attribute::consume(target, config, ctx, updates),
            ConsumptionType::Ammo | ConsumptionType::Material => {
                material::consume(target, config, ctx, updates)
            }
            ConsumptionType::HitDice => hit_dice::consume(target, config, ctx, updates),
            ConsumptionType::ItemUses => uses::item_uses(target, config, ctx, updates),
            ConsumptionType::ActivityUses => uses::activity_uses(target, config, ctx, updates),
            ConsumptionType::SpellSlots => spell_slots::consume(target, config, ctx, updates),
        }
    }

    /// Cost and availability of `target` for display.
    pub fn hint(
        target: &ConsumptionTarget,
        config: &UsageConfiguration,
        ctx: &ConsumptionContext<'_>,
    ) -> Result<ConsumptionHint, FormulaError> {
        let hint = ConsumptionHint::for_cost(target, config, ctx)?;
        let hint = match target.kind {
            ConsumptionType::Attribute => {
                hint.with_available(ctx.actor.attribute(target.target.trim()).unwrap_or(0))
            }
            ConsumptionType::Ammo | ConsumptionType::Material => hint.with_available(
                ctx.target_item(&target.target)
                    .map_or(0, |item| i64::from(item.quantity)),
            ),
            ConsumptionType::HitDice => {
                let faces = match HitDieSelector::parse(&target.target) {
                    Some(HitDieSelector::Faces(faces)) => Some(faces),
                    _ => None,
                };
                hint.with_available(ctx.actor.hit_dice_available(faces))
            }
            ConsumptionType::ItemUses | ConsumptionType::ActivityUses => {
                let data = uses::target_uses(target.kind, ctx, &target.target).unwrap_or_default();
                let auto_destroy = target.kind == ConsumptionType::ItemUses && data.auto_destroy;
                hint.with_available(i64::from(data.value()))
                    .destroys_when(auto_destroy)
            }
            ConsumptionType::SpellSlots => {
                let level = ctx.rules.clamp_spell_level(target.resolve_level(config, ctx)?);
                let available = ctx
                    .actor
                    .spells
                    .get(&SpellSlots::level_key(level))
                    .map_or(0, |pool| i64::from(pool.value));
                hint.with_available(available)
            }
        };
        Ok(hint)
    }

    /// Candidate targets for `kind`, or `None` when the type takes no target
    /// or needs an owning actor that is absent.
    pub fn valid_targets(
        kind: ConsumptionType,
        rules: &RulesConfig,
        actor: Option<&ActorState>,
        item: &ItemState,
    ) -> Option<Vec<TargetOption>> {
        let requires_actor = rules
            .consumption_type(kind)
            .is_some_and(|info| info.target_requires_embedded);
        if requires_actor && actor.is_none() {
            return None;
        }

        let options = match kind {
            ConsumptionType::ActivityUses => return None,
            ConsumptionType::Attribute => actor?
                .attribute_paths()
                .into_iter()
                .map(|path| {
                    let group = attribute_group(&path);
                    TargetOption::new(path.clone(), path).grouped(group)
                })
                .collect(),
            ConsumptionType::HitDice => std::iter::once(TargetOption::new("smallest", "Smallest"))
                .chain(rules.hit_die_sizes.iter().map(|faces| {
                    let die = format!("d{faces}");
                    TargetOption::new(die.clone(), die)
                }))
                .chain(std::iter::once(TargetOption::new("largest", "Largest")))
                .collect(),
            ConsumptionType::ItemUses => {
                let others = actor
                    .into_iter()
                    .flat_map(|actor| actor.items.iter())
                    .filter(|other| other.id != item.id)
                    .filter(|other| other.uses.as_ref().is_some_and(|uses| uses.max > 0))
                    .map(|other| TargetOption::new(other.id.as_str(), uses_label(&other.name, other)));
                std::iter::once(TargetOption::new("", uses_label("This Item", item)))
                    .chain(others)
                    .collect()
            }
            ConsumptionType::Ammo | ConsumptionType::Material => actor?
                .items
                .iter()
                .filter(|other| other.kind.is_material() && other.activities.is_empty())
                .map(|other| {
                    TargetOption::new(other.id.as_str(), format!("{} ({})", other.name, other.quantity))
                })
                .collect(),
            ConsumptionType::SpellSlots => (1..=rules.max_spell_level)
                .map(|level| TargetOption::new(level.to_string(), level_label(level)))
                .collect(),
        };
        Some(options)
    }
}

fn attribute_group(path: &str) -> Option<&'static str> {
    const GROUPS: [(&str, &str); 6] = [
        ("abilities.", "Ability Scores"),
        ("currency.", "Currency"),
        ("spells.", "Spell Slots"),
        ("attributes.movement.", "Speed"),
        ("attributes.senses.", "Senses"),
        ("resources.", "Resources"),
    ];
    GROUPS
        .iter()
        .find(|(prefix, _)| path.starts_with(prefix))
        .map(|(_, group)| *group)
}

fn uses_label(name: &str, item: &ItemState) -> String {
    match &item.uses {
        Some(uses) => format!("{name} ({}/{})", uses.value(), uses.max),
        None => name.to_string(),
    }
}

fn level_label(level: u8) -> String {
    let suffix = match (level % 10, level % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{level}{suffix} Level")
}
