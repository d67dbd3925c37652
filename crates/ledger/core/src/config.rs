//! Read-only rules catalogue injected into every resolver call.
//!
//! Nothing in the engine reaches for process-wide configuration: currency
//! denominations, hit die sizes, spell levels, and consumption type metadata are
//! all looked up through the [`RulesConfig`] handed to the operation.

use crate::consumption::{ConsumptionType, ScalingMode};
use crate::state::{ActorKind, PreparationMode};

/// A single currency denomination and its conversion rate.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurrencyDenomination {
    /// Key used in currency bags (e.g. `"gp"`).
    pub key: String,
    /// Display label.
    pub label: String,
    /// How many coins of this denomination equal one standard coin.
    ///
    /// Zero disables the denomination for conversion.
    pub conversion: f64,
}

impl CurrencyDenomination {
    pub fn new(key: impl Into<String>, label: impl Into<String>, conversion: f64) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            conversion,
        }
    }
}

/// Broad category of a limited-use recovery period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PeriodKind {
    Rest,
    Combat,
    Special,
}

/// A recovery period uses can be restored on (short rest, dawn, end of turn, ...).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UsePeriod {
    pub key: String,
    pub label: String,
    pub kind: PeriodKind,
}

impl UsePeriod {
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: PeriodKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
        }
    }
}

/// Metadata describing one consumption type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConsumptionTypeInfo {
    pub kind: ConsumptionType,
    pub label: String,
    /// Scaling modes that make sense for this type.
    pub scaling_modes: Vec<ScalingMode>,
    /// Valid targets can only be listed once the item is owned by an actor.
    pub target_requires_embedded: bool,
}

/// Rules catalogue used by consumption resolvers and distribution.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RulesConfig {
    /// Currency denominations in display order.
    pub currencies: Vec<CurrencyDenomination>,

    /// Hit die sizes (faces) in ascending order.
    pub hit_die_sizes: Vec<u32>,

    /// Highest spell level a slot can have.
    pub max_spell_level: u8,

    /// Actor kinds that track experience points.
    pub experience_kinds: Vec<ActorKind>,

    /// Recovery periods limited uses may refer to.
    pub use_periods: Vec<UsePeriod>,

    /// Preparation modes that never consume a spell slot.
    pub slotless_modes: Vec<PreparationMode>,

    /// Threshold die for recharge rolls.
    pub recharge_die: u32,

    /// Consumption type metadata.
    pub consumption_types: Vec<ConsumptionTypeInfo>,
}

impl RulesConfig {
    pub const DEFAULT_MAX_SPELL_LEVEL: u8 = 9;
    pub const DEFAULT_RECHARGE_DIE: u32 = 6;

    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a currency denomination by key.
    pub fn currency(&self, key: &str) -> Option<&CurrencyDenomination> {
        self.currencies.iter().find(|c| c.key == key)
    }

    /// Look up a recovery period by key.
    pub fn use_period(&self, key: &str) -> Option<&UsePeriod> {
        self.use_periods.iter().find(|p| p.key == key)
    }

    /// Look up consumption type metadata.
    pub fn consumption_type(&self, kind: ConsumptionType) -> Option<&ConsumptionTypeInfo> {
        self.consumption_types.iter().find(|info| info.kind == kind)
    }

    /// Whether the given actor kind can receive experience.
    pub fn tracks_experience(&self, kind: ActorKind) -> bool {
        self.experience_kinds.contains(&kind)
    }

    /// Clamp a spell level into `1..=max_spell_level`.
    pub fn clamp_spell_level(&self, level: i64) -> u8 {
        level.clamp(1, i64::from(self.max_spell_level.max(1))) as u8
    }

    fn default_consumption_types() -> Vec<ConsumptionTypeInfo> {
        use ConsumptionType::*;
        let amount = vec![ScalingMode::Amount];
        vec![
            ConsumptionTypeInfo {
                kind: ActivityUses,
                label: "Activity Uses".into(),
                scaling_modes: amount.clone(),
                target_requires_embedded: false,
            },
            ConsumptionTypeInfo {
                kind: ItemUses,
                label: "Item Uses".into(),
                scaling_modes: amount.clone(),
                target_requires_embedded: true,
            },
            ConsumptionTypeInfo {
                kind: Material,
                label: "Material".into(),
                scaling_modes: amount.clone(),
                target_requires_embedded: true,
            },
            ConsumptionTypeInfo {
                kind: Ammo,
                label: "Ammunition".into(),
                scaling_modes: amount.clone(),
                target_requires_embedded: true,
            },
            ConsumptionTypeInfo {
                kind: HitDice,
                label: "Hit Dice".into(),
                scaling_modes: amount.clone(),
                target_requires_embedded: true,
            },
            ConsumptionTypeInfo {
                kind: SpellSlots,
                label: "Spell Slots".into(),
                scaling_modes: vec![ScalingMode::Amount, ScalingMode::Level],
                target_requires_embedded: true,
            },
            ConsumptionTypeInfo {
                kind: Attribute,
                label: "Attribute".into(),
                scaling_modes: amount,
                target_requires_embedded: true,
            },
        ]
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            currencies: vec![
                CurrencyDenomination::new("pp", "Platinum", 0.1),
                CurrencyDenomination::new("gp", "Gold", 1.0),
                CurrencyDenomination::new("ep", "Electrum", 2.0),
                CurrencyDenomination::new("sp", "Silver", 10.0),
                CurrencyDenomination::new("cp", "Copper", 100.0),
            ],
            hit_die_sizes: vec![4, 6, 8, 10, 12],
            max_spell_level: Self::DEFAULT_MAX_SPELL_LEVEL,
            experience_kinds: vec![ActorKind::Character, ActorKind::Group],
            use_periods: vec![
                UsePeriod::new("sr", "Short Rest", PeriodKind::Rest),
                UsePeriod::new("lr", "Long Rest", PeriodKind::Rest),
                UsePeriod::new("day", "Day", PeriodKind::Special),
                UsePeriod::new("dawn", "Dawn", PeriodKind::Special),
                UsePeriod::new("dusk", "Dusk", PeriodKind::Special),
                UsePeriod::new("initiative", "Initiative", PeriodKind::Special),
                UsePeriod::new("turnStart", "Start of Turn", PeriodKind::Combat),
                UsePeriod::new("turnEnd", "End of Turn", PeriodKind::Combat),
                UsePeriod::new("turn", "Each Turn", PeriodKind::Combat),
                UsePeriod::new("recharge", "Recharge", PeriodKind::Special),
            ],
            slotless_modes: vec![
                PreparationMode::AtWill,
                PreparationMode::Innate,
                PreparationMode::Ritual,
            ],
            recharge_die: Self::DEFAULT_RECHARGE_DIE,
            consumption_types: Self::default_consumption_types(),
        }
    }
}
