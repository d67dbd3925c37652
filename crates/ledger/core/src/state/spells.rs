//! Spell slot pools and spell item data.

use std::collections::BTreeMap;

/// One slot pool: `spell1`..`spell9`, or a dedicated pool such as `pact`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SlotPool {
    /// Spell level slots from this pool are cast at.
    pub level: u8,
    pub value: u32,
    pub max: u32,
}

impl SlotPool {
    pub const fn new(level: u8, value: u32, max: u32) -> Self {
        Self { level, value, max }
    }
}

/// Slot pools keyed by pool name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SpellSlots {
    pools: BTreeMap<String, SlotPool>,
}

impl SpellSlots {
    /// Pool key for a regular spell level.
    pub fn level_key(level: u8) -> String {
        format!("spell{level}")
    }

    pub fn get(&self, key: &str) -> Option<&SlotPool> {
        self.pools.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut SlotPool> {
        self.pools.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pools.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, pool: SlotPool) {
        self.pools.insert(key.into(), pool);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SlotPool)> {
        self.pools.iter().map(|(key, pool)| (key.as_str(), pool))
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

/// How a spell is made available to its caster.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PreparationMode {
    #[default]
    Prepared,
    Always,
    AtWill,
    Innate,
    Ritual,
    /// Cast from the dedicated `pact` pool.
    Pact,
}

/// Spell-specific item data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpellData {
    /// Base spell level; 0 for cantrips.
    pub level: u8,
    pub preparation: PreparationMode,
}

impl SpellData {
    pub const fn new(level: u8, preparation: PreparationMode) -> Self {
        Self { level, preparation }
    }
}

/// Fixed casting level carried by a spell scroll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellScroll {
    /// Level the scroll casts at.
    pub value: u8,
    /// Base level of the scribed spell.
    pub base: u8,
}

impl SpellScroll {
    /// Scaling steps the scroll applies on top of the base spell.
    pub fn scaling(&self) -> u32 {
        u32::from(self.value.saturating_sub(self.base))
    }
}
