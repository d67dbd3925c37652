//! Activities: usable capabilities attached to an item.

use std::fmt;

use crate::consumption::ConsumptionTarget;

use super::UsesData;

#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ActivityId(pub String);

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActivityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Whether a use of the activity may be enhanced with scaling steps.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScalingSettings {
    pub allowed: bool,
    /// Formula bounding the scaling steps, if any.
    pub max: Option<String>,
}

/// What a use of the activity consumes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConsumptionSettings {
    pub targets: Vec<ConsumptionTarget>,
    /// Spell activities consume a slot when this is set.
    pub spell_slot: bool,
    pub scaling: ScalingSettings,
}

impl Default for ConsumptionSettings {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            spell_slot: true,
            scaling: ScalingSettings::default(),
        }
    }
}

/// Area template the activity may place after a use.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemplateSettings {
    /// Template shape (`"cone"`, `"sphere"`, ...).
    pub kind: String,
    /// Offer to place the template when the activity is used.
    #[cfg_attr(feature = "serde", serde(default))]
    pub prompt: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActivityState {
    pub id: ActivityId,
    pub name: String,
    pub uses: Option<UsesData>,
    pub consumption: ConsumptionSettings,
    pub template: Option<TemplateSettings>,
}

impl ActivityState {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ActivityId(id.into()),
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_uses(mut self, uses: UsesData) -> Self {
        self.uses = Some(uses);
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: ConsumptionTarget) -> Self {
        self.consumption.targets.push(target);
        self
    }

    #[must_use]
    pub fn with_scaling(mut self, allowed: bool) -> Self {
        self.consumption.scaling.allowed = allowed;
        self
    }

    #[must_use]
    pub fn with_template(mut self, kind: impl Into<String>, prompt: bool) -> Self {
        self.template = Some(TemplateSettings {
            kind: kind.into(),
            prompt,
        });
        self
    }
}
