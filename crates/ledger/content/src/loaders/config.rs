//! Rules catalogue loader.

use std::path::Path;

use ledger_core::RulesConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for the rules catalogue from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a rules catalogue from a TOML file.
    ///
    /// Fields missing from the file keep their [`RulesConfig::default`] values.
    pub fn load(path: &Path) -> LoadResult<RulesConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse and validate a rules catalogue from TOML text.
    pub fn parse(content: &str) -> LoadResult<RulesConfig> {
        let mut rules: RulesConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse rules TOML: {}", e))?;

        rules.hit_die_sizes.sort_unstable();
        rules.hit_die_sizes.dedup();
        anyhow::ensure!(
            rules.hit_die_sizes.iter().all(|&faces| faces > 0),
            "Hit die sizes must be positive"
        );
        anyhow::ensure!(rules.max_spell_level > 0, "max_spell_level must be at least 1");
        anyhow::ensure!(rules.recharge_die > 0, "recharge_die must be at least 1");

        for (index, denomination) in rules.currencies.iter().enumerate() {
            anyhow::ensure!(
                denomination.conversion >= 0.0,
                "Currency '{}' has a negative conversion rate",
                denomination.key
            );
            if rules.currencies[..index]
                .iter()
                .any(|other| other.key == denomination.key)
            {
                anyhow::bail!("Currency '{}' is defined twice", denomination.key);
            }
        }

        Ok(rules)
    }
}
