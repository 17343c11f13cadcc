//! YAML script definitions.
//!
//! A scripts file lists benchmark scripts. Each one names a workload query
//! and either a set of fixture tables to synthesize (`dummy`) or the shape
//! of a real commit history to build.

use ahash::AHashSet;
use anyhow::Context;
use fixture_gen::FixtureConfig;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One benchmark script
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScriptDef {
    /// Script identifier, also the output file stem
    pub name: String,
    /// Workload query prepared once per thread
    pub query: String,
    #[serde(default)]
    pub branches: usize,
    #[serde(default)]
    pub commits: usize,
    /// Fixture kind -> output table name, in registration order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dummy: Option<IndexMap<String, String>>,
    #[serde(default)]
    pub diffs_per_commit: usize,
}

impl ScriptDef {
    /// Whether this script synthesizes system tables instead of committing
    pub fn is_dummy(&self) -> bool {
        self.dummy.is_some()
    }

    pub fn fixture_config(&self) -> FixtureConfig {
        FixtureConfig::new(self.commits, self.diffs_per_commit)
    }

    /// Output table names of the fixture tables, in registration order
    pub fn dummy_tables(&self) -> impl Iterator<Item = &str> {
        self.dummy.iter().flat_map(|m| m.values().map(String::as_str))
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.name.is_empty() {
            anyhow::bail!("script name must not be empty");
        }
        if !self
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            anyhow::bail!(
                "script name '{}' may only contain ASCII letters, digits, '_' and '-'",
                self.name
            );
        }

        let mut seen = AHashSet::new();
        for table in self.dummy_tables() {
            if table.is_empty() {
                anyhow::bail!("script '{}': output table name must not be empty", self.name);
            }
            if !seen.insert(table) {
                anyhow::bail!(
                    "script '{}': output table '{}' is used more than once",
                    self.name,
                    table
                );
            }
        }
        Ok(())
    }
}

/// Complete scripts file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptsDef {
    pub scripts: Vec<ScriptDef>,
}

impl ScriptsDef {
    /// Load and validate a scripts file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scripts file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid scripts file: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let def: ScriptsDef = serde_yaml::from_str(content)?;
        def.validate()?;
        Ok(def)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let mut names = AHashSet::new();
        for script in &self.scripts {
            script.validate()?;
            if !names.insert(script.name.as_str()) {
                anyhow::bail!("duplicate script name '{}'", script.name);
            }
        }
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&ScriptDef> {
        self.scripts.iter().find(|s| s.name == name)
    }
}
