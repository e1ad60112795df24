use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::model::TimeSeriesTable;

// ---------------------------------------------------------------------------
// VariableRegistry – variable key → display label
// ---------------------------------------------------------------------------

/// One entry of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Variable {
    pub key: String,
    pub label: String,
}

/// Ordered, immutable mapping from variable key to display label.
///
/// Used to label and validate selected variables; never holds data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VariableRegistry {
    variables: Vec<Variable>,
}

/// Accepted JSON layouts for a registry file.
#[derive(Deserialize)]
#[serde(untagged)]
enum RegistryFile {
    /// `[{"key": "Employment", "label": "CRE Employment"}, ...]` – keeps order.
    List(Vec<Variable>),
    /// `{"Employment": "CRE Employment", ...}` – sorted by key.
    Map(BTreeMap<String, String>),
}

impl VariableRegistry {
    /// Build from `(key, label)` pairs. Later duplicates of a key are dropped.
    pub fn new<K, L>(entries: impl IntoIterator<Item = (K, L)>) -> Self
    where
        K: Into<String>,
        L: Into<String>,
    {
        let mut variables: Vec<Variable> = Vec::new();
        for (key, label) in entries {
            let key = key.into();
            if variables.iter().any(|v| v.key == key) {
                log::warn!("duplicate registry key '{key}' ignored");
                continue;
            }
            variables.push(Variable {
                key,
                label: label.into(),
            });
        }
        Self { variables }
    }

    /// Use each column of the table as its own label.
    pub fn from_table(table: &TimeSeriesTable) -> Self {
        Self::new(table.column_names().into_iter().map(|c| (c.clone(), c)))
    }

    /// Load a registry from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading registry {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("parsing registry {}", path.display()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let file: RegistryFile = serde_json::from_str(text).context("invalid registry JSON")?;
        Ok(match file {
            RegistryFile::List(vars) => Self::new(vars.into_iter().map(|v| (v.key, v.label))),
            RegistryFile::Map(map) => Self::new(map),
        })
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.key.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.variables.iter().any(|v| v.key == key)
    }

    /// Display label for `key`, falling back to the key itself.
    pub fn label<'a>(&'a self, key: &'a str) -> &'a str {
        self.variables
            .iter()
            .find(|v| v.key == key)
            .map(|v| v.label.as_str())
            .unwrap_or(key)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Registry keys that the table has no column for.
    pub fn missing_from(&self, table: &TimeSeriesTable) -> Vec<&str> {
        self.keys().filter(|k| table.column(k).is_none()).collect()
    }
}
