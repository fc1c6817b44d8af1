use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde_json::Value;

use crate::error::ReporterError;

/// Top-level settings key holding the per-service sub-trees.
pub const CONFIG_KEY: &str = "update-check";

/// Run configuration for one report: the per-service settings tree plus an
/// environment snapshot captured at construction.
///
/// All field lookups go through [`Configuration::resolve`], which consults
/// the environment first and the settings tree second. Every service uses
/// this single code path, so the precedence rule cannot drift between
/// adapters.
#[derive(Debug, Clone)]
pub struct Configuration {
    tree: Value,
    env: HashMap<String, String>,
}

impl Configuration {
    /// Build from a settings sub-tree, snapshotting the process environment.
    pub fn new(tree: Value) -> Self {
        Self::with_env(tree, std::env::vars().collect())
    }

    /// Build with an explicit environment map instead of the process
    /// environment. Used by tests and embedders.
    pub fn with_env(tree: Value, env: HashMap<String, String>) -> Self {
        Self { tree, env }
    }

    /// Environment-only configuration with no settings tree.
    pub fn empty() -> Self {
        Self::new(Value::Object(serde_json::Map::new()))
    }

    /// Parse a TOML settings document and extract the `update-check` key.
    /// A document without that key yields an empty tree.
    pub fn from_settings_str(raw: &str) -> anyhow::Result<Self> {
        let document: toml::Value = raw.parse().context("failed to parse settings file")?;
        let tree = match document.get(CONFIG_KEY) {
            Some(section) => serde_json::to_value(section)
                .with_context(|| format!("invalid {CONFIG_KEY} section"))?,
            None => Value::Object(serde_json::Map::new()),
        };
        Ok(Self::new(tree))
    }

    pub fn from_settings_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::from_settings_str(&raw)
    }

    /// Environment variable name for a service field, e.g.
    /// `("mattermost", "url")` → `MATTERMOST_URL`.
    pub fn env_key(service: &str, field: &str) -> String {
        format!(
            "{}_{}",
            service.to_ascii_uppercase(),
            field.to_ascii_uppercase()
        )
    }

    /// Resolve a service field, environment first, settings tree second.
    ///
    /// A present environment variable wins even when the settings tree also
    /// defines the field. Scalar settings values are stringified the way
    /// the environment would carry them.
    pub fn resolve(&self, service: &str, field: &str) -> Option<String> {
        if let Some(value) = self.env.get(&Self::env_key(service, field)) {
            return Some(value.clone());
        }
        self.tree
            .get(service)
            .and_then(|sub| sub.get(field))
            .and_then(scalar_to_string)
    }

    /// Resolve a required field, failing with `MissingConfiguration` when
    /// neither source provides it.
    pub fn require(
        &self,
        service: &'static str,
        field: &'static str,
    ) -> Result<String, ReporterError> {
        self.resolve(service, field)
            .ok_or_else(|| ReporterError::MissingConfiguration {
                service,
                field,
                env_var: Self::env_key(service, field),
            })
    }

    /// Whether a service is enabled for this run.
    ///
    /// The `<SERVICE>_ENABLE` environment variable wins when set to a
    /// non-empty value, in both directions; otherwise the `enable` flag of
    /// the service sub-tree decides. Absence of both means disabled.
    pub fn service_enabled(&self, service: &str) -> bool {
        if let Some(value) = self.env.get(&Self::env_key(service, "enable")) {
            if !value.is_empty() {
                return is_truthy(value);
            }
        }
        self.tree
            .get(service)
            .and_then(|sub| sub.get("enable"))
            .map(value_is_truthy)
            .unwrap_or(false)
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn is_truthy(raw: &str) -> bool {
    !matches!(
        raw.to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}

fn value_is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => is_truthy(s),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}
