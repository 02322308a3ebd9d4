//! Per-Object Configuration Resolver: maps the external store's arbitrary
//! key/value map into a well-formed `ObjectShaderConfig`.

use serde::{Deserialize, Serialize};
use shaderweave_registry::EffectRegistry;
use std::collections::BTreeMap;

/// A stored override value as the external store supplies it. Colors arrive
/// as hex strings or packed numbers; texture paths as strings; angles as
/// degree numbers. The binder coerces per schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Configuration of one effect on one object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EffectConfig {
    pub enabled: bool,
    pub overrides: BTreeMap<String, OverrideValue>,
}

/// Per-object effect configuration: one entry per *registered* configurable
/// effect, always complete after resolution.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectShaderConfig {
    pub effects: BTreeMap<String, EffectConfig>,
}

impl ObjectShaderConfig {
    /// Ids of the enabled effects, in deterministic (sorted) order.
    pub fn enabled_ids(&self) -> Vec<&str> {
        self.effects
            .iter()
            .filter(|(_, c)| c.enabled)
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

/// Translate a persisted configuration into a complete `ObjectShaderConfig`.
///
/// Every registered configurable effect gets an entry; absent entries default
/// to disabled with no overrides. Unknown effect ids in the stored map are
/// ignored for forward compatibility (an extension may have been removed).
pub fn resolve_config(
    registry: &EffectRegistry,
    stored: Option<&serde_json::Value>,
) -> ObjectShaderConfig {
    let mut config = ObjectShaderConfig::default();
    for effect in registry.iter_configurable() {
        config
            .effects
            .insert(effect.id.as_str().to_owned(), EffectConfig::default());
    }

    let Some(serde_json::Value::Object(map)) = stored else {
        return config;
    };
    for (id, entry) in map {
        let Some(target) = config.effects.get_mut(id) else {
            tracing::debug!(effect = %id, "ignoring unknown effect in stored configuration");
            continue;
        };
        let serde_json::Value::Object(fields) = entry else {
            tracing::debug!(effect = %id, "ignoring malformed stored entry");
            continue;
        };
        for (key, value) in fields {
            if key == "enabled" {
                target.enabled = value.as_bool().unwrap_or(false);
                continue;
            }
            let parsed = match value {
                serde_json::Value::Bool(b) => Some(OverrideValue::Bool(*b)),
                serde_json::Value::Number(n) => n.as_f64().map(OverrideValue::Number),
                serde_json::Value::String(s) => Some(OverrideValue::Text(s.clone())),
                _ => None,
            };
            match parsed {
                Some(v) => {
                    target.overrides.insert(key.clone(), v);
                }
                None => {
                    tracing::debug!(effect = %id, key = %key, "ignoring non-scalar override")
                }
            }
        }
    }
    config
}
