//! Uniform Binder: produces the concrete value for every declared uniform of
//! an object's configured effects.

use crate::config::{EffectConfig, ObjectShaderConfig, OverrideValue};
use serde::Serialize;
use shaderweave_common::{RequestId, UniformType, UniformValue, convert};
use shaderweave_registry::{EffectRegistry, UniformSchema, enabled_uniform};
use std::collections::BTreeMap;

/// The resolved uniform value map of one program handle. Keys are the
/// fully-qualified uniform names as they appear in assembled source.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct UniformBlock {
    values: BTreeMap<String, UniformValue>,
}

impl UniformBlock {
    pub fn set(&mut self, name: impl Into<String>, value: UniformValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &UniformValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A deferred texture load for a sampler uniform. Handed to the asset loader
/// collaborator; its completion is delivered back through the runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureRequest {
    pub request: RequestId,
    /// Fully-qualified sampler uniform name to fill on completion.
    pub uniform: String,
    pub path: String,
}

/// Bind concrete uniform values for every effect in the resolved config.
///
/// Values start from the override if present, else the schema default;
/// numeric values are clamped into the declared range, colors and direction
/// angles are coerced, and sampler overrides become pending texture requests.
/// Never blocks.
pub fn bind_uniforms(
    registry: &EffectRegistry,
    config: &ObjectShaderConfig,
) -> (UniformBlock, Vec<TextureRequest>) {
    let mut block = UniformBlock::default();
    let mut requests = Vec::new();
    let disabled = EffectConfig::default();

    for effect in registry.iter() {
        let configurable = effect.id.as_str() != shaderweave_registry::DEFAULTS_EFFECT;
        let effect_config = config
            .effects
            .get(effect.id.as_str())
            .unwrap_or(&disabled);
        if configurable {
            block.set(
                enabled_uniform(effect.id.as_str()),
                UniformValue::Bool(effect_config.enabled),
            );
        }
        for (name, schema) in &effect.uniforms {
            let full = effect.qualified(name);
            let override_value = effect_config.overrides.get(name);
            let (value, texture_path) = coerce(&effect.id, name, schema, override_value);
            if let Some(path) = texture_path {
                requests.push(TextureRequest {
                    request: RequestId::new(),
                    uniform: full.clone(),
                    path,
                });
            }
            block.set(full, value);
        }
    }
    (block, requests)
}

/// Coerce one override-or-default into an engine value. Returns the value and,
/// for sampler overrides, the path to load. Mismatched override types degrade
/// to the schema default.
fn coerce(
    effect_id: &shaderweave_common::EffectId,
    name: &str,
    schema: &UniformSchema,
    override_value: Option<&OverrideValue>,
) -> (UniformValue, Option<String>) {
    match (schema.ty, override_value) {
        (_, None) => (schema.default.clone(), None),
        (UniformType::Float, Some(OverrideValue::Number(n))) => (
            UniformValue::Float(convert::clamp_to_range(*n as f32, schema.range)),
            None,
        ),
        (UniformType::Bool, Some(OverrideValue::Bool(b))) => (UniformValue::Bool(*b), None),
        (UniformType::Color, Some(OverrideValue::Number(n))) => (
            UniformValue::Vec3(convert::color_from_packed(*n as u32)),
            None,
        ),
        (UniformType::Color, Some(OverrideValue::Text(s))) => match convert::color_from_hex(s) {
            Some(c) => (UniformValue::Vec3(c), None),
            None => {
                tracing::warn!(effect = %effect_id, uniform = %name, value = %s,
                    "malformed color override; using default");
                (schema.default.clone(), None)
            }
        },
        (UniformType::Direction, Some(OverrideValue::Number(degrees))) => (
            UniformValue::Vec3(convert::direction_from_degrees(*degrees as f32)),
            None,
        ),
        (UniformType::Sampler2D, Some(OverrideValue::Text(path))) => {
            // Pending slot; the loader fills it in asynchronously.
            (UniformValue::Texture(None), Some(path.clone()))
        }
        (_, Some(other)) => {
            tracing::debug!(effect = %effect_id, uniform = %name, value = ?other,
                "type-mismatched override; using default");
            (schema.default.clone(), None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve_config;
    use glam::Vec3;
    use serde_json::json;
    use shaderweave_registry::standard_registry;

    #[test]
    fn worked_example_wind_clamped_fire_default() {
        // Config {wind: enabled, speed 99} {fire: disabled} from the scenario
        // in the project notes: speed clamps to 10, fire keeps its default.
        let reg = standard_registry();
        let config = resolve_config(
            &reg,
            Some(&json!({
                "wind": { "enabled": true, "speed": 99.0 },
                "fire": { "enabled": false },
            })),
        );
        let (block, requests) = bind_uniforms(&reg, &config);
        assert_eq!(block.get("wind_enabled"), Some(&UniformValue::Bool(true)));
        assert_eq!(block.get("wind_speed"), Some(&UniformValue::Float(10.0)));
        assert_eq!(block.get("fire_enabled"), Some(&UniformValue::Bool(false)));
        assert_eq!(
            block.get("fire_intensity"),
            Some(&UniformValue::Float(0.5))
        );
        assert!(requests.is_empty());
    }

    #[test]
    fn color_overrides_coerce_from_hex_and_packed() {
        let reg = standard_registry();
        let config = resolve_config(
            &reg,
            Some(&json!({
                "fire": { "enabled": true, "color": "#ff0000" },
                "ice": { "enabled": true, "tint": 0x00ff00 },
            })),
        );
        let (block, _) = bind_uniforms(&reg, &config);
        assert_eq!(
            block.get("fire_color"),
            Some(&UniformValue::Vec3(Vec3::new(1.0, 0.0, 0.0)))
        );
        assert_eq!(
            block.get("ice_tint"),
            Some(&UniformValue::Vec3(Vec3::new(0.0, 1.0, 0.0)))
        );
    }

    #[test]
    fn malformed_color_falls_back_to_default() {
        let reg = standard_registry();
        let with_bad = resolve_config(
            &reg,
            Some(&json!({ "fire": { "enabled": true, "color": "chartreuse" } })),
        );
        let plain = resolve_config(&reg, Some(&json!({ "fire": { "enabled": true } })));
        let (bad_block, _) = bind_uniforms(&reg, &with_bad);
        let (plain_block, _) = bind_uniforms(&reg, &plain);
        assert_eq!(bad_block.get("fire_color"), plain_block.get("fire_color"));
    }

    #[test]
    fn direction_override_is_degrees() {
        let reg = standard_registry();
        let config = resolve_config(
            &reg,
            Some(&json!({ "wind": { "enabled": true, "direction": 90.0 } })),
        );
        let (block, _) = bind_uniforms(&reg, &config);
        let Some(UniformValue::Vec3(d)) = block.get("wind_direction") else {
            panic!("wind_direction missing");
        };
        assert!((d.x - 1.0).abs() < 1e-6);
        assert!(d.z.abs() < 1e-6);
    }

    #[test]
    fn sampler_override_queues_request_and_stays_pending() {
        let reg = standard_registry();
        let config = resolve_config(
            &reg,
            Some(&json!({ "fogofwar": { "enabled": true, "mask": "masks/fog.png" } })),
        );
        let (block, requests) = bind_uniforms(&reg, &config);
        assert_eq!(block.get("fogofwar_mask"), Some(&UniformValue::Texture(None)));
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].uniform, "fogofwar_mask");
        assert_eq!(requests[0].path, "masks/fog.png");
    }

    #[test]
    fn type_mismatched_override_degrades_to_default() {
        let reg = standard_registry();
        let config = resolve_config(
            &reg,
            Some(&json!({ "bob": { "enabled": true, "amount": "lots" } })),
        );
        let (block, _) = bind_uniforms(&reg, &config);
        assert_eq!(block.get("bob_amount"), Some(&UniformValue::Float(0.1)));
    }

    #[test]
    fn every_declared_uniform_is_bound() {
        let reg = standard_registry();
        let config = resolve_config(&reg, None);
        let (block, _) = bind_uniforms(&reg, &config);
        for effect in reg.iter() {
            for name in effect.uniforms.keys() {
                let full = effect.qualified(name);
                assert!(block.get(&full).is_some(), "unbound uniform {full}");
            }
        }
    }
}
