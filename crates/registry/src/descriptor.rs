use glam::Vec3;
use serde::{Deserialize, Serialize};
use shaderweave_common::{EffectId, TextureHandle, UniformType, UniformValue, VaryingType};
use std::collections::BTreeMap;

/// Id of the reserved descriptor whose declarations are shared globally
/// (never namespaced, never toggled).
pub const DEFAULTS_EFFECT: &str = "defaults";

/// Name of the enable-guard uniform for an effect.
pub fn enabled_uniform(effect_id: &str) -> String {
    format!("{effect_id}_enabled")
}

/// Schema for one effect uniform: declared type, default value, and an
/// optional inclusive numeric range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformSchema {
    pub ty: UniformType,
    pub default: UniformValue,
    pub range: Option<(f32, f32)>,
}

impl UniformSchema {
    pub fn float(default: f32) -> Self {
        Self {
            ty: UniformType::Float,
            default: UniformValue::Float(default),
            range: None,
        }
    }

    pub fn boolean(default: bool) -> Self {
        Self {
            ty: UniformType::Bool,
            default: UniformValue::Bool(default),
            range: None,
        }
    }

    /// Color uniform with a packed `0xRRGGBB` default.
    pub fn color(default: u32) -> Self {
        Self {
            ty: UniformType::Color,
            default: UniformValue::Vec3(shaderweave_common::convert::color_from_packed(default)),
            range: None,
        }
    }

    /// Direction uniform with a default angle in degrees.
    pub fn direction(default_degrees: f32) -> Self {
        Self {
            ty: UniformType::Direction,
            default: UniformValue::Vec3(shaderweave_common::convert::direction_from_degrees(
                default_degrees,
            )),
            range: None,
        }
    }

    /// Texture uniform. The default is an empty slot; binding schedules an
    /// asynchronous load when a path override is present.
    pub fn sampler() -> Self {
        Self {
            ty: UniformType::Sampler2D,
            default: UniformValue::Texture(None::<TextureHandle>),
            range: None,
        }
    }

    /// Attach an inclusive numeric range. The default must lie inside it.
    pub fn with_range(mut self, min: f32, max: f32) -> Self {
        if let UniformValue::Float(d) = self.default {
            assert!(
                min <= d && d <= max,
                "schema default {d} outside range [{min}, {max}]"
            );
        }
        self.range = Some((min, max));
        self
    }
}

/// Schema for a cross-stage varying. The default is assigned unconditionally
/// at the top of the vertex stage, so fragment reads are defined even when
/// the owning effect is disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaryingSchema {
    pub ty: VaryingType,
    pub default: Vec3,
}

impl VaryingSchema {
    pub fn float(default: f32) -> Self {
        Self {
            ty: VaryingType::Float,
            default: Vec3::new(default, 0.0, 0.0),
        }
    }

    pub fn vec2(x: f32, y: f32) -> Self {
        Self {
            ty: VaryingType::Vec2,
            default: Vec3::new(x, y, 0.0),
        }
    }

    pub fn vec3(x: f32, y: f32, z: f32) -> Self {
        Self {
            ty: VaryingType::Vec3,
            default: Vec3::new(x, y, z),
        }
    }

    /// GLSL literal for the default value, matching the declared type.
    pub fn glsl_default(&self) -> String {
        let d = self.default;
        match self.ty {
            VaryingType::Float => format!("{:?}", d.x),
            VaryingType::Vec2 => format!("vec2({:?}, {:?})", d.x, d.y),
            VaryingType::Vec3 => format!("vec3({:?}, {:?}, {:?})", d.x, d.y, d.z),
        }
    }
}

/// How a source fragment is spliced relative to its injection-point marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpliceMode {
    /// Insert immediately after the marker; the marker is retained.
    Append,
    /// Insert immediately before the marker; the marker is retained.
    Prepend,
    /// Substitute the marker text. Valid at most once per marker.
    Replace,
}

/// A unit of source text targeting one injection point of one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFragment {
    pub injection_point: String,
    pub mode: SpliceMode,
    pub body: String,
    /// When false the body is wrapped in the effect's enable guard; when true
    /// it is spliced verbatim (structural declarations, type definitions).
    pub unconditional: bool,
}

impl SourceFragment {
    pub fn append(point: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            injection_point: point.into(),
            mode: SpliceMode::Append,
            body: body.into(),
            unconditional: false,
        }
    }

    pub fn prepend(point: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            injection_point: point.into(),
            mode: SpliceMode::Prepend,
            body: body.into(),
            unconditional: false,
        }
    }

    pub fn replace(point: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            injection_point: point.into(),
            mode: SpliceMode::Replace,
            body: body.into(),
            unconditional: false,
        }
    }

    /// Mark the fragment as spliced without an enable guard.
    pub fn unconditional(mut self) -> Self {
        self.unconditional = true;
        self
    }
}

/// A named, immutable unit of shader behavior: uniform/varying schemas plus
/// ordered source fragments per stage. Built once at startup, then registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectDescriptor {
    pub id: EffectId,
    /// Human-readable name surfaced to the configuration UI.
    pub title: String,
    pub uniforms: BTreeMap<String, UniformSchema>,
    pub varyings: BTreeMap<String, VaryingSchema>,
    pub vertex_fragments: Vec<SourceFragment>,
    pub fragment_fragments: Vec<SourceFragment>,
}

impl EffectDescriptor {
    pub fn new(id: impl Into<EffectId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            uniforms: BTreeMap::new(),
            varyings: BTreeMap::new(),
            vertex_fragments: Vec::new(),
            fragment_fragments: Vec::new(),
        }
    }

    pub fn uniform(mut self, name: impl Into<String>, schema: UniformSchema) -> Self {
        self.uniforms.insert(name.into(), schema);
        self
    }

    pub fn varying(mut self, name: impl Into<String>, schema: VaryingSchema) -> Self {
        self.varyings.insert(name.into(), schema);
        self
    }

    pub fn vertex(mut self, fragment: SourceFragment) -> Self {
        self.vertex_fragments.push(fragment);
        self
    }

    pub fn fragment(mut self, fragment: SourceFragment) -> Self {
        self.fragment_fragments.push(fragment);
        self
    }

    /// Fully-qualified identifier for one of this effect's uniforms or
    /// varyings: `<id>_<name>`, except for the reserved defaults descriptor
    /// whose names are shared globally.
    pub fn qualified(&self, name: &str) -> String {
        if self.id.as_str() == DEFAULTS_EFFECT {
            name.to_owned()
        } else {
            format!("{}_{}", self.id, name)
        }
    }
}

/// Read-only reflection of one uniform schema, for UI control generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniformInfo {
    pub name: String,
    pub ty: UniformType,
    pub default: UniformValue,
    pub range: Option<(f32, f32)>,
}

/// Read-only reflection of one registered effect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectInfo {
    pub id: EffectId,
    pub title: String,
    pub uniforms: Vec<UniformInfo>,
}

impl EffectInfo {
    pub fn from_descriptor(desc: &EffectDescriptor) -> Self {
        Self {
            id: desc.id.clone(),
            title: desc.title.clone(),
            uniforms: desc
                .uniforms
                .iter()
                .map(|(name, s)| UniformInfo {
                    name: name.clone(),
                    ty: s.ty,
                    default: s.default.clone(),
                    range: s.range,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranged_schema_accepts_default_inside() {
        let s = UniformSchema::float(0.1).with_range(0.0, 10.0);
        assert_eq!(s.range, Some((0.0, 10.0)));
    }

    #[test]
    #[should_panic(expected = "outside range")]
    fn ranged_schema_rejects_default_outside() {
        let _ = UniformSchema::float(11.0).with_range(0.0, 10.0);
    }

    #[test]
    fn varying_glsl_defaults() {
        assert_eq!(VaryingSchema::float(0.5).glsl_default(), "0.5");
        assert_eq!(VaryingSchema::vec2(0.0, 1.0).glsl_default(), "vec2(0.0, 1.0)");
        assert_eq!(
            VaryingSchema::vec3(1.0, 2.0, 3.0).glsl_default(),
            "vec3(1.0, 2.0, 3.0)"
        );
    }

    #[test]
    fn descriptor_builder_accumulates() {
        let d = EffectDescriptor::new("wind", "Wind Sway")
            .uniform("speed", UniformSchema::float(0.1).with_range(0.0, 10.0))
            .varying("phase", VaryingSchema::float(0.0))
            .vertex(SourceFragment::append("//#inject vertex_displace", "x();"));
        assert_eq!(d.uniforms.len(), 1);
        assert_eq!(d.varyings.len(), 1);
        assert_eq!(d.vertex_fragments.len(), 1);
        assert!(d.fragment_fragments.is_empty());
    }

    #[test]
    fn reflection_carries_schema() {
        let d = EffectDescriptor::new("fire", "Fire")
            .uniform("intensity", UniformSchema::float(0.5).with_range(0.0, 5.0));
        let info = EffectInfo::from_descriptor(&d);
        assert_eq!(info.id.as_str(), "fire");
        assert_eq!(info.uniforms.len(), 1);
        assert_eq!(info.uniforms[0].range, Some((0.0, 5.0)));
    }
}
