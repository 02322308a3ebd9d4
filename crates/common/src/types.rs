use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of dynamic actors reflected into the tracked-actor uniform
/// array. Entries beyond this are dropped silently each frame.
pub const MAX_TRACKED_ACTORS: usize = 16;

/// Number of bands in the audio envelope uniform (bass, mid, treble).
pub const AUDIO_BANDS: usize = 3;

/// Identifier of a registered effect. Doubles as the namespace prefix for the
/// effect's uniform and varying names in assembled source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EffectId(pub String);

impl EffectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EffectId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Unique identifier for a scene object attached to the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a live program handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandleId(pub Uuid);

impl HandleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HandleId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier of an in-flight texture load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque handle to a loaded texture, issued by the asset loader collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(pub u64);

/// Declared type of an effect uniform. The parenthesized qualifiers in the
/// schema model (color, direction-angle) determine how stored config values
/// are coerced, not the GPU-side type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UniformType {
    Float,
    Bool,
    /// vec3 carrying an RGB color in [0, 1].
    Color,
    /// vec3 carrying a unit direction; configured as an angle in degrees.
    Direction,
    Sampler2D,
}

impl UniformType {
    /// GLSL type name used in emitted declarations.
    pub fn glsl_name(&self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Color | Self::Direction => "vec3",
            Self::Sampler2D => "sampler2D",
        }
    }
}

/// Declared type of a cross-stage varying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaryingType {
    Float,
    Vec2,
    Vec3,
}

impl VaryingType {
    pub fn glsl_name(&self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
        }
    }
}

/// A concrete uniform value held in a program handle's uniform block.
///
/// `Texture(None)` is a pending or failed texture slot; the effect reading it
/// is visually inert until resolution arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UniformValue {
    Float(f32),
    Bool(bool),
    Vec3(Vec3),
    Vec4Array(Vec<Vec4>),
    Texture(Option<TextureHandle>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_uniqueness() {
        assert_ne!(ObjectId::new(), ObjectId::new());
        assert_ne!(HandleId::new(), HandleId::new());
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn glsl_names() {
        assert_eq!(UniformType::Color.glsl_name(), "vec3");
        assert_eq!(UniformType::Direction.glsl_name(), "vec3");
        assert_eq!(UniformType::Sampler2D.glsl_name(), "sampler2D");
        assert_eq!(VaryingType::Vec2.glsl_name(), "vec2");
    }

    #[test]
    fn effect_id_displays_raw() {
        assert_eq!(EffectId::new("wind").to_string(), "wind");
    }
}
