//! Shared types for the shaderweave engine: ids, uniform value model,
//! capacity constants, and config-value coercion helpers.
//!
//! # Invariants
//! - Capacity limits are named constants, never inline numbers.
//! - Value coercion never fails hard; out-of-domain inputs degrade to a
//!   caller-chosen fallback.

pub mod convert;
pub mod types;

pub use types::{
    AUDIO_BANDS, EffectId, HandleId, MAX_TRACKED_ACTORS, ObjectId, RequestId, TextureHandle,
    UniformType, UniformValue, VaryingType,
};

pub fn crate_info() -> &'static str {
    "shaderweave-common v0.1.0"
}
