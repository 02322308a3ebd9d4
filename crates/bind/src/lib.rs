//! Uniform Binder and friends: resolves the external store's persisted
//! per-object configuration, produces concrete uniform values (with deferred
//! texture resolution), and computes program cache keys.
//!
//! # Invariants
//! - Resolution and binding never fail hard: unknown effects are ignored,
//!   out-of-range numbers are clamped, mismatched types degrade to defaults.
//! - Binding never blocks: texture loads are emitted as requests for the
//!   loader collaborator, not awaited.

pub mod binder;
pub mod cache_key;
pub mod config;

pub use binder::{TextureRequest, UniformBlock, bind_uniforms};
pub use cache_key::{ProgramCacheKey, UniformSetKey};
pub use config::{EffectConfig, ObjectShaderConfig, OverrideValue, resolve_config};

pub fn crate_info() -> &'static str {
    "shaderweave-bind v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("bind"));
    }
}
