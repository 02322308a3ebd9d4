//! Effect Registry: descriptors, schemas, and the sealed registry table.
//!
//! # Invariants
//! - Registration only happens during startup; after `seal()` the registry
//!   is read-only and safe to share by reference without synchronization.
//! - Iteration order is insertion order and stable across runs.
//! - A uniform schema default always satisfies its declared range.

pub mod descriptor;
pub mod library;
mod registry;

pub use descriptor::{
    DEFAULTS_EFFECT, EffectDescriptor, EffectInfo, SourceFragment, SpliceMode, UniformInfo,
    UniformSchema, VaryingSchema, enabled_uniform,
};
pub use library::{points, shared, standard_registry};
pub use registry::{EffectRegistry, RegistryError};

pub fn crate_info() -> &'static str {
    "shaderweave-registry v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("registry"));
    }
}
